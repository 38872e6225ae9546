use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::repo_types::{Homepage, HomepageChanges, HomepageRow};
use crate::error::StoreError;

#[async_trait]
pub trait HomepageStore: Send + Sync {
    async fn get(&self, owner_id: Uuid) -> Result<Option<Homepage>, StoreError>;
    async fn upsert(&self, owner_id: Uuid, changes: HomepageChanges) -> Result<Homepage, StoreError>;
    async fn delete(&self, owner_id: Uuid) -> Result<bool, StoreError>;
}

pub struct PgHomepageStore {
    db: PgPool,
}

impl PgHomepageStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HomepageStore for PgHomepageStore {
    async fn get(&self, owner_id: Uuid) -> Result<Option<Homepage>, StoreError> {
        let row = sqlx::query_as::<_, HomepageRow>(
            r#"
            SELECT owner_id, about_title, about_body, achievements, updated_at
              FROM homepages
             WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Homepage::from))
    }

    async fn upsert(&self, owner_id: Uuid, c: HomepageChanges) -> Result<Homepage, StoreError> {
        let row = sqlx::query_as::<_, HomepageRow>(
            r#"
            INSERT INTO homepages (owner_id, about_title, about_body, achievements)
            VALUES ($1, $2, $3, COALESCE($4, '[]'::jsonb))
            ON CONFLICT (owner_id) DO UPDATE SET
                about_title  = COALESCE(EXCLUDED.about_title, homepages.about_title),
                about_body   = COALESCE(EXCLUDED.about_body, homepages.about_body),
                achievements = COALESCE($4, homepages.achievements),
                updated_at   = now()
            RETURNING owner_id, about_title, about_body, achievements, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(c.about_title)
        .bind(c.about_body)
        .bind(c.achievements.map(Json))
        .fetch_one(&self.db)
        .await?;
        Ok(row.into())
    }

    async fn delete(&self, owner_id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM homepages WHERE owner_id = $1")
            .bind(owner_id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
