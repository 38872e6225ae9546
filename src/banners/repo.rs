use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Banner, BannerChanges, BannerRow, NewBanner};
use crate::error::StoreError;

const BANNER_COLUMNS: &str =
    "id, owner_id, title, subtitle, link_url, position, image_key, image_url, created_at, updated_at";

#[async_trait]
pub trait BannerStore: Send + Sync {
    /// Ordered by `position`, then creation time.
    async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<Banner>, StoreError>;
    async fn get(&self, id: Uuid) -> Result<Option<Banner>, StoreError>;
    /// Appends after the owner's last banner.
    async fn insert(&self, new: NewBanner) -> Result<Banner, StoreError>;
    async fn update(&self, id: Uuid, changes: BannerChanges) -> Result<Option<Banner>, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<Option<Banner>, StoreError>;
    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<Vec<Banner>, StoreError>;
    /// `ids[i]` gets position `i`; ids of other owners are ignored.
    async fn reorder(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<(), StoreError>;
}

pub struct PgBannerStore {
    db: PgPool,
}

impl PgBannerStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BannerStore for PgBannerStore {
    async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<Banner>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}
              FROM banners
             WHERE $1::uuid IS NULL OR owner_id = $1
             ORDER BY position ASC, created_at ASC
            "#,
            BANNER_COLUMNS
        );
        let rows = sqlx::query_as::<_, BannerRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Banner::from).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Banner>, StoreError> {
        let sql = format!("SELECT {} FROM banners WHERE id = $1", BANNER_COLUMNS);
        let row = sqlx::query_as::<_, BannerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Banner::from))
    }

    async fn insert(&self, new: NewBanner) -> Result<Banner, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO banners (id, owner_id, title, subtitle, link_url, image_key, image_url, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7,
                    COALESCE((SELECT MAX(position) + 1 FROM banners WHERE owner_id = $2), 0))
            RETURNING {}
            "#,
            BANNER_COLUMNS
        );
        let (image_key, image_url) = match new.image {
            Some(m) => (Some(m.key), Some(m.url)),
            None => (None, None),
        };
        let row = sqlx::query_as::<_, BannerRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.owner_id)
            .bind(new.title)
            .bind(new.subtitle)
            .bind(new.link_url)
            .bind(image_key)
            .bind(image_url)
            .fetch_one(&self.db)
            .await?;
        Ok(row.into())
    }

    async fn update(&self, id: Uuid, c: BannerChanges) -> Result<Option<Banner>, StoreError> {
        let sql = format!(
            r#"
            UPDATE banners SET
                title      = COALESCE($2, title),
                subtitle   = COALESCE($3, subtitle),
                link_url   = COALESCE($4, link_url),
                image_key  = COALESCE($5, image_key),
                image_url  = COALESCE($6, image_url),
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            BANNER_COLUMNS
        );
        let (image_key, image_url) = match c.image {
            Some(m) => (Some(m.key), Some(m.url)),
            None => (None, None),
        };
        let row = sqlx::query_as::<_, BannerRow>(&sql)
            .bind(id)
            .bind(c.title)
            .bind(c.subtitle)
            .bind(c.link_url)
            .bind(image_key)
            .bind(image_url)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Banner::from))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Banner>, StoreError> {
        let sql = format!("DELETE FROM banners WHERE id = $1 RETURNING {}", BANNER_COLUMNS);
        let row = sqlx::query_as::<_, BannerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Banner::from))
    }

    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<Vec<Banner>, StoreError> {
        let sql = format!("DELETE FROM banners WHERE owner_id = $1 RETURNING {}", BANNER_COLUMNS);
        let rows = sqlx::query_as::<_, BannerRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Banner::from).collect())
    }

    async fn reorder(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE banners AS b
               SET position = (t.ord - 1)::int, updated_at = now()
              FROM UNNEST($2::uuid[]) WITH ORDINALITY AS t(id, ord)
             WHERE b.id = t.id AND b.owner_id = $1
            "#,
        )
        .bind(owner_id)
        .bind(ids.to_vec())
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::BannerStore;
    use crate::banners::repo_types::{Banner, BannerChanges, NewBanner};
    use crate::error::StoreError;

    #[derive(Default)]
    pub struct MemoryBannerStore {
        rows: Mutex<HashMap<Uuid, Banner>>,
    }

    #[async_trait]
    impl BannerStore for MemoryBannerStore {
        async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<Banner>, StoreError> {
            let rows = self.rows.lock().unwrap();
            let mut out: Vec<Banner> = rows
                .values()
                .filter(|b| owner_id.map_or(true, |o| b.owner_id == o))
                .cloned()
                .collect();
            out.sort_by(|a, b| (a.position, a.created_at).cmp(&(b.position, b.created_at)));
            Ok(out)
        }

        async fn get(&self, id: Uuid) -> Result<Option<Banner>, StoreError> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        async fn insert(&self, new: NewBanner) -> Result<Banner, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let position = rows
                .values()
                .filter(|b| b.owner_id == new.owner_id)
                .map(|b| b.position + 1)
                .max()
                .unwrap_or(0);
            let now = OffsetDateTime::now_utc();
            let banner = Banner {
                id: Uuid::new_v4(),
                owner_id: new.owner_id,
                title: new.title,
                subtitle: new.subtitle,
                link_url: new.link_url,
                position,
                image: new.image,
                created_at: now,
                updated_at: now,
            };
            rows.insert(banner.id, banner.clone());
            Ok(banner)
        }

        async fn update(&self, id: Uuid, c: BannerChanges) -> Result<Option<Banner>, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let Some(b) = rows.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(v) = c.title {
                b.title = v;
            }
            if let Some(v) = c.subtitle {
                b.subtitle = Some(v);
            }
            if let Some(v) = c.link_url {
                b.link_url = Some(v);
            }
            if let Some(v) = c.image {
                b.image = Some(v);
            }
            b.updated_at = OffsetDateTime::now_utc();
            Ok(Some(b.clone()))
        }

        async fn delete(&self, id: Uuid) -> Result<Option<Banner>, StoreError> {
            Ok(self.rows.lock().unwrap().remove(&id))
        }

        async fn delete_by_owner(&self, owner_id: Uuid) -> Result<Vec<Banner>, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let ids: Vec<Uuid> = rows
                .values()
                .filter(|b| b.owner_id == owner_id)
                .map(|b| b.id)
                .collect();
            Ok(ids.iter().filter_map(|id| rows.remove(id)).collect())
        }

        async fn reorder(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<(), StoreError> {
            let mut rows = self.rows.lock().unwrap();
            for (i, id) in ids.iter().enumerate() {
                if let Some(b) = rows.get_mut(id).filter(|b| b.owner_id == owner_id) {
                    b.position = i as i32;
                }
            }
            Ok(())
        }
    }
}
