use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewTestimonial, Testimonial, TestimonialChanges, TestimonialRow};
use crate::error::StoreError;

const TESTIMONIAL_COLUMNS: &str = "id, owner_id, name, message, rating, designation, position, \
     image_key, image_url, created_at, updated_at";

#[async_trait]
pub trait TestimonialStore: Send + Sync {
    async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<Testimonial>, StoreError>;
    async fn get(&self, id: Uuid) -> Result<Option<Testimonial>, StoreError>;
    async fn insert(&self, new: NewTestimonial) -> Result<Testimonial, StoreError>;
    async fn update(
        &self,
        id: Uuid,
        changes: TestimonialChanges,
    ) -> Result<Option<Testimonial>, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<Option<Testimonial>, StoreError>;
    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<Vec<Testimonial>, StoreError>;
    async fn reorder(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<(), StoreError>;
}

pub struct PgTestimonialStore {
    db: PgPool,
}

impl PgTestimonialStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TestimonialStore for PgTestimonialStore {
    async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<Testimonial>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}
              FROM testimonials
             WHERE $1::uuid IS NULL OR owner_id = $1
             ORDER BY position ASC, created_at ASC
            "#,
            TESTIMONIAL_COLUMNS
        );
        let rows = sqlx::query_as::<_, TestimonialRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Testimonial::from).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Testimonial>, StoreError> {
        let sql = format!("SELECT {} FROM testimonials WHERE id = $1", TESTIMONIAL_COLUMNS);
        let row = sqlx::query_as::<_, TestimonialRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Testimonial::from))
    }

    async fn insert(&self, new: NewTestimonial) -> Result<Testimonial, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO testimonials
                (id, owner_id, name, message, rating, designation, image_key, image_url, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                    COALESCE((SELECT MAX(position) + 1 FROM testimonials WHERE owner_id = $2), 0))
            RETURNING {}
            "#,
            TESTIMONIAL_COLUMNS
        );
        let (image_key, image_url) = match new.image {
            Some(m) => (Some(m.key), Some(m.url)),
            None => (None, None),
        };
        let row = sqlx::query_as::<_, TestimonialRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.owner_id)
            .bind(new.name)
            .bind(new.message)
            .bind(new.rating)
            .bind(new.designation)
            .bind(image_key)
            .bind(image_url)
            .fetch_one(&self.db)
            .await?;
        Ok(row.into())
    }

    async fn update(
        &self,
        id: Uuid,
        c: TestimonialChanges,
    ) -> Result<Option<Testimonial>, StoreError> {
        let sql = format!(
            r#"
            UPDATE testimonials SET
                name        = COALESCE($2, name),
                message     = COALESCE($3, message),
                rating      = COALESCE($4, rating),
                designation = COALESCE($5, designation),
                image_key   = COALESCE($6, image_key),
                image_url   = COALESCE($7, image_url),
                updated_at  = now()
            WHERE id = $1
            RETURNING {}
            "#,
            TESTIMONIAL_COLUMNS
        );
        let (image_key, image_url) = match c.image {
            Some(m) => (Some(m.key), Some(m.url)),
            None => (None, None),
        };
        let row = sqlx::query_as::<_, TestimonialRow>(&sql)
            .bind(id)
            .bind(c.name)
            .bind(c.message)
            .bind(c.rating)
            .bind(c.designation)
            .bind(image_key)
            .bind(image_url)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Testimonial::from))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Testimonial>, StoreError> {
        let sql = format!(
            "DELETE FROM testimonials WHERE id = $1 RETURNING {}",
            TESTIMONIAL_COLUMNS
        );
        let row = sqlx::query_as::<_, TestimonialRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Testimonial::from))
    }

    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<Vec<Testimonial>, StoreError> {
        let sql = format!(
            "DELETE FROM testimonials WHERE owner_id = $1 RETURNING {}",
            TESTIMONIAL_COLUMNS
        );
        let rows = sqlx::query_as::<_, TestimonialRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Testimonial::from).collect())
    }

    async fn reorder(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE testimonials AS t
               SET position = (o.ord - 1)::int, updated_at = now()
              FROM UNNEST($2::uuid[]) WITH ORDINALITY AS o(id, ord)
             WHERE t.id = o.id AND t.owner_id = $1
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

    use super::TestimonialStore;
    use crate::error::StoreError;
    use crate::testimonials::repo_types::{NewTestimonial, Testimonial, TestimonialChanges};

    #[derive(Default)]
    pub struct MemoryTestimonialStore {
        rows: Mutex<HashMap<Uuid, Testimonial>>,
    }

    #[async_trait]
    impl TestimonialStore for MemoryTestimonialStore {
        async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<Testimonial>, StoreError> {
            let rows = self.rows.lock().unwrap();
            let mut out: Vec<Testimonial> = rows
                .values()
                .filter(|t| owner_id.map_or(true, |o| t.owner_id == o))
                .cloned()
                .collect();
            out.sort_by(|a, b| (a.position, a.created_at).cmp(&(b.position, b.created_at)));
            Ok(out)
        }

        async fn get(&self, id: Uuid) -> Result<Option<Testimonial>, StoreError> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        async fn insert(&self, new: NewTestimonial) -> Result<Testimonial, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let position = rows
                .values()
                .filter(|t| t.owner_id == new.owner_id)
                .map(|t| t.position + 1)
                .max()
                .unwrap_or(0);
            let now = OffsetDateTime::now_utc();
            let t = Testimonial {
                id: Uuid::new_v4(),
                owner_id: new.owner_id,
                name: new.name,
                message: new.message,
                rating: new.rating,
                designation: new.designation,
                position,
                image: new.image,
                created_at: now,
                updated_at: now,
            };
            rows.insert(t.id, t.clone());
            Ok(t)
        }

        async fn update(
            &self,
            id: Uuid,
            c: TestimonialChanges,
        ) -> Result<Option<Testimonial>, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let Some(t) = rows.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(v) = c.name {
                t.name = v;
            }
            if let Some(v) = c.message {
                t.message = v;
            }
            if let Some(v) = c.rating {
                t.rating = v;
            }
            if let Some(v) = c.designation {
                t.designation = Some(v);
            }
            if let Some(v) = c.image {
                t.image = Some(v);
            }
            t.updated_at = OffsetDateTime::now_utc();
            Ok(Some(t.clone()))
        }

        async fn delete(&self, id: Uuid) -> Result<Option<Testimonial>, StoreError> {
            Ok(self.rows.lock().unwrap().remove(&id))
        }

        async fn delete_by_owner(&self, owner_id: Uuid) -> Result<Vec<Testimonial>, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let ids: Vec<Uuid> = rows
                .values()
                .filter(|t| t.owner_id == owner_id)
                .map(|t| t.id)
                .collect();
            Ok(ids.iter().filter_map(|id| rows.remove(id)).collect())
        }

        async fn reorder(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<(), StoreError> {
            let mut rows = self.rows.lock().unwrap();
            for (i, id) in ids.iter().enumerate() {
                if let Some(t) = rows.get_mut(id).filter(|t| t.owner_id == owner_id) {
                    t.position = i as i32;
                }
            }
            Ok(())
        }
    }
}
