use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{FacultyChanges, FacultyMember, FacultyRow, NewFacultyMember};
use crate::error::StoreError;

const FACULTY_COLUMNS: &str = "id, owner_id, name, designation, subject, bio, experience_years, \
     position, photo_key, photo_url, created_at, updated_at";

#[async_trait]
pub trait FacultyStore: Send + Sync {
    async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<FacultyMember>, StoreError>;
    async fn get(&self, id: Uuid) -> Result<Option<FacultyMember>, StoreError>;
    async fn insert(&self, new: NewFacultyMember) -> Result<FacultyMember, StoreError>;
    async fn update(
        &self,
        id: Uuid,
        changes: FacultyChanges,
    ) -> Result<Option<FacultyMember>, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<Option<FacultyMember>, StoreError>;
    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<Vec<FacultyMember>, StoreError>;
    async fn reorder(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<(), StoreError>;
}

pub struct PgFacultyStore {
    db: PgPool,
}

impl PgFacultyStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FacultyStore for PgFacultyStore {
    async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<FacultyMember>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}
              FROM faculty_members
             WHERE $1::uuid IS NULL OR owner_id = $1
             ORDER BY position ASC, created_at ASC
            "#,
            FACULTY_COLUMNS
        );
        let rows = sqlx::query_as::<_, FacultyRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(FacultyMember::from).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<FacultyMember>, StoreError> {
        let sql = format!("SELECT {} FROM faculty_members WHERE id = $1", FACULTY_COLUMNS);
        let row = sqlx::query_as::<_, FacultyRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(FacultyMember::from))
    }

    async fn insert(&self, new: NewFacultyMember) -> Result<FacultyMember, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO faculty_members
                (id, owner_id, name, designation, subject, bio, experience_years,
                 photo_key, photo_url, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9,
                    COALESCE((SELECT MAX(position) + 1 FROM faculty_members WHERE owner_id = $2), 0))
            RETURNING {}
            "#,
            FACULTY_COLUMNS
        );
        let (photo_key, photo_url) = match new.photo {
            Some(m) => (Some(m.key), Some(m.url)),
            None => (None, None),
        };
        let row = sqlx::query_as::<_, FacultyRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.owner_id)
            .bind(new.name)
            .bind(new.designation)
            .bind(new.subject)
            .bind(new.bio)
            .bind(new.experience_years)
            .bind(photo_key)
            .bind(photo_url)
            .fetch_one(&self.db)
            .await?;
        Ok(row.into())
    }

    async fn update(
        &self,
        id: Uuid,
        c: FacultyChanges,
    ) -> Result<Option<FacultyMember>, StoreError> {
        let sql = format!(
            r#"
            UPDATE faculty_members SET
                name             = COALESCE($2, name),
                designation      = COALESCE($3, designation),
                subject          = COALESCE($4, subject),
                bio              = COALESCE($5, bio),
                experience_years = COALESCE($6, experience_years),
                photo_key        = COALESCE($7, photo_key),
                photo_url        = COALESCE($8, photo_url),
                updated_at       = now()
            WHERE id = $1
            RETURNING {}
            "#,
            FACULTY_COLUMNS
        );
        let (photo_key, photo_url) = match c.photo {
            Some(m) => (Some(m.key), Some(m.url)),
            None => (None, None),
        };
        let row = sqlx::query_as::<_, FacultyRow>(&sql)
            .bind(id)
            .bind(c.name)
            .bind(c.designation)
            .bind(c.subject)
            .bind(c.bio)
            .bind(c.experience_years)
            .bind(photo_key)
            .bind(photo_url)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(FacultyMember::from))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<FacultyMember>, StoreError> {
        let sql = format!(
            "DELETE FROM faculty_members WHERE id = $1 RETURNING {}",
            FACULTY_COLUMNS
        );
        let row = sqlx::query_as::<_, FacultyRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(FacultyMember::from))
    }

    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<Vec<FacultyMember>, StoreError> {
        let sql = format!(
            "DELETE FROM faculty_members WHERE owner_id = $1 RETURNING {}",
            FACULTY_COLUMNS
        );
        let rows = sqlx::query_as::<_, FacultyRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(FacultyMember::from).collect())
    }

    async fn reorder(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE faculty_members AS f
               SET position = (o.ord - 1)::int, updated_at = now()
              FROM UNNEST($2::uuid[]) WITH ORDINALITY AS o(id, ord)
             WHERE f.id = o.id AND f.owner_id = $1
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

    use super::FacultyStore;
    use crate::error::StoreError;
    use crate::faculty::repo_types::{FacultyChanges, FacultyMember, NewFacultyMember};

    #[derive(Default)]
    pub struct MemoryFacultyStore {
        rows: Mutex<HashMap<Uuid, FacultyMember>>,
    }

    #[async_trait]
    impl FacultyStore for MemoryFacultyStore {
        async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<FacultyMember>, StoreError> {
            let rows = self.rows.lock().unwrap();
            let mut out: Vec<FacultyMember> = rows
                .values()
                .filter(|f| owner_id.map_or(true, |o| f.owner_id == o))
                .cloned()
                .collect();
            out.sort_by(|a, b| (a.position, a.created_at).cmp(&(b.position, b.created_at)));
            Ok(out)
        }

        async fn get(&self, id: Uuid) -> Result<Option<FacultyMember>, StoreError> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        async fn insert(&self, new: NewFacultyMember) -> Result<FacultyMember, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let position = rows
                .values()
                .filter(|f| f.owner_id == new.owner_id)
                .map(|f| f.position + 1)
                .max()
                .unwrap_or(0);
            let now = OffsetDateTime::now_utc();
            let member = FacultyMember {
                id: Uuid::new_v4(),
                owner_id: new.owner_id,
                name: new.name,
                designation: new.designation,
                subject: new.subject,
                bio: new.bio,
                experience_years: new.experience_years,
                position,
                photo: new.photo,
                created_at: now,
                updated_at: now,
            };
            rows.insert(member.id, member.clone());
            Ok(member)
        }

        async fn update(
            &self,
            id: Uuid,
            c: FacultyChanges,
        ) -> Result<Option<FacultyMember>, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let Some(f) = rows.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(v) = c.name {
                f.name = v;
            }
            if let Some(v) = c.designation {
                f.designation = Some(v);
            }
            if let Some(v) = c.subject {
                f.subject = Some(v);
            }
            if let Some(v) = c.bio {
                f.bio = Some(v);
            }
            if let Some(v) = c.experience_years {
                f.experience_years = Some(v);
            }
            if let Some(v) = c.photo {
                f.photo = Some(v);
            }
            f.updated_at = OffsetDateTime::now_utc();
            Ok(Some(f.clone()))
        }

        async fn delete(&self, id: Uuid) -> Result<Option<FacultyMember>, StoreError> {
            Ok(self.rows.lock().unwrap().remove(&id))
        }

        async fn delete_by_owner(&self, owner_id: Uuid) -> Result<Vec<FacultyMember>, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let ids: Vec<Uuid> = rows
                .values()
                .filter(|f| f.owner_id == owner_id)
                .map(|f| f.id)
                .collect();
            Ok(ids.iter().filter_map(|id| rows.remove(id)).collect())
        }

        async fn reorder(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<(), StoreError> {
            let mut rows = self.rows.lock().unwrap();
            for (i, id) in ids.iter().enumerate() {
                if let Some(f) = rows.get_mut(id).filter(|f| f.owner_id == owner_id) {
                    f.position = i as i32;
                }
            }
            Ok(())
        }
    }
}
