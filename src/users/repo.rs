use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewUser, StoredOtp, User, UserChanges, UserRow};
use crate::error::StoreError;

const USER_COLUMNS: &str = "id, email, name, mobile, password_hash, role, is_verified, \
     otp_hash, otp_expires_at, otp_purpose, avatar_key, avatar_url, created_at, updated_at";

/// Credential store. Emails are expected to be normalized by the caller.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn list(&self) -> Result<Vec<User>, StoreError>;
    async fn insert(&self, new: NewUser) -> Result<User, StoreError>;
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError>;
    /// Replaces whatever code was stored before.
    async fn set_otp(&self, id: Uuid, otp: &StoredOtp) -> Result<(), StoreError>;
    /// Drops the stored code and marks the mailbox as verified, but only while
    /// `hash` is still the stored code. Returns false when it was already
    /// consumed or replaced.
    async fn consume_otp(&self, id: Uuid, hash: &str) -> Result<bool, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at DESC", USER_COLUMNS);
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO users (id, email, name, mobile, password_hash, role, is_verified)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.email)
            .bind(&new.name)
            .bind(&new.mobile)
            .bind(&new.password_hash)
            .bind(new.role.as_str())
            .bind(new.is_verified)
            .fetch_one(&self.db)
            .await
            .map_err(|e| StoreError::from_sqlx(e, "email"))?;
        Ok(User::try_from(row)?)
    }

    async fn update(&self, id: Uuid, c: UserChanges) -> Result<Option<User>, StoreError> {
        let sql = format!(
            r#"
            UPDATE users SET
                name          = COALESCE($2, name),
                mobile        = CASE WHEN $9 THEN $3 ELSE mobile END,
                password_hash = COALESCE($4, password_hash),
                role          = COALESCE($5, role),
                is_verified   = COALESCE($6, is_verified),
                avatar_key    = COALESCE($7, avatar_key),
                avatar_url    = COALESCE($8, avatar_url),
                updated_at    = now()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let (avatar_key, avatar_url) = match c.avatar {
            Some(m) => (Some(m.key), Some(m.url)),
            None => (None, None),
        };
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(c.name)
            .bind(c.mobile.clone().flatten())
            .bind(c.password_hash)
            .bind(c.role.map(|r| r.as_str()))
            .bind(c.is_verified)
            .bind(avatar_key)
            .bind(avatar_url)
            .bind(c.mobile.is_some())
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn set_otp(&self, id: Uuid, otp: &StoredOtp) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users
               SET otp_hash = $2, otp_expires_at = $3, otp_purpose = $4, updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&otp.hash)
        .bind(otp.expires_at)
        .bind(otp.purpose.as_str())
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn consume_otp(&self, id: Uuid, hash: &str) -> Result<bool, StoreError> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET otp_hash = NULL, otp_expires_at = NULL, otp_purpose = NULL,
                   is_verified = TRUE, updated_at = now()
             WHERE id = $1 AND otp_hash = $2
            "#,
        )
        .bind(id)
        .bind(hash)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
