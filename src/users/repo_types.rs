use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{auth::otp::OtpPurpose, media::StoredMedia};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role {:?}", other)),
        }
    }
}

/// Hashed one-time code. Hash, expiry and purpose only exist together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOtp {
    pub hash: String,
    pub expires_at: OffsetDateTime,
    pub purpose: OtpPurpose,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub mobile: Option<String>,
    pub password_hash: Option<String>,
    pub role: Role,
    pub is_verified: bool,
    pub otp: Option<StoredOtp>,
    pub avatar: Option<StoredMedia>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub mobile: Option<String>,
    pub password_hash: Option<String>,
    pub role: String,
    pub is_verified: bool,
    pub otp_hash: Option<String>,
    pub otp_expires_at: Option<OffsetDateTime>,
    pub otp_purpose: Option<String>,
    pub avatar_key: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = sqlx::Error;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&r.role).map_err(|e| sqlx::Error::Decode(e.into()))?;
        let otp = match (r.otp_hash, r.otp_expires_at, r.otp_purpose) {
            (Some(hash), Some(expires_at), Some(purpose)) => Some(StoredOtp {
                hash,
                expires_at,
                purpose: OtpPurpose::from_str(&purpose)
                    .map_err(|e| sqlx::Error::Decode(e.into()))?,
            }),
            _ => None,
        };
        Ok(User {
            id: r.id,
            email: r.email,
            name: r.name,
            mobile: r.mobile,
            password_hash: r.password_hash,
            role,
            is_verified: r.is_verified,
            otp,
            avatar: StoredMedia::from_columns(r.avatar_key, r.avatar_url),
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub mobile: Option<String>,
    pub password_hash: Option<String>,
    pub role: Role,
    pub is_verified: bool,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    /// `Some(None)` clears the number.
    pub mobile: Option<Option<String>>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub is_verified: Option<bool>,
    pub avatar: Option<StoredMedia>,
}
