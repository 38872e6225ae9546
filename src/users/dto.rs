use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Role, User};

/// Public part of the user returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub mobile: Option<String>,
    pub role: Role,
    pub is_verified: bool,
    pub avatar_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            name: u.name.clone(),
            mobile: u.mobile.clone(),
            role: u.role,
            is_verified: u.is_verified,
            avatar_url: u.avatar.as_ref().map(|a| a.url.clone()),
            created_at: u.created_at,
        }
    }
}

/// Admin-side account creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub mobile: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    /// Blank clears the number; absent or null keeps it.
    pub mobile: Option<String>,
    pub role: Option<Role>,
    pub is_verified: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: String,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_hides_credentials() {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: "coach@example.com".into(),
            name: "Coach".into(),
            mobile: None,
            password_hash: Some("$argon2id$secret".into()),
            role: Role::User,
            is_verified: true,
            otp: None,
            avatar: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(PublicUser::from(&user)).unwrap();
        assert_eq!(json["email"], "coach@example.com");
        assert_eq!(json["role"], "user");
        assert_eq!(json["isVerified"], true);
        let text = json.to_string();
        assert!(!text.contains("argon2"));
        assert!(!text.contains("otp"));
    }
}
