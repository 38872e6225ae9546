//! One-time codes: generation, hashing at rest, single-use verification.
//!
//! Only the latest code per user is kept; issuing a new one silently
//! invalidates the previous code.

use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use super::password::{hash_password, verify_password};
use crate::{
    error::AppError,
    state::AppState,
    users::repo_types::{StoredOtp, User},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    Signup,
    Login,
    PasswordReset,
}

impl OtpPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            OtpPurpose::Signup => "signup",
            OtpPurpose::Login => "login",
            OtpPurpose::PasswordReset => "password_reset",
        }
    }
}

impl FromStr for OtpPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signup" => Ok(OtpPurpose::Signup),
            "login" => Ok(OtpPurpose::Login),
            "password_reset" => Ok(OtpPurpose::PasswordReset),
            other => Err(format!("unknown otp purpose {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OtpError {
    #[error("No OTP found, please request a new one")]
    NotFound,
    #[error("OTP has expired, please request a new one")]
    Expired,
    #[error("Invalid OTP")]
    Mismatch,
}

/// Decimal code, every digit drawn independently from 0-9.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Decides whether `submitted` matches what is stored for `purpose` at `now`.
pub fn check(
    stored: Option<&StoredOtp>,
    purpose: OtpPurpose,
    submitted: &str,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    let stored = match stored {
        Some(s) if s.purpose == purpose => s,
        _ => return Err(OtpError::NotFound.into()),
    };
    if now > stored.expires_at {
        return Err(OtpError::Expired.into());
    }
    if !verify_password(submitted, &stored.hash).map_err(AppError::internal)? {
        return Err(OtpError::Mismatch.into());
    }
    Ok(())
}

/// Stores a fresh code for `user` and mails the plaintext to them.
pub async fn issue(st: &AppState, user: &User, purpose: OtpPurpose) -> Result<String, AppError> {
    let cfg = &st.config.otp;
    let code = generate_code(cfg.length);
    let otp = StoredOtp {
        hash: hash_password(&code).map_err(AppError::internal)?,
        expires_at: OffsetDateTime::now_utc() + Duration::minutes(cfg.expiry_minutes),
        purpose,
    };
    st.users.set_otp(user.id, &otp).await?;

    st.mailer
        .send_otp(&user.email, &code, purpose, cfg.expiry_minutes)
        .await
        .map_err(|e| AppError::Upstream(e.into()))?;

    info!(user_id = %user.id, purpose = purpose.as_str(), "otp issued");
    Ok(code)
}

/// Checks `submitted` and, on success, consumes the code and marks the user verified.
pub async fn verify(
    st: &AppState,
    user: &User,
    purpose: OtpPurpose,
    submitted: &str,
) -> Result<(), AppError> {
    if let Err(e) = check(
        user.otp.as_ref(),
        purpose,
        submitted.trim(),
        OffsetDateTime::now_utc(),
    ) {
        warn!(user_id = %user.id, purpose = purpose.as_str(), error = %e, "otp rejected");
        return Err(e);
    }
    let Some(stored) = user.otp.as_ref() else {
        return Err(OtpError::NotFound.into());
    };
    // a racing verify or a re-issue since `user` was loaded wins
    if !st.users.consume_otp(user.id, &stored.hash).await? {
        warn!(user_id = %user.id, purpose = purpose.as_str(), "otp already consumed or replaced");
        return Err(OtpError::NotFound.into());
    }
    debug!(user_id = %user.id, purpose = purpose.as_str(), "otp consumed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::{NewUser, Role};

    fn stored(code: &str, purpose: OtpPurpose, expires_in: Duration) -> StoredOtp {
        StoredOtp {
            hash: hash_password(code).unwrap(),
            expires_at: OffsetDateTime::now_utc() + expires_in,
            purpose,
        }
    }

    fn otp_err(res: Result<(), AppError>) -> OtpError {
        match res {
            Err(AppError::Otp(e)) => e,
            other => panic!("expected otp error, got {:?}", other),
        }
    }

    async fn seeded_user(st: &AppState, email: &str) -> User {
        st.users
            .insert(NewUser {
                email: email.into(),
                name: "Coach".into(),
                mobile: None,
                password_hash: None,
                role: Role::User,
                is_verified: false,
            })
            .await
            .unwrap()
    }

    async fn reload(st: &AppState, user: &User) -> User {
        st.users.find_by_id(user.id).await.unwrap().unwrap()
    }

    #[test]
    fn codes_have_requested_length_and_are_numeric() {
        for len in [4, 6, 8] {
            let code = generate_code(len);
            assert_eq!(code.len(), len);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn codes_vary() {
        let codes: std::collections::HashSet<String> = (0..50).map(|_| generate_code(6)).collect();
        assert!(codes.len() > 40);
    }

    #[test]
    fn purpose_round_trips_through_its_column_value() {
        for p in [OtpPurpose::Signup, OtpPurpose::Login, OtpPurpose::PasswordReset] {
            assert_eq!(OtpPurpose::from_str(p.as_str()).unwrap(), p);
        }
        assert!(OtpPurpose::from_str("sms").is_err());
    }

    #[test]
    fn check_accepts_matching_code() {
        let s = stored("123456", OtpPurpose::Login, Duration::minutes(10));
        assert!(check(Some(&s), OtpPurpose::Login, "123456", OffsetDateTime::now_utc()).is_ok());
    }

    #[test]
    fn check_without_code_is_not_found() {
        let err = otp_err(check(None, OtpPurpose::Login, "123456", OffsetDateTime::now_utc()));
        assert_eq!(err, OtpError::NotFound);
    }

    #[test]
    fn check_for_other_purpose_is_not_found() {
        let s = stored("123456", OtpPurpose::Signup, Duration::minutes(10));
        let err = otp_err(check(Some(&s), OtpPurpose::PasswordReset, "123456", OffsetDateTime::now_utc()));
        assert_eq!(err, OtpError::NotFound);
    }

    #[test]
    fn check_after_expiry_is_expired_even_if_correct() {
        let s = stored("123456", OtpPurpose::Login, Duration::minutes(10));
        let later = OffsetDateTime::now_utc() + Duration::minutes(11);
        assert_eq!(otp_err(check(Some(&s), OtpPurpose::Login, "123456", later)), OtpError::Expired);
        assert_eq!(otp_err(check(Some(&s), OtpPurpose::Login, "000000", later)), OtpError::Expired);
    }

    #[test]
    fn check_wrong_code_is_mismatch() {
        let s = stored("123456", OtpPurpose::Login, Duration::minutes(10));
        let err = otp_err(check(Some(&s), OtpPurpose::Login, "654321", OffsetDateTime::now_utc()));
        assert_eq!(err, OtpError::Mismatch);
    }

    #[tokio::test]
    async fn issue_hashes_code_and_mails_plaintext() {
        let (st, fakes) = AppState::fake();
        let user = seeded_user(&st, "user@example.com").await;

        let code = issue(&st, &user, OtpPurpose::Signup).await.unwrap();

        let user = reload(&st, &user).await;
        let otp = user.otp.expect("otp stored");
        assert_ne!(otp.hash, code);
        assert!(otp.expires_at > OffsetDateTime::now_utc());
        assert_eq!(otp.purpose, OtpPurpose::Signup);
        assert_eq!(fakes.mailer.last_code_for("user@example.com"), Some(code));
    }

    #[tokio::test]
    async fn wrong_code_keeps_otp_then_correct_code_clears_it() {
        let (st, _) = AppState::fake();
        let user = seeded_user(&st, "user@example.com").await;
        let code = issue(&st, &user, OtpPurpose::Login).await.unwrap();
        let wrong = if code == "000000" { "111111" } else { "000000" };

        let user = reload(&st, &user).await;
        let err = otp_err(verify(&st, &user, OtpPurpose::Login, wrong).await);
        assert_eq!(err, OtpError::Mismatch);
        assert!(reload(&st, &user).await.otp.is_some());

        verify(&st, &user, OtpPurpose::Login, &code).await.unwrap();
        let user = reload(&st, &user).await;
        assert!(user.otp.is_none());
        assert!(user.is_verified);
    }

    #[tokio::test]
    async fn code_is_single_use() {
        let (st, _) = AppState::fake();
        let user = seeded_user(&st, "user@example.com").await;
        let code = issue(&st, &user, OtpPurpose::Signup).await.unwrap();

        verify(&st, &reload(&st, &user).await, OtpPurpose::Signup, &code)
            .await
            .unwrap();
        let err = otp_err(verify(&st, &reload(&st, &user).await, OtpPurpose::Signup, &code).await);
        assert_eq!(err, OtpError::NotFound);
    }

    #[tokio::test]
    async fn stale_snapshots_cannot_reuse_a_code() {
        let (st, _) = AppState::fake();
        let user = seeded_user(&st, "user@example.com").await;
        let code = issue(&st, &user, OtpPurpose::Login).await.unwrap();

        let first = reload(&st, &user).await;
        let second = reload(&st, &user).await;
        verify(&st, &first, OtpPurpose::Login, &code).await.unwrap();
        let err = otp_err(verify(&st, &second, OtpPurpose::Login, &code).await);
        assert_eq!(err, OtpError::NotFound);
    }

    #[tokio::test]
    async fn stale_verify_leaves_newer_code_in_place() {
        let (st, _) = AppState::fake();
        let user = seeded_user(&st, "user@example.com").await;
        let old_code = issue(&st, &user, OtpPurpose::Login).await.unwrap();
        let stale = reload(&st, &user).await;
        let new_code = issue(&st, &user, OtpPurpose::Login).await.unwrap();

        let err = otp_err(verify(&st, &stale, OtpPurpose::Login, &old_code).await);
        assert_eq!(err, OtpError::NotFound);
        assert!(reload(&st, &user).await.otp.is_some());
        verify(&st, &reload(&st, &user).await, OtpPurpose::Login, &new_code)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reissue_invalidates_previous_code() {
        let (st, _) = AppState::fake();
        let user = seeded_user(&st, "user@example.com").await;
        let first = issue(&st, &user, OtpPurpose::Login).await.unwrap();
        let second = issue(&st, &user, OtpPurpose::Login).await.unwrap();

        if first != second {
            let err = otp_err(verify(&st, &reload(&st, &user).await, OtpPurpose::Login, &first).await);
            assert_eq!(err, OtpError::Mismatch);
        }
        verify(&st, &reload(&st, &user).await, OtpPurpose::Login, &second)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn expired_code_is_rejected() {
        let (st, _) = AppState::fake();
        let user = seeded_user(&st, "user@example.com").await;
        let past = StoredOtp {
            hash: hash_password("123456").unwrap(),
            expires_at: OffsetDateTime::now_utc() - Duration::minutes(1),
            purpose: OtpPurpose::Login,
        };
        st.users.set_otp(user.id, &past).await.unwrap();

        let err = otp_err(verify(&st, &reload(&st, &user).await, OtpPurpose::Login, "123456").await);
        assert_eq!(err, OtpError::Expired);
    }

    #[tokio::test]
    async fn mail_failure_is_upstream_error() {
        let (st, _) = AppState::fake_with(
            Default::default(),
            crate::mail::fake::RecordingMailer {
                fail: true,
                ..Default::default()
            },
        );
        let user = seeded_user(&st, "user@example.com").await;
        let err = issue(&st, &user, OtpPurpose::Login).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
