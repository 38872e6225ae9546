use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::{
    dto::{
        AuthResponse, EmailRequest, LoginRequest, MessageResponse, ResetPasswordRequest,
        SignupRequest, VerifyOtpRequest,
    },
    jwt::JwtKeys,
    otp::{self, OtpPurpose},
    password::{hash_password, validate_new_password, verify_password},
};
use crate::{
    error::AppError,
    state::AppState,
    users::{
        dto::PublicUser,
        repo_types::{NewUser, Role, User, UserChanges},
    },
};

/// Trims and lowercases; rejects anything that does not look like an address.
pub(crate) fn normalize_email(raw: &str) -> Result<String, AppError> {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    let email = raw.trim().to_lowercase();
    if !EMAIL_RE.is_match(&email) {
        return Err(AppError::validation("Invalid email"));
    }
    Ok(email)
}

pub(crate) fn required_text(value: &str, field: &str) -> Result<String, AppError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(v.to_string())
}

pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn user_by_email(st: &AppState, email: &str) -> Result<User, AppError> {
    st.users
        .find_by_email(email)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

fn session(st: &AppState, user: &User, message: &str) -> Result<AuthResponse, AppError> {
    let token = JwtKeys::from_ref(st)
        .sign(user.id, user.role)
        .map_err(AppError::internal)?;
    Ok(AuthResponse {
        message: message.to_string(),
        token,
        user: PublicUser::from(user),
    })
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".into())
}

pub async fn signup(st: &AppState, req: SignupRequest) -> Result<MessageResponse, AppError> {
    let email = normalize_email(&req.email)?;
    let name = required_text(&req.name, "name")?;
    validate_new_password(&req.password)?;
    let password_hash = hash_password(&req.password).map_err(AppError::internal)?;
    let mobile = optional_text(req.mobile);

    if let Some(existing) = st.users.find_by_email(&email).await? {
        warn!(%email, verified = existing.is_verified, "signup for registered email");
        let message = if existing.is_verified {
            "Email already registered"
        } else {
            "Email already registered, request a new verification code instead"
        };
        return Err(AppError::Conflict(message.into()));
    }
    let user = st
        .users
        .insert(NewUser {
            email,
            name,
            mobile,
            password_hash: Some(password_hash),
            role: Role::User,
            is_verified: false,
        })
        .await?;

    otp::issue(st, &user, OtpPurpose::Signup).await?;
    info!(user_id = %user.id, email = %user.email, "user signed up");
    Ok(MessageResponse::new(
        "Signup successful, check your email for the verification code",
    ))
}

pub async fn resend_signup_otp(st: &AppState, req: EmailRequest) -> Result<MessageResponse, AppError> {
    let email = normalize_email(&req.email)?;
    let user = user_by_email(st, &email).await?;
    if user.is_verified {
        return Err(AppError::validation("Email is already verified"));
    }
    otp::issue(st, &user, OtpPurpose::Signup).await?;
    Ok(MessageResponse::new("Verification code sent"))
}

pub async fn verify_signup_otp(st: &AppState, req: VerifyOtpRequest) -> Result<AuthResponse, AppError> {
    let email = normalize_email(&req.email)?;
    let user = user_by_email(st, &email).await?;
    otp::verify(st, &user, OtpPurpose::Signup, &req.otp).await?;
    let user = user_by_email(st, &email).await?;
    info!(user_id = %user.id, "email verified");
    session(st, &user, "Email verified")
}

pub async fn login(st: &AppState, req: LoginRequest) -> Result<AuthResponse, AppError> {
    let email = normalize_email(&req.email)?;
    let Some(user) = st.users.find_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(invalid_credentials());
    };
    if !user.is_verified {
        warn!(user_id = %user.id, "login before verification");
        return Err(AppError::Forbidden(
            "Please verify your email before logging in".into(),
        ));
    }
    let Some(hash) = user.password_hash.as_deref() else {
        warn!(user_id = %user.id, "password login for otp-only account");
        return Err(invalid_credentials());
    };
    if !verify_password(&req.password, hash).map_err(AppError::internal)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(invalid_credentials());
    }
    info!(user_id = %user.id, "user logged in");
    session(st, &user, "Login successful")
}

pub async fn send_login_otp(st: &AppState, req: EmailRequest) -> Result<MessageResponse, AppError> {
    let email = normalize_email(&req.email)?;
    let user = user_by_email(st, &email).await?;
    otp::issue(st, &user, OtpPurpose::Login).await?;
    Ok(MessageResponse::new("Login code sent"))
}

pub async fn verify_login_otp(st: &AppState, req: VerifyOtpRequest) -> Result<AuthResponse, AppError> {
    let email = normalize_email(&req.email)?;
    let user = user_by_email(st, &email).await?;
    otp::verify(st, &user, OtpPurpose::Login, &req.otp).await?;
    let user = user_by_email(st, &email).await?;
    info!(user_id = %user.id, "user logged in with otp");
    session(st, &user, "Login successful")
}

pub async fn forgot_password(st: &AppState, req: EmailRequest) -> Result<MessageResponse, AppError> {
    let email = normalize_email(&req.email)?;
    let user = user_by_email(st, &email).await?;
    otp::issue(st, &user, OtpPurpose::PasswordReset).await?;
    Ok(MessageResponse::new("Password reset code sent"))
}

pub async fn reset_password(st: &AppState, req: ResetPasswordRequest) -> Result<MessageResponse, AppError> {
    let email = normalize_email(&req.email)?;
    validate_new_password(&req.new_password)?;
    let user = user_by_email(st, &email).await?;
    otp::verify(st, &user, OtpPurpose::PasswordReset, &req.otp).await?;

    let password_hash = hash_password(&req.new_password).map_err(AppError::internal)?;
    st.users
        .update(
            user.id,
            UserChanges {
                password_hash: Some(password_hash),
                ..Default::default()
            },
        )
        .await?;
    info!(user_id = %user.id, "password reset");
    Ok(MessageResponse::new("Password has been reset"))
}
