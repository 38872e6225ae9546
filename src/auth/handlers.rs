use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::instrument;

use super::{
    dto::{
        AuthResponse, EmailRequest, LoginRequest, MessageResponse, ResetPasswordRequest,
        SignupRequest, VerifyOtpRequest,
    },
    gate::{guarded, Access, CurrentUser},
    services,
};
use crate::{error::AppError, extract::Json, state::AppState, users::dto::PublicUser};

pub fn auth_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/resend-signup-otp", post(resend_signup_otp))
        .route("/auth/verify-signup-otp", post(verify_signup_otp))
        .route("/auth/login", post(login))
        .route("/auth/send-login-otp", post(send_login_otp))
        .route("/auth/verify-login-otp", post(verify_login_otp))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/me", guarded(state, Access::Authenticated, get(get_me)))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let res = services::signup(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

#[instrument(skip(state, payload))]
pub async fn resend_signup_otp(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    services::resend_signup_otp(&state, payload).await.map(Json)
}

#[instrument(skip(state, payload))]
pub async fn verify_signup_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    services::verify_signup_otp(&state, payload).await.map(Json)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    services::login(&state, payload).await.map(Json)
}

#[instrument(skip(state, payload))]
pub async fn send_login_otp(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    services::send_login_otp(&state, payload).await.map(Json)
}

#[instrument(skip(state, payload))]
pub async fn verify_login_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    services::verify_login_otp(&state, payload).await.map(Json)
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    services::forgot_password(&state, payload).await.map(Json)
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    services::reset_password(&state, payload).await.map(Json)
}

#[instrument(skip_all, fields(user_id = %me.0.id))]
pub async fn get_me(me: CurrentUser) -> Json<PublicUser> {
    Json(PublicUser::from(&me.0))
}
