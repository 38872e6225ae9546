use axum::Router;

use crate::state::AppState;

pub mod claims;
pub mod dto;
pub mod gate;
pub mod handlers;
pub mod jwt;
pub mod otp;
pub mod password;
pub mod services;

pub fn router(state: &AppState) -> Router<AppState> {
    handlers::auth_routes(state)
}
