//! Request authentication and per-route authorization.
//!
//! A request moves `NoToken -> TokenPresent -> Authenticated -> Resolved`.
//! Every failed step ends in the same 401; only the log says which one.
//! Routes declare the [`Access`] they need and [`guarded`] enforces it.

use std::fmt;

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::{
    error::AppError,
    state::AppState,
    users::repo_types::{Role, User},
};

/// What a route requires from its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Authenticated,
    Admin,
}

impl Access {
    pub fn permits(self, role: Role) -> bool {
        match self {
            Access::Authenticated => true,
            Access::Admin => role == Role::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    NoToken,
    BadScheme,
    InvalidToken,
    UnknownUser,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rejection::NoToken => "missing authorization header",
            Rejection::BadScheme => "not a bearer token",
            Rejection::InvalidToken => "invalid or expired token",
            Rejection::UnknownUser => "token subject no longer exists",
        };
        f.write_str(s)
    }
}

impl From<Rejection> for AppError {
    fn from(_: Rejection) -> Self {
        AppError::Unauthorized("Not authorized".into())
    }
}

fn bearer(headers: &HeaderMap) -> Result<&str, Rejection> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(Rejection::NoToken)?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(Rejection::BadScheme)
}

async fn resolve_steps(st: &AppState, headers: &HeaderMap) -> Result<User, Rejection> {
    let token = bearer(headers)?;
    let claims = JwtKeys::from_ref(st)
        .verify(token)
        .map_err(|_| Rejection::InvalidToken)?;
    match st.users.find_by_id(claims.sub).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(Rejection::UnknownUser),
        Err(e) => {
            warn!(error = %e, user_id = %claims.sub, "user lookup failed during auth");
            Err(Rejection::UnknownUser)
        }
    }
}

/// Runs the header -> token -> user chain.
pub async fn resolve(st: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    resolve_steps(st, headers).await.map_err(|r| {
        warn!(reason = %r, "request rejected");
        AppError::from(r)
    })
}

async fn gate(
    State((st, access)): State<(AppState, Access)>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let headers = req.headers().clone();
    let user = resolve(&st, &headers).await?;
    if !access.permits(user.role) {
        warn!(user_id = %user.id, role = user.role.as_str(), required = ?access, "forbidden");
        return Err(AppError::Forbidden("Access denied".into()));
    }
    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Attaches the access check for `access` to every method in `route`.
pub fn guarded(st: &AppState, access: Access, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state((st.clone(), access), gate))
}

/// The caller resolved by the gate.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.0.role == Role::Admin
    }

    /// Owners manage their own records; admins manage everyone's.
    pub fn ensure_can_manage(&self, owner_id: Uuid) -> Result<(), AppError> {
        if self.is_admin() || self.0.id == owner_id {
            Ok(())
        } else {
            Err(AppError::Forbidden("Access denied".into()))
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Not authorized".into()))
    }
}
