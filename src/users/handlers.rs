use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, put},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateUserRequest, PublicUser, UpdateUserRequest, UserResponse},
    services,
};
use crate::{
    auth::{
        dto::MessageResponse,
        gate::{guarded, Access, CurrentUser},
    },
    error::AppError,
    extract::{Json, Path},
    media::form::FormData,
    state::AppState,
};

pub fn routes(state: &AppState) -> Router<AppState> {
    let admin = |r| guarded(state, Access::Admin, r);
    let user = |r| guarded(state, Access::Authenticated, r);
    Router::new()
        .route("/users", admin(get(list_users).post(create_user)))
        .route(
            "/users/:id",
            user(get(get_user).put(update_user)).merge(admin(axum::routing::delete(delete_user))),
        )
        .route(
            "/users/:id/avatar",
            user(put(update_avatar)).layer(DefaultBodyLimit::max(5 * 1024 * 1024)), // 5MB
        )
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, AppError> {
    let users = services::list(&state).await?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = services::create(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            message: "User created".into(),
            user: PublicUser::from(&user),
        }),
    ))
}

#[instrument(skip(state, me), fields(caller = %me.0.id))]
pub async fn get_user(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, AppError> {
    let user = services::get(&state, &me, id).await?;
    Ok(Json(PublicUser::from(&user)))
}

#[instrument(skip(state, me, payload), fields(caller = %me.0.id))]
pub async fn update_user(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = services::update(&state, &me, id, payload).await?;
    Ok(Json(UserResponse {
        message: "User updated".into(),
        user: PublicUser::from(&user),
    }))
}

/// PUT /users/:id/avatar (multipart: image)
#[instrument(skip(state, me, mp), fields(caller = %me.0.id))]
pub async fn update_avatar(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<Uuid>,
    mp: Multipart,
) -> Result<Json<UserResponse>, AppError> {
    let mut form = FormData::read(mp).await?;
    let user = services::set_avatar(&state, &me, id, form.image.take()).await?;
    Ok(Json(UserResponse {
        message: "Avatar updated".into(),
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip(state, me), fields(caller = %me.0.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    services::delete(&state, &me, id).await?;
    Ok(Json(MessageResponse::new("User deleted")))
}
