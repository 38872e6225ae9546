use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{FacultyEnvelope, FacultyInput, FacultyPatch, FacultyResponse},
    services,
};
use crate::{
    auth::{
        dto::MessageResponse,
        gate::{guarded, Access, CurrentUser},
    },
    error::AppError,
    extract::{Json, Path, Query},
    media::form::FormData,
    ordering::{OwnerFilter, ReorderRequest},
    state::AppState,
};

pub fn routes(state: &AppState) -> Router<AppState> {
    let user = |r| guarded(state, Access::Authenticated, r);
    Router::new()
        .route("/faculty", get(list_faculty).merge(user(post(create_faculty))))
        .route("/faculty/reorder", user(put(reorder_faculty)))
        .route(
            "/faculty/:id",
            get(get_faculty).merge(user(put(update_faculty).delete(delete_faculty))),
        )
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
}

#[instrument(skip(state))]
pub async fn list_faculty(
    State(state): State<AppState>,
    Query(filter): Query<OwnerFilter>,
) -> Result<Json<Vec<FacultyResponse>>, AppError> {
    let faculty = services::list(&state, filter.user_id).await?;
    Ok(Json(faculty.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn get_faculty(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FacultyResponse>, AppError> {
    Ok(Json(services::get(&state, id).await?.into()))
}

/// POST /faculty (multipart: name, designation?, subject?, bio?, experienceYears?, userId?, image?)
#[instrument(skip(state, me, mp), fields(user_id = %me.0.id))]
pub async fn create_faculty(
    State(state): State<AppState>,
    me: CurrentUser,
    mp: Multipart,
) -> Result<(StatusCode, Json<FacultyEnvelope>), AppError> {
    let mut form = FormData::read(mp).await?;
    let input = FacultyInput::from_form(&form)?;
    let faculty = services::create(&state, &me, input, form.image.take()).await?;
    Ok((
        StatusCode::CREATED,
        Json(FacultyEnvelope {
            message: "Faculty member added".into(),
            faculty: faculty.into(),
        }),
    ))
}

#[instrument(skip(state, me, mp), fields(user_id = %me.0.id))]
pub async fn update_faculty(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<Uuid>,
    mp: Multipart,
) -> Result<Json<FacultyEnvelope>, AppError> {
    let mut form = FormData::read(mp).await?;
    let patch = FacultyPatch::from_form(&form)?;
    let faculty = services::update(&state, &me, id, patch, form.image.take()).await?;
    Ok(Json(FacultyEnvelope {
        message: "Faculty member updated".into(),
        faculty: faculty.into(),
    }))
}

#[instrument(skip(state, me), fields(user_id = %me.0.id))]
pub async fn delete_faculty(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    services::delete(&state, &me, id).await?;
    Ok(Json(MessageResponse::new("Faculty member removed")))
}

#[instrument(skip(state, me, payload), fields(user_id = %me.0.id))]
pub async fn reorder_faculty(
    State(state): State<AppState>,
    me: CurrentUser,
    Json(payload): Json<ReorderRequest>,
) -> Result<Json<Vec<FacultyResponse>>, AppError> {
    let faculty = services::reorder(&state, &me, payload.ids).await?;
    Ok(Json(faculty.into_iter().map(Into::into).collect()))
}
