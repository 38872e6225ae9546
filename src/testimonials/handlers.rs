use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{TestimonialEnvelope, TestimonialInput, TestimonialPatch, TestimonialResponse},
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
        .route("/testimonials", get(list_testimonials).merge(user(post(create_testimonial))))
        .route("/testimonials/reorder", user(put(reorder_testimonials)))
        .route(
            "/testimonials/:id",
            get(get_testimonial).merge(user(put(update_testimonial).delete(delete_testimonial))),
        )
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
}

#[instrument(skip(state))]
pub async fn list_testimonials(
    State(state): State<AppState>,
    Query(filter): Query<OwnerFilter>,
) -> Result<Json<Vec<TestimonialResponse>>, AppError> {
    let testimonials = services::list(&state, filter.user_id).await?;
    Ok(Json(testimonials.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn get_testimonial(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TestimonialResponse>, AppError> {
    Ok(Json(services::get(&state, id).await?.into()))
}

/// POST /testimonials (multipart: name, message, rating?, designation?, userId?, image?)
#[instrument(skip(state, me, mp), fields(user_id = %me.0.id))]
pub async fn create_testimonial(
    State(state): State<AppState>,
    me: CurrentUser,
    mp: Multipart,
) -> Result<(StatusCode, Json<TestimonialEnvelope>), AppError> {
    let mut form = FormData::read(mp).await?;
    let input = TestimonialInput::from_form(&form)?;
    let testimonial = services::create(&state, &me, input, form.image.take()).await?;
    Ok((
        StatusCode::CREATED,
        Json(TestimonialEnvelope {
            message: "Testimonial created".into(),
            testimonial: testimonial.into(),
        }),
    ))
}

#[instrument(skip(state, me, mp), fields(user_id = %me.0.id))]
pub async fn update_testimonial(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<Uuid>,
    mp: Multipart,
) -> Result<Json<TestimonialEnvelope>, AppError> {
    let mut form = FormData::read(mp).await?;
    let patch = TestimonialPatch::from_form(&form)?;
    let testimonial = services::update(&state, &me, id, patch, form.image.take()).await?;
    Ok(Json(TestimonialEnvelope {
        message: "Testimonial updated".into(),
        testimonial: testimonial.into(),
    }))
}

#[instrument(skip(state, me), fields(user_id = %me.0.id))]
pub async fn delete_testimonial(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    services::delete(&state, &me, id).await?;
    Ok(Json(MessageResponse::new("Testimonial deleted")))
}

#[instrument(skip(state, me, payload), fields(user_id = %me.0.id))]
pub async fn reorder_testimonials(
    State(state): State<AppState>,
    me: CurrentUser,
    Json(payload): Json<ReorderRequest>,
) -> Result<Json<Vec<TestimonialResponse>>, AppError> {
    let testimonials = services::reorder(&state, &me, payload.ids).await?;
    Ok(Json(testimonials.into_iter().map(Into::into).collect()))
}
