use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{BannerEnvelope, BannerInput, BannerPatch, BannerResponse},
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
        .route("/banners", get(list_banners).merge(user(post(create_banner))))
        .route("/banners/reorder", user(put(reorder_banners)))
        .route(
            "/banners/:id",
            get(get_banner).merge(user(put(update_banner).delete(delete_banner))),
        )
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
}

#[instrument(skip(state))]
pub async fn list_banners(
    State(state): State<AppState>,
    Query(filter): Query<OwnerFilter>,
) -> Result<Json<Vec<BannerResponse>>, AppError> {
    let banners = services::list(&state, filter.user_id).await?;
    Ok(Json(banners.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn get_banner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BannerResponse>, AppError> {
    Ok(Json(services::get(&state, id).await?.into()))
}

/// POST /banners (multipart: title, subtitle?, linkUrl?, userId?, image?)
#[instrument(skip(state, me, mp), fields(user_id = %me.0.id))]
pub async fn create_banner(
    State(state): State<AppState>,
    me: CurrentUser,
    mp: Multipart,
) -> Result<(StatusCode, Json<BannerEnvelope>), AppError> {
    let mut form = FormData::read(mp).await?;
    let input = BannerInput::from_form(&form)?;
    let banner = services::create(&state, &me, input, form.image.take()).await?;
    Ok((
        StatusCode::CREATED,
        Json(BannerEnvelope {
            message: "Banner created".into(),
            banner: banner.into(),
        }),
    ))
}

#[instrument(skip(state, me, mp), fields(user_id = %me.0.id))]
pub async fn update_banner(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<Uuid>,
    mp: Multipart,
) -> Result<Json<BannerEnvelope>, AppError> {
    let mut form = FormData::read(mp).await?;
    let patch = BannerPatch::from_form(&form);
    let banner = services::update(&state, &me, id, patch, form.image.take()).await?;
    Ok(Json(BannerEnvelope {
        message: "Banner updated".into(),
        banner: banner.into(),
    }))
}

#[instrument(skip(state, me), fields(user_id = %me.0.id))]
pub async fn delete_banner(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    services::delete(&state, &me, id).await?;
    Ok(Json(MessageResponse::new("Banner deleted")))
}

#[instrument(skip(state, me, payload), fields(user_id = %me.0.id))]
pub async fn reorder_banners(
    State(state): State<AppState>,
    me: CurrentUser,
    Json(payload): Json<ReorderRequest>,
) -> Result<Json<Vec<BannerResponse>>, AppError> {
    let banners = services::reorder(&state, &me, payload.ids).await?;
    Ok(Json(banners.into_iter().map(Into::into).collect()))
}
