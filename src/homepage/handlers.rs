use axum::{
    extract::State,
    routing::{get, put},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{About, HomepageEnvelope, HomepageResponse, HomepageView, UpdateHomepageRequest},
    services,
};
use crate::{
    auth::gate::{guarded, Access, CurrentUser},
    error::AppError,
    extract::{Json, Path},
    state::AppState,
};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/homepage/:user_id", get(get_homepage))
        .route(
            "/homepage",
            guarded(state, Access::Authenticated, put(update_homepage)),
        )
}

#[instrument(skip(state))]
pub async fn get_homepage(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<HomepageView>, AppError> {
    Ok(Json(services::view(&state, user_id).await?))
}

#[instrument(skip(state, me, payload), fields(user_id = %me.0.id))]
pub async fn update_homepage(
    State(state): State<AppState>,
    me: CurrentUser,
    Json(payload): Json<UpdateHomepageRequest>,
) -> Result<Json<HomepageEnvelope>, AppError> {
    let page = services::update(&state, &me, payload).await?;
    Ok(Json(HomepageEnvelope {
        message: "Homepage updated".into(),
        homepage: HomepageResponse {
            user_id: page.owner_id,
            about: About {
                title: page.about_title,
                body: page.about_body,
            },
            achievements: page.achievements,
            updated_at: page.updated_at,
        },
    }))
}
