mod app;
mod auth;
mod banners;
mod config;
mod db;
mod error;
mod extract;
mod faculty;
mod homepage;
mod mail;
mod media;
mod ordering;
mod state;
mod storage;
mod testimonials;
mod users;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "coachsite=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let pool = db::connect(&config.database_url).await?;
    db::migrate(&pool).await;

    let state = AppState::init(config, pool.clone()).await?;
    if let Some(seed) = state.config.admin_seed.clone() {
        if let Err(e) = users::services::seed_admin(&state, &seed).await {
            tracing::warn!(error = %e, "admin seed skipped");
        }
    }

    app::serve(app::build_app(state)).await?;
    pool.close().await;
    Ok(())
}
