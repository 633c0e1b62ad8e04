mod catalog;
mod config;
mod db;
mod error;
mod favorites;
mod metadata;
mod models;
mod playback;
mod resolver;
mod routes;
mod sanitize;
mod state;
mod streams;

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hikari=info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .init();

    // ── Config ───────────────────────────────────────────────────────────────
    let config = config::AppConfig::from_env()?;
    info!("Starting hikari, binding to {}", config.bind);
    info!(
        "Catalogs: mature={} mirror={} anime={} stream={}",
        config.mature_catalog_url,
        config.mirror_catalog_url,
        config.anime_catalog_url,
        config.stream_catalog_url
    );

    // ── Database ─────────────────────────────────────────────────────────────
    let db = db::connect(&config).await?;

    // ── Application state ─────────────────────────────────────────────────────
    let bind = config.bind.clone();
    let state = AppState::new(db, config)?;

    // ── HTTP server ───────────────────────────────────────────────────────────
    let router = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Listening on http://{bind}");

    axum::serve(listener, router).await?;

    Ok(())
}
