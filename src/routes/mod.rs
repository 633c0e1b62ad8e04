pub mod anime;
pub mod favorites;
pub mod playback;
pub mod streams;
pub mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Metadata + episode resolution
        .route("/anime/{id}", get(anime::get_anime))
        .route("/anime/{id}/episodes", get(anime::list_episodes))
        // Stream variants
        .route("/streams", get(streams::get_streams))
        // Playback sessions
        .route("/playback", post(playback::open_session))
        .route(
            "/playback/{id}",
            get(playback::get_session).delete(playback::close_session),
        )
        .route("/playback/{id}/episode", post(playback::load_episode))
        .route("/playback/{id}/variant", post(playback::switch_variant))
        .route("/playback/{id}/captions", post(playback::select_caption_track))
        .route("/playback/{id}/error", post(playback::report_error))
        // Favorites
        .route("/favorites", get(favorites::list_favorites))
        .route(
            "/favorites/{id}",
            get(favorites::get_favorite)
                .put(favorites::add_favorite)
                .delete(favorites::remove_favorite),
        );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        // WebSocket endpoint (outside /api, no CORS needed)
        .route("/ws", get(ws::ws_handler))
        .nest("/api", api);

    // Serve the player front-end for all other paths (SPA fallback)
    if let Some(dir) = state.config.static_dir.as_deref() {
        router = router.fallback_service(
            ServeDir::new(dir).not_found_service(ServeFile::new(format!("{dir}/index.html"))),
        );
    }

    router
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
