use std::{sync::Arc, time::Duration};
use tokio::sync::broadcast;

use crate::{
    catalog::HttpCatalog,
    config::AppConfig,
    db::Db,
    metadata::AniListClient,
    models::PlayerEvent,
    playback::PlaybackRegistry,
    resolver::EpisodeResolver,
    streams::StreamResolver,
};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared application state injected into every Axum handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Arc<AppConfig>,
    pub metadata: AniListClient,
    pub resolver: EpisodeResolver<HttpCatalog>,
    pub streams: StreamResolver<HttpCatalog>,
    pub playback: PlaybackRegistry<HttpCatalog>,
    /// Broadcast channel feeding player surfaces over WebSocket.
    pub events: broadcast::Sender<PlayerEvent>,
}

impl AppState {
    pub fn new(db: Db, config: AppConfig) -> anyhow::Result<Self> {
        let http = config.http_client()?;
        let catalog = Arc::new(HttpCatalog::new(http.clone(), &config));
        let streams = StreamResolver::new(Arc::clone(&catalog));
        let (events, _) = broadcast::channel::<PlayerEvent>(256);
        let playback = PlaybackRegistry::new(streams.clone(), events.clone());

        // Viewers that vanish without DELETE-ing their session are swept here.
        playback.spawn_idle_sweep(
            SESSION_SWEEP_INTERVAL,
            Duration::from_secs(config.session_idle_secs),
        );

        Ok(Self {
            db,
            metadata: AniListClient::new(http, config.metadata_url.clone()),
            resolver: EpisodeResolver::new(catalog),
            playback,
            streams,
            events,
            config: Arc::new(config),
        })
    }
}
