use anyhow::Context;
use serde::Deserialize;

/// Application configuration, loaded from environment variables / .env file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bind address for the HTTP server.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Path to the SQLite database file holding favorites.
    #[serde(default = "default_db_url")]
    pub database_url: String,

    /// AniList-compatible GraphQL endpoint used for title metadata.
    #[serde(default = "default_metadata_url")]
    pub metadata_url: String,

    /// Primary catalog for mature titles.
    #[serde(default = "default_mature_catalog_url")]
    pub mature_catalog_url: String,

    /// Mirror of the mature catalog, queried with slug suffixes.
    #[serde(default = "default_mirror_catalog_url")]
    pub mirror_catalog_url: String,

    /// Mainstream anime catalog (series search + episode lists).
    #[serde(default = "default_anime_catalog_url")]
    pub anime_catalog_url: String,

    /// Stream-source catalog returning sub/dub variants per episode.
    #[serde(default = "default_stream_catalog_url")]
    pub stream_catalog_url: String,

    /// Transport timeout applied to every outgoing request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Playback sessions untouched for this long are dropped.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,

    /// Genre tag that marks a title as mature.
    #[serde(default = "default_mature_genre")]
    pub mature_genre: String,

    /// Optional HTTP proxy for all catalog and metadata traffic.
    #[serde(default)]
    pub proxy: Option<String>,

    /// Directory with a compiled player front-end, served as an SPA fallback.
    #[serde(default)]
    pub static_dir: Option<String>,
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}
fn default_db_url() -> String {
    "/data/hikari.db".to_string()
}
fn default_metadata_url() -> String {
    "https://graphql.anilist.co".to_string()
}
fn default_mature_catalog_url() -> String {
    "http://localhost:4000/api/hentai".to_string()
}
fn default_mirror_catalog_url() -> String {
    "http://localhost:4000/api/hentai-stream".to_string()
}
fn default_anime_catalog_url() -> String {
    "http://localhost:4000/api/anime".to_string()
}
fn default_stream_catalog_url() -> String {
    "http://localhost:4000/api/stream".to_string()
}
fn default_request_timeout_secs() -> u64 {
    20
}
fn default_session_idle_secs() -> u64 {
    1800
}
fn default_mature_genre() -> String {
    "Hentai".to_string()
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env if present (ignore errors, it may not exist)
        let _ = dotenvy::dotenv();

        envy::from_env::<AppConfig>().context("Failed to load config from environment")
    }

    /// Build the shared HTTP client used by every outbound adapter.
    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.request_timeout_secs))
            .user_agent(concat!("hikari/", env!("CARGO_PKG_VERSION")));

        if let Some(p) = self.proxy.as_deref() {
            if !p.is_empty() {
                builder = builder.proxy(reqwest::Proxy::all(p).context("invalid PROXY")?);
            }
        }

        builder.build().context("build HTTP client")
    }
}

#[cfg(test)]
impl AppConfig {
    /// Configuration pointing every upstream at `base`, for tests.
    pub fn for_upstream(base: &str) -> Self {
        Self {
            bind: "127.0.0.1:0".to_string(),
            database_url: ":memory:".to_string(),
            metadata_url: format!("{base}/graphql"),
            mature_catalog_url: format!("{base}/hentai"),
            mirror_catalog_url: format!("{base}/hentai-stream"),
            anime_catalog_url: format!("{base}/anime"),
            stream_catalog_url: format!("{base}/stream"),
            request_timeout_secs: 5,
            session_idle_secs: default_session_idle_secs(),
            mature_genre: default_mature_genre(),
            proxy: None,
            static_dir: None,
        }
    }
}
