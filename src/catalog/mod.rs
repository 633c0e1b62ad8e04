//! Adapters for the external catalogs.
//!
//! Each catalog answers the same question ("which episodes does this title
//! have?") with a differently shaped payload. The [`Catalog`] trait exposes the
//! raw payloads; [`normalize`] maps each one into the canonical
//! [`Episode`](crate::models::Episode) / [`StreamVariant`](crate::models::StreamVariant)
//! shapes.

pub mod http;
pub mod normalize;
pub mod wire;

use std::future::Future;

use thiserror::Error;

pub use self::http::HttpCatalog;
use self::wire::{HentaiResponse, SeriesMatch, StandardEpisode, StreamingInfoEntry};

/// Transport or payload failure from any catalog call.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{0} reported success=false")]
    Rejected(&'static str),
}

/// The five logical catalog endpoints.
pub trait Catalog: Send + Sync {
    /// Search the primary mature catalog.
    fn search_mature(
        &self,
        keyword: &str,
    ) -> impl Future<Output = Result<HentaiResponse, CatalogError>> + Send;

    /// Search the mature mirror with a slug disambiguation suffix.
    fn search_mature_alt(
        &self,
        keyword: &str,
        suffix: &str,
    ) -> impl Future<Output = Result<HentaiResponse, CatalogError>> + Send;

    /// Look up a series in the mainstream catalog. `None` means no match.
    fn search_standard(
        &self,
        keyword: &str,
    ) -> impl Future<Output = Result<Option<SeriesMatch>, CatalogError>> + Send;

    /// Full episode list for a mainstream series.
    fn list_episodes(
        &self,
        series_id: &str,
    ) -> impl Future<Output = Result<Vec<StandardEpisode>, CatalogError>> + Send;

    /// Settled stream lookups for one episode.
    fn fetch_stream_variants(
        &self,
        episode_id: &str,
    ) -> impl Future<Output = Result<Vec<StreamingInfoEntry>, CatalogError>> + Send;
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted in-memory catalog that records every call.
    //!
    //! Replies are `Err(status)` for a simulated HTTP failure. Scripts are not
    //! consumed, so repeated calls see the same catalog state.
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::wire::*;
    use super::*;

    type Reply<T> = Result<T, u16>;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Mature(String),
        MatureAlt(String, String),
        Standard(String),
        Episodes(String),
        Streams(String),
    }

    pub fn hentai(name: &str, episode_ids: &[u64]) -> HentaiResponse {
        HentaiResponse {
            results: vec![HentaiResult {
                name: name.to_string(),
                episodes: episode_ids
                    .iter()
                    .map(|id| HentaiEpisode {
                        id: id.to_string(),
                        name: format!("{name} {id}"),
                    })
                    .collect(),
            }],
        }
    }

    pub fn series(id: &str, title: &str) -> SeriesMatch {
        SeriesMatch {
            id: id.to_string(),
            title: title.to_string(),
        }
    }

    pub fn standard_episode(id: &str, number: &str) -> StandardEpisode {
        StandardEpisode {
            id: id.to_string(),
            title: format!("Episode {number}"),
            episode_no: Some(number.to_string()),
            number: None,
            japanese_title: None,
        }
    }

    pub fn variant_entry(kind: &str, file: &str, tracks: &[&str]) -> StreamingInfoEntry {
        StreamingInfoEntry {
            status: "fulfilled".to_string(),
            value: Some(StreamingInfoValue {
                decryption_result: Some(DecryptionResult {
                    kind: kind.to_string(),
                    source: DecryptedSource {
                        sources: vec![RawSource {
                            file: file.to_string(),
                            kind: "hls".to_string(),
                        }],
                        tracks: tracks
                            .iter()
                            .map(|t| RawTrack {
                                file: t.to_string(),
                                label: Some("English".to_string()),
                                kind: "captions".to_string(),
                                default: false,
                            })
                            .collect(),
                        ..Default::default()
                    },
                    server: "hd-1".to_string(),
                }),
            }),
        }
    }

    fn reply<T: Clone>(r: &Reply<T>) -> Result<T, CatalogError> {
        r.clone().map_err(|status| CatalogError::Status {
            status,
            message: "scripted failure".to_string(),
        })
    }

    // Unscripted endpoints behave like an empty catalog.
    pub struct FakeCatalog {
        calls: Mutex<Vec<Call>>,
        mature: Reply<HentaiResponse>,
        mirror: HashMap<String, Reply<HentaiResponse>>,
        standard: Reply<Option<SeriesMatch>>,
        episodes: Reply<Vec<StandardEpisode>>,
        streams: HashMap<String, (Duration, Reply<Vec<StreamingInfoEntry>>)>,
    }

    impl Default for FakeCatalog {
        fn default() -> Self {
            Self {
                calls: Mutex::default(),
                mature: Ok(HentaiResponse::default()),
                mirror: HashMap::new(),
                standard: Ok(None),
                episodes: Ok(vec![]),
                streams: HashMap::new(),
            }
        }
    }

    impl FakeCatalog {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_mature(mut self, r: Reply<HentaiResponse>) -> Self {
            self.mature = r;
            self
        }

        pub fn with_mirror(mut self, suffix: &str, r: Reply<HentaiResponse>) -> Self {
            self.mirror.insert(suffix.to_string(), r);
            self
        }

        pub fn with_standard(mut self, r: Reply<Option<SeriesMatch>>) -> Self {
            self.standard = r;
            self
        }

        pub fn with_episodes(mut self, r: Reply<Vec<StandardEpisode>>) -> Self {
            self.episodes = r;
            self
        }

        /// Script the stream lookup for `episode_id`, answered after `delay`.
        pub fn with_streams(
            mut self,
            episode_id: &str,
            delay: Duration,
            r: Reply<Vec<StreamingInfoEntry>>,
        ) -> Self {
            self.streams.insert(episode_id.to_string(), (delay, r));
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl Catalog for FakeCatalog {
        async fn search_mature(&self, keyword: &str) -> Result<HentaiResponse, CatalogError> {
            self.record(Call::Mature(keyword.to_string()));
            reply(&self.mature)
        }

        async fn search_mature_alt(
            &self,
            keyword: &str,
            suffix: &str,
        ) -> Result<HentaiResponse, CatalogError> {
            self.record(Call::MatureAlt(keyword.to_string(), suffix.to_string()));
            self.mirror
                .get(suffix)
                .map(reply)
                .unwrap_or_else(|| Ok(HentaiResponse::default()))
        }

        async fn search_standard(&self, keyword: &str) -> Result<Option<SeriesMatch>, CatalogError> {
            self.record(Call::Standard(keyword.to_string()));
            reply(&self.standard)
        }

        async fn list_episodes(&self, series_id: &str) -> Result<Vec<StandardEpisode>, CatalogError> {
            self.record(Call::Episodes(series_id.to_string()));
            reply(&self.episodes)
        }

        async fn fetch_stream_variants(
            &self,
            episode_id: &str,
        ) -> Result<Vec<StreamingInfoEntry>, CatalogError> {
            self.record(Call::Streams(episode_id.to_string()));
            match self.streams.get(episode_id) {
                Some((delay, r)) => {
                    tokio::time::sleep(*delay).await;
                    reply(r)
                }
                None => Ok(vec![]),
            }
        }
    }
}
