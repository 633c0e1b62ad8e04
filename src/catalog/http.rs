use serde::de::DeserializeOwned;

use crate::config::AppConfig;

use super::wire::{
    EpisodeListResponse, HentaiResponse, SeriesMatch, SeriesSearchResponse, StandardEpisode,
    StreamResponse, StreamingInfoEntry,
};
use super::{Catalog, CatalogError};

/// reqwest-backed client for all five catalog endpoints.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    http: reqwest::Client,
    mature_url: String,
    mirror_url: String,
    anime_url: String,
    stream_url: String,
}

impl HttpCatalog {
    pub fn new(http: reqwest::Client, config: &AppConfig) -> Self {
        let base = |u: &str| u.trim_end_matches('/').to_string();
        Self {
            http,
            mature_url: base(&config.mature_catalog_url),
            mirror_url: base(&config.mirror_catalog_url),
            anime_url: base(&config.anime_catalog_url),
            stream_url: base(&config.stream_catalog_url),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, CatalogError> {
        tracing::debug!(operation, "catalog request");

        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(operation, status = status_code, "catalog API error");
            return Err(CatalogError::Status {
                status: status_code,
                message: body.chars().take(240).collect(),
            });
        }

        resp.json::<T>()
            .await
            .map_err(|e| CatalogError::Parse(format!("{operation}: {e}")))
    }
}

// Keywords arrive percent-encoded from the sanitizer and go into the URL verbatim.
impl Catalog for HttpCatalog {
    async fn search_mature(&self, keyword: &str) -> Result<HentaiResponse, CatalogError> {
        let url = format!("{}/search/{keyword}", self.mature_url);
        self.get_json("search_mature", self.http.get(url)).await
    }

    async fn search_mature_alt(
        &self,
        keyword: &str,
        suffix: &str,
    ) -> Result<HentaiResponse, CatalogError> {
        let url = format!("{}/search/{keyword}/{suffix}", self.mirror_url);
        self.get_json("search_mature_alt", self.http.get(url)).await
    }

    async fn search_standard(&self, keyword: &str) -> Result<Option<SeriesMatch>, CatalogError> {
        let url = format!("{}/search?keyword={keyword}", self.anime_url);
        let resp: SeriesSearchResponse = self.get_json("search_standard", self.http.get(url)).await?;
        if !resp.success {
            return Err(CatalogError::Rejected("search_standard"));
        }
        Ok(resp.result)
    }

    async fn list_episodes(&self, series_id: &str) -> Result<Vec<StandardEpisode>, CatalogError> {
        let request = self
            .http
            .get(format!("{}/episodes", self.anime_url))
            .query(&[("id", series_id)]);
        let resp: EpisodeListResponse = self.get_json("list_episodes", request).await?;
        if !resp.success {
            return Err(CatalogError::Rejected("list_episodes"));
        }
        Ok(resp.results)
    }

    async fn fetch_stream_variants(
        &self,
        episode_id: &str,
    ) -> Result<Vec<StreamingInfoEntry>, CatalogError> {
        let request = self.http.get(&self.stream_url).query(&[("id", episode_id)]);
        let resp: StreamResponse = self.get_json("fetch_stream_variants", request).await?;
        if !resp.success {
            return Err(CatalogError::Rejected("fetch_stream_variants"));
        }
        Ok(resp.results.map(|r| r.streaming_info).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json, Router,
        extract::{Query, RawQuery, State},
        http::{StatusCode, Uri},
        routing::get,
    };
    use serde_json::json;

    use super::*;

    type Seen = Arc<Mutex<Vec<String>>>;

    async fn record(State(seen): State<Seen>, uri: Uri) -> Json<serde_json::Value> {
        seen.lock().unwrap().push(uri.to_string());
        Json(json!({ "results": [{ "name": "Hit", "episodes": [{ "id": 5, "name": "One" }] }] }))
    }

    async fn spawn_upstream() -> (String, Seen) {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route("/hentai/search/{keyword}", get(record))
            .route("/hentai-stream/search/{keyword}/{suffix}", get(record))
            .route(
                "/anime/search",
                get(|RawQuery(q): RawQuery| async move {
                    if q.as_deref() == Some("keyword=Nothing") {
                        return Json(json!({ "success": false }));
                    }
                    Json(json!({
                        "success": true,
                        "result": { "id": "aot-112", "title": "Attack on Titan", "link": "/aot-112" }
                    }))
                }),
            )
            .route(
                "/anime/episodes",
                get(|Query(q): Query<std::collections::HashMap<String, String>>| async move {
                    Json(json!({
                        "success": true,
                        "results": [{ "id": format!("{}?ep=1", q["id"]), "title": "To You", "episode_no": 1 }]
                    }))
                }),
            )
            .route("/stream", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
            .with_state(Arc::clone(&seen));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), seen)
    }

    fn client(base: &str) -> HttpCatalog {
        let config = AppConfig::for_upstream(base);
        HttpCatalog::new(config.http_client().unwrap(), &config)
    }

    #[tokio::test]
    async fn encoded_keywords_are_sent_verbatim() {
        let (base, seen) = spawn_upstream().await;
        let catalog = client(&base);

        let resp = catalog.search_mature("Kimi%20no%20Na").await.unwrap();
        assert_eq!(resp.results[0].episodes[0].id, "5");
        catalog
            .search_mature_alt("Kimi%20no%20Na", "1-episode-1")
            .await
            .unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            [
                "/hentai/search/Kimi%20no%20Na",
                "/hentai-stream/search/Kimi%20no%20Na/1-episode-1"
            ]
        );
    }

    #[tokio::test]
    async fn standard_search_and_episode_list() {
        let (base, _) = spawn_upstream().await;
        let catalog = client(&base);

        let hit = catalog
            .search_standard("Attack%20on%20Titan:%20Final")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, "aot-112");

        let episodes = catalog.list_episodes(&hit.id).await.unwrap();
        assert_eq!(episodes[0].id, "aot-112?ep=1");
        assert_eq!(episodes[0].episode_no.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn unsuccessful_payload_is_rejected() {
        let (base, _) = spawn_upstream().await;
        let err = client(&base).search_standard("Nothing").await.unwrap_err();
        assert!(matches!(err, CatalogError::Rejected("search_standard")));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let (base, _) = spawn_upstream().await;
        let err = client(&base).fetch_stream_variants("ep-1").await.unwrap_err();
        assert!(
            matches!(err, CatalogError::Status { status: 503, .. }),
            "unexpected error: {err}"
        );
    }
}
