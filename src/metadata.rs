//! AniList GraphQL client for title metadata.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Classification, MediaTitle};

const MEDIA_DETAILS_QUERY: &str = r#"
query ($id: Int) {
    Media(id: $id, type: ANIME) {
        id
        title { romaji english native }
        coverImage { large }
        bannerImage
        description
        genres
        averageScore
        popularity
        episodes
        season
        seasonYear
        status
        studios { nodes { name } }
    }
}
"#;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("no media with id {0}")]
    NotFound(i64),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Display and classification data for one title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimeDetails {
    pub id: i64,
    pub title: MediaTitle,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub cover_image: Option<CoverImage>,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub average_score: Option<u32>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub season_year: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub studios: Studios,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverImage {
    pub large: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Studios {
    #[serde(default)]
    pub nodes: Vec<Studio>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Studio {
    pub name: String,
}

impl AnimeDetails {
    pub fn classification(&self, mature_genre: &str) -> Classification {
        Classification::from_genres(&self.genres, mature_genre)
    }

    /// English title when there is one, romaji otherwise.
    pub fn display_title(&self) -> &str {
        self.title
            .english
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.title.romaji)
    }

    pub fn plain_description(&self) -> Option<String> {
        static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
        self.description
            .as_deref()
            .map(|d| RE_TAGS.replace_all(d, "").trim().to_string())
            .filter(|d| !d.is_empty())
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.cover_image.as_ref()?.large.as_deref()
    }

    pub fn studio_names(&self) -> String {
        self.studios
            .nodes
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<MediaData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct MediaData {
    #[serde(rename = "Media")]
    media: Option<AnimeDetails>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Clone)]
pub struct AniListClient {
    http: reqwest::Client,
    endpoint: String,
}

impl AniListClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub async fn media(&self, id: i64) -> Result<AnimeDetails, MetadataError> {
        tracing::debug!(id, "AniList media request");

        let resp = self
            .http
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(&serde_json::json!({
                "query": MEDIA_DETAILS_QUERY,
                "variables": { "id": id },
            }))
            .send()
            .await?;

        let status = resp.status();
        // AniList answers unknown ids with 404 plus a GraphQL error body.
        if status.as_u16() == 404 {
            return Err(MetadataError::NotFound(id));
        }
        if !status.is_success() {
            let status_code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(id, status = status_code, "AniList API error");
            return Err(MetadataError::Api {
                status: status_code,
                message: body,
            });
        }

        let parsed: GraphQlResponse = resp
            .json()
            .await
            .map_err(|e| MetadataError::Parse(e.to_string()))?;

        if !parsed.errors.is_empty() {
            let msg = parsed
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(MetadataError::GraphQl(msg));
        }

        parsed
            .data
            .and_then(|d| d.media)
            .ok_or(MetadataError::NotFound(id))
    }
}
