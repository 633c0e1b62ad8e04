//! Raw payloads as the catalogs send them.
use serde::{Deserialize, Deserializer};

// Catalogs disagree on whether ids and episode numbers are strings or numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum Flexible {
    Text(String),
    Number(serde_json::Number),
}

impl From<Flexible> for String {
    fn from(value: Flexible) -> Self {
        match value {
            Flexible::Text(s) => s,
            Flexible::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Flexible::deserialize(d).map(String::from)
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Flexible>::deserialize(d)?.map(String::from))
}

// ── Mature catalogs (primary + mirror) ───────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Default)]
pub struct HentaiResponse {
    #[serde(default)]
    pub results: Vec<HentaiResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HentaiResult {
    pub name: String,
    #[serde(default)]
    pub episodes: Vec<HentaiEpisode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HentaiEpisode {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
}

// ── Mainstream catalog ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SeriesSearchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub result: Option<SeriesMatch>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeriesMatch {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpisodeListResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub results: Vec<StandardEpisode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandardEpisode {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub episode_no: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub number: Option<String>,
    #[serde(default)]
    pub japanese_title: Option<String>,
}

// ── Stream-source catalog ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct StreamResponse {
    #[serde(default)]
    pub success: bool,
    pub results: Option<StreamResults>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamResults {
    #[serde(rename = "streamingInfo", default, deserialize_with = "settled_entries")]
    pub streaming_info: Vec<StreamingInfoEntry>,
}

// A malformed entry is dropped on its own; its neighbours still count.
fn settled_entries<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<StreamingInfoEntry>, D::Error> {
    let raw = Vec::<serde_json::Value>::deserialize(d)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("Skipping malformed stream entry: {e}");
                None
            }
        })
        .collect())
}

/// One settled server lookup; only `fulfilled` entries carry a value.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamingInfoEntry {
    pub status: String,
    #[serde(default)]
    pub value: Option<StreamingInfoValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamingInfoValue {
    #[serde(rename = "decryptionResult", default)]
    pub decryption_result: Option<DecryptionResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecryptionResult {
    #[serde(rename = "type")]
    pub kind: String,
    pub source: DecryptedSource,
    #[serde(default)]
    pub server: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DecryptedSource {
    #[serde(default)]
    pub sources: Vec<RawSource>,
    #[serde(default)]
    pub tracks: Vec<RawTrack>,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default)]
    pub intro: Option<RawInterval>,
    #[serde(default)]
    pub outro: Option<RawInterval>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSource {
    pub file: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTrack {
    pub file: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawInterval {
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
}
