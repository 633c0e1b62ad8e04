use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ── Titles ───────────────────────────────────────────────────────────────────

/// Which fallback chain applies to a title.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Standard,
    Mature,
}

impl Classification {
    pub fn from_genres<S: AsRef<str>>(genres: &[S], mature_genre: &str) -> Self {
        if genres.iter().any(|g| g.as_ref() == mature_genre) {
            Classification::Mature
        } else {
            Classification::Standard
        }
    }
}

/// A title as handed to the resolver. Never mutated by a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    pub text: String,
    pub classification: Classification,
}

impl Title {
    pub fn new(text: impl Into<String>, classification: Classification) -> Self {
        Self {
            text: text.into(),
            classification,
        }
    }
}

/// Title variants supplied by the metadata service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MediaTitle {
    pub romaji: String,
    pub english: Option<String>,
    pub native: Option<String>,
}

// ── Episodes ─────────────────────────────────────────────────────────────────

/// Catalog-independent episode record. Every catalog payload is normalized
/// into this shape; list order is catalog order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Episode {
    pub id: String,
    pub display_title: String,
    pub sequence_number: Option<String>,
    pub native_title: Option<String>,
}

/// Result of resolving one title. `Resolved` always carries at least one episode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Resolved { episodes: Vec<Episode> },
    /// Nothing searchable was supplied; no catalog was queried.
    NotFound,
    /// Every strategy in the chain failed or came back empty.
    Exhausted,
}

impl ResolutionOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionOutcome::Resolved { .. })
    }

    pub fn episodes(&self) -> &[Episode] {
        match self {
            ResolutionOutcome::Resolved { episodes } => episodes,
            _ => &[],
        }
    }
}

// ── Stream variants ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Sub,
    Dub,
}

impl std::fmt::Display for VariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VariantKind::Sub => "sub",
            VariantKind::Dub => "dub",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for VariantKind {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sub" => Ok(VariantKind::Sub),
            "dub" => Ok(VariantKind::Dub),
            other => Err(anyhow::anyhow!("unknown variant kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamSource {
    pub file_url: String,
    pub media_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaptionTrack {
    pub file_url: String,
    pub label: Option<String>,
    pub kind: String,
    pub is_default: bool,
}

/// Intro/outro marker in seconds from the start of the episode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Interval {
    pub start_sec: f64,
    pub end_sec: f64,
}

/// One playable rendition of an episode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamVariant {
    pub kind: VariantKind,
    pub sources: Vec<StreamSource>,
    pub caption_tracks: Vec<CaptionTrack>,
    pub is_encrypted: bool,
    pub intro: Option<Interval>,
    pub outro: Option<Interval>,
    pub provider_server: String,
}

impl StreamVariant {
    /// By convention the first listed source is the one handed to the player.
    pub fn primary_source(&self) -> Option<&StreamSource> {
        self.sources.first()
    }

    pub fn has_caption_track(&self, file_url: &str) -> bool {
        self.caption_tracks.iter().any(|t| t.file_url == file_url)
    }
}

// ── Player surface ───────────────────────────────────────────────────────────

/// What the player surface should bind right now.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerCommand {
    pub source_url: String,
    pub caption_track_url: Option<String>,
}

/// Event broadcast to player surfaces via WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerEvent {
    Loading {
        session_id: Uuid,
        episode_id: String,
    },
    Apply {
        session_id: Uuid,
        episode_id: String,
        source_url: String,
        caption_track_url: Option<String>,
    },
    /// Variants arrived but none is bound yet (e.g. dub-only episode).
    AwaitingSelection {
        session_id: Uuid,
        episode_id: String,
    },
    NoStream {
        session_id: Uuid,
        episode_id: String,
    },
}

// ── Favorites ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Favorite {
    pub id: i64,
    pub title: String,
    pub cover_image: Option<String>,
    pub added_at: String,
}

#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub title: String,
    pub cover_image: Option<String>,
}
