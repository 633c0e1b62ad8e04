//! Episode resolution across the catalogs.
//!
//! A title is mapped to an episode list by running an ordered chain of search
//! strategies, one at a time, stopping at the first one that yields episodes.
//! Catalog failures never escape: they are logged and treated like an empty
//! answer so the chain keeps moving.
use std::sync::Arc;

use serde::Serialize;

use crate::{
    catalog::{
        Catalog, CatalogError,
        normalize::{mature_match, standard_episodes},
    },
    models::{Classification, Episode, MediaTitle, ResolutionOutcome, Title},
    sanitize::sanitize_title,
};

/// Slug suffixes tried against the mature mirror, in order.
pub const MATURE_SUFFIXES: [&str; 3] = ["1", "1-episode-1", "season-1"];

// ── Strategies ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Primary mature catalog.
    MaturePrimary,
    /// Mature mirror with one slug suffix.
    MatureMirror(&'static str),
    /// Mainstream series search followed by its episode list.
    Standard,
}

impl SearchStrategy {
    /// The fixed chain for a classification.
    pub fn plan(classification: Classification) -> Vec<SearchStrategy> {
        match classification {
            Classification::Mature => std::iter::once(SearchStrategy::MaturePrimary)
                .chain(MATURE_SUFFIXES.into_iter().map(SearchStrategy::MatureMirror))
                .collect(),
            Classification::Standard => vec![SearchStrategy::Standard],
        }
    }
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchStrategy::MaturePrimary => write!(f, "mature catalog"),
            SearchStrategy::MatureMirror(suffix) => write!(f, "mature mirror (suffix '{suffix}')"),
            SearchStrategy::Standard => write!(f, "anime catalog"),
        }
    }
}

// ── Resolver ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct EpisodeResolver<C> {
    catalog: Arc<C>,
}

impl<C> Clone for EpisodeResolver<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
        }
    }
}

impl<C: Catalog> EpisodeResolver<C> {
    pub fn new(catalog: Arc<C>) -> Self {
        Self { catalog }
    }

    /// Resolve one title. Stateless: every call runs the chain from the top.
    pub async fn resolve(&self, title: &Title) -> ResolutionOutcome {
        let Some(keyword) = sanitize_title(&title.text, title.classification) else {
            tracing::info!("Nothing searchable in title {:?}", title.text);
            return ResolutionOutcome::NotFound;
        };

        for strategy in SearchStrategy::plan(title.classification) {
            match self.run(strategy, &keyword).await {
                Ok(episodes) if !episodes.is_empty() => {
                    tracing::info!(
                        "{strategy} resolved {:?} to {} episode(s)",
                        title.text,
                        episodes.len()
                    );
                    return ResolutionOutcome::Resolved { episodes };
                }
                Ok(_empty) => {
                    tracing::info!("{strategy} returned no episodes for {:?}", title.text);
                }
                Err(e) => {
                    tracing::warn!("{strategy} failed for {:?}: {e:#}", title.text);
                }
            }
        }

        tracing::info!("No episodes found for {:?} with any search method", title.text);
        ResolutionOutcome::Exhausted
    }

    async fn run(
        &self,
        strategy: SearchStrategy,
        keyword: &str,
    ) -> Result<Vec<Episode>, CatalogError> {
        match strategy {
            SearchStrategy::MaturePrimary => {
                let resp = self.catalog.search_mature(keyword).await?;
                Ok(mature_episodes(strategy, mature_match(resp)))
            }
            SearchStrategy::MatureMirror(suffix) => {
                let resp = self.catalog.search_mature_alt(keyword, suffix).await?;
                Ok(mature_episodes(strategy, mature_match(resp)))
            }
            SearchStrategy::Standard => {
                let Some(series) = self.catalog.search_standard(keyword).await? else {
                    return Ok(vec![]);
                };
                tracing::info!("Anime match found: {} ({})", series.title, series.id);
                // A series match without episodes is not a resolution.
                let raw = self.catalog.list_episodes(&series.id).await?;
                Ok(standard_episodes(raw))
            }
        }
    }

    /// Caller-driven lookup with at most one alternate-title retry.
    ///
    /// Mature titles search the romaji title first and, when that does not
    /// resolve, the English title exactly once. Standard titles search the
    /// English title (romaji when there is none) with no retry.
    pub async fn lookup(&self, title: &MediaTitle, classification: Classification) -> LookupReport {
        let english = title
            .english
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        match classification {
            Classification::Standard => {
                let text = english.unwrap_or(&title.romaji);
                let outcome = self.resolve(&Title::new(text, classification)).await;
                LookupReport {
                    outcome,
                    searched_title: text.to_string(),
                    alternate_tried: false,
                }
            }
            Classification::Mature => {
                let outcome = self.resolve(&Title::new(&title.romaji, classification)).await;
                let alternate = english.filter(|e| *e != title.romaji);
                match alternate {
                    Some(alt) if !outcome.is_resolved() => {
                        tracing::info!("Retrying {:?} with alternate title {alt:?}", title.romaji);
                        let outcome = self.resolve(&Title::new(alt, classification)).await;
                        LookupReport {
                            outcome,
                            searched_title: alt.to_string(),
                            alternate_tried: true,
                        }
                    }
                    _ => LookupReport {
                        outcome,
                        searched_title: title.romaji.clone(),
                        alternate_tried: false,
                    },
                }
            }
        }
    }
}

fn mature_episodes(
    strategy: SearchStrategy,
    hit: Option<crate::catalog::normalize::MatureMatch>,
) -> Vec<Episode> {
    match hit {
        Some(hit) => {
            tracing::debug!("{strategy} matched {:?}", hit.name);
            hit.episodes
        }
        None => vec![],
    }
}

/// Outcome of [`EpisodeResolver::lookup`] plus which title produced it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LookupReport {
    #[serde(flatten)]
    pub outcome: ResolutionOutcome,
    pub searched_title: String,
    pub alternate_tried: bool,
}
