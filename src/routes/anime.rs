use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::{
    error::Result,
    favorites,
    metadata::AnimeDetails,
    models::Classification,
    resolver::LookupReport,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct AnimeView {
    #[serde(flatten)]
    pub details: AnimeDetails,
    pub display_title: String,
    pub description_text: Option<String>,
    pub cover_url: Option<String>,
    pub studio_names: String,
    pub classification: Classification,
    pub is_favorite: bool,
}

/// GET /api/anime/{id}
pub async fn get_anime(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AnimeView>> {
    let details = state.metadata.media(id).await?;
    let is_favorite = favorites::is_favorite(&state.db, id).await?;

    Ok(Json(AnimeView {
        display_title: details.display_title().to_string(),
        description_text: details.plain_description(),
        cover_url: details.cover_url().map(str::to_string),
        studio_names: details.studio_names(),
        classification: details.classification(&state.config.mature_genre),
        is_favorite,
        details,
    }))
}

#[derive(Debug, Serialize)]
pub struct EpisodesView {
    pub anime_id: i64,
    pub classification: Classification,
    #[serde(flatten)]
    pub report: LookupReport,
}

/// GET /api/anime/{id}/episodes
/// "No episodes" is a normal 200 answer with `outcome: exhausted | not_found`.
pub async fn list_episodes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EpisodesView>> {
    let details = state.metadata.media(id).await?;
    let classification = details.classification(&state.config.mature_genre);

    let report = state.resolver.lookup(&details.title, classification).await;
    tracing::debug!(
        "Anime {id}: {} episode(s) via {:?}",
        report.outcome.episodes().len(),
        report.searched_title
    );

    Ok(Json(EpisodesView {
        anime_id: id,
        classification,
        report,
    }))
}
