use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::VariantKind,
    playback::SessionSnapshot,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct LoadEpisodeRequest {
    pub episode_id: String,
}

impl LoadEpisodeRequest {
    fn episode_id(&self) -> Result<&str> {
        let id = self.episode_id.trim();
        if id.is_empty() {
            return Err(AppError::BadRequest("episode_id is required".into()));
        }
        Ok(id)
    }
}

/// POST /api/playback: open a session and start loading its first episode
pub async fn open_session(
    State(state): State<AppState>,
    Json(req): Json<LoadEpisodeRequest>,
) -> Result<(StatusCode, Json<SessionSnapshot>)> {
    let (id, _load) = state.playback.open(req.episode_id()?).await;
    let snapshot = state.playback.snapshot(id).await.ok_or(AppError::NotFound)?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /api/playback/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>> {
    state
        .playback
        .snapshot(id)
        .await
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// DELETE /api/playback/{id}
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if state.playback.close(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

/// POST /api/playback/{id}/episode: switch to another episode
pub async fn load_episode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<LoadEpisodeRequest>,
) -> Result<(StatusCode, Json<SessionSnapshot>)> {
    state
        .playback
        .load_episode(id, req.episode_id()?)
        .await
        .ok_or(AppError::NotFound)?;
    let snapshot = state.playback.snapshot(id).await.ok_or(AppError::NotFound)?;
    Ok((StatusCode::ACCEPTED, Json(snapshot)))
}

#[derive(Debug, Deserialize)]
pub struct SwitchVariantRequest {
    pub kind: VariantKind,
}

/// POST /api/playback/{id}/variant
pub async fn switch_variant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SwitchVariantRequest>,
) -> Result<Json<SessionSnapshot>> {
    state
        .playback
        .switch_variant(id, req.kind)
        .await
        .map(Json)
        .ok_or(AppError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct SelectCaptionRequest {
    #[serde(default)]
    pub file_url: Option<String>,
}

/// POST /api/playback/{id}/captions: `file_url: null` turns captions off
pub async fn select_caption_track(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectCaptionRequest>,
) -> Result<Json<SessionSnapshot>> {
    state
        .playback
        .select_caption_track(id, req.file_url.as_deref())
        .await
        .map(Json)
        .ok_or(AppError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct PlayerErrorReport {
    pub message: String,
}

/// POST /api/playback/{id}/error: playback failure reported by the player surface
pub async fn report_error(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(report): Json<PlayerErrorReport>,
) -> Result<StatusCode> {
    let snapshot = state.playback.snapshot(id).await.ok_or(AppError::NotFound)?;
    tracing::warn!(
        "Player error in session {id} (episode {:?}): {}",
        snapshot.episode_id,
        report.message
    );
    Ok(StatusCode::NO_CONTENT)
}
