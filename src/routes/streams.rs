use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    models::StreamVariant,
    state::AppState,
};

#[derive(Deserialize)]
pub struct StreamsQuery {
    pub episode_id: String,
}

/// GET /api/streams?episode_id=...
pub async fn get_streams(
    State(state): State<AppState>,
    Query(params): Query<StreamsQuery>,
) -> Result<Json<Vec<StreamVariant>>> {
    if params.episode_id.trim().is_empty() {
        return Err(AppError::BadRequest("episode_id is required".into()));
    }
    let variants = state.streams.fetch_variants(&params.episode_id).await?;
    Ok(Json(variants))
}
