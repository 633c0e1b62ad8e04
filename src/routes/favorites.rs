use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::{
    error::{AppError, Result},
    favorites,
    models::{AddFavoriteRequest, Favorite},
    state::AppState,
};

/// GET /api/favorites
pub async fn list_favorites(State(state): State<AppState>) -> Result<Json<Vec<Favorite>>> {
    Ok(Json(favorites::list(&state.db).await?))
}

#[derive(Debug, Serialize)]
pub struct FavoriteStatus {
    pub id: i64,
    pub is_favorite: bool,
}

/// GET /api/favorites/{id}
pub async fn get_favorite(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FavoriteStatus>> {
    let is_favorite = favorites::is_favorite(&state.db, id).await?;
    Ok(Json(FavoriteStatus { id, is_favorite }))
}

/// PUT /api/favorites/{id}
pub async fn add_favorite(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AddFavoriteRequest>,
) -> Result<Json<Favorite>> {
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".into()));
    }
    let fav = favorites::add(&state.db, id, &req.title, req.cover_image.as_deref()).await?;
    Ok(Json(fav))
}

/// DELETE /api/favorites/{id}
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    if favorites::remove(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
