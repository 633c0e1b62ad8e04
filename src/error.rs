use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{metadata::MetadataError, streams::StreamFetchFailed};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    StreamUnavailable(#[from] StreamFetchFailed),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Db(e) => {
                tracing::error!("DB error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database error".to_string(),
                )
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            // Already logged by the stream resolver.
            AppError::StreamUnavailable(_) => (
                StatusCode::BAD_GATEWAY,
                "streaming info not available".to_string(),
            ),
            AppError::Metadata(MetadataError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::Metadata(e) => {
                tracing::warn!("Metadata lookup failed: {e}");
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            AppError::Anyhow(e) => {
                tracing::error!("Unhandled error: {e:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
