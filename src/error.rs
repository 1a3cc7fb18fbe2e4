//! Error types for keyword lookups and API responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// The selected LoRA file could not be read
#[derive(Debug, Error)]
pub enum FileError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path:?} resolves outside the LoRA directory")]
    OutsideRoot { path: PathBuf },

    #[error("{path:?} is not a regular file")]
    NotAFile { path: PathBuf },
}

/// Registry lookup failures
#[derive(Debug, Error)]
pub enum LookupError {
    /// The registry has no model version for this hash
    #[error("Registry has no entry for this hash")]
    NotFound,

    /// Transport failure or a non-success status other than 404
    #[error("Registry unreachable: {0}")]
    Unreachable(String),

    /// 200 response whose body is not the expected JSON shape
    #[error("Malformed registry response: {0}")]
    Malformed(String),
}

/// Cache record failures. Never fatal to a lookup.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed cache record {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            timestamp: chrono::Utc::now(),
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    timestamp: chrono::DateTime<chrono::Utc>,
}
