//! Service-wide error type mapped onto HTTP responses.
//!
//! The scheduler core has no error cases of its own; everything here
//! belongs to the surrounding service: input validation, auth, ownership,
//! storage and the two upstream services.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("database unavailable")]
    DbLock(#[from] crate::db::DbLockError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("upstream service error: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("{0}")]
    UpstreamStatus(String),

    #[error("failed to parse AI response: {0}")]
    AiResponse(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) | Self::UpstreamStatus(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::DbLock(_) | Self::Config(_) | Self::AiResponse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details go to the log, not to the client
        let message = match &self {
            Self::Database(e) => {
                tracing::error!("database error: {}", e);
                "Internal server error".to_string()
            }
            Self::DbLock(_) => {
                tracing::error!("database lock poisoned");
                "Internal server error".to_string()
            }
            Self::Config(e) => {
                tracing::error!("configuration error: {}", e);
                "Service not configured".to_string()
            }
            Self::Upstream(e) => {
                tracing::warn!("upstream request failed: {}", e);
                "Upstream service request failed".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
