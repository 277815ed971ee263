//! Authentication extractor.
//!
//! Add [`AuthContext`] as a handler parameter to require a valid
//! `Authorization: Bearer <token>` header; requests without one are
//! rejected with 401 before the handler runs.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::token;
use crate::config;
use crate::db::{self, sessions};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated request context.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: i64,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let raw_token = header
            .strip_prefix("Bearer ")
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Unauthorized)?;

        let conn = db::try_lock(&state.db)?;

        // Clean up expired sessions occasionally (~10% of requests)
        if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
            match sessions::cleanup_expired_sessions(&conn) {
                Ok(0) => {}
                Ok(n) => tracing::debug!("cleaned up {} expired sessions", n),
                Err(e) => tracing::warn!("session cleanup failed: {}", e),
            }
        }

        let user_id = sessions::get_session_user(&conn, &token::digest(raw_token))?
            .ok_or(ApiError::Unauthorized)?;

        Ok(AuthContext { user_id })
    }
}
