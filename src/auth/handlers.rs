//! Authentication handlers for register, login and logout.

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{password, token};
use crate::config;
use crate::db::{self, sessions, users};
use crate::domain::User;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    validate_name(&body.name)?;
    validate_email(&body.email)?;
    validate_password(&body.password)?;

    // Argon2 hashing is deliberately slow; do it before taking the db lock
    let password_hash = password::hash_password(&body.password)
        .map_err(|e| ApiError::Config(format!("password hashing failed: {e}")))?;

    let conn = db::try_lock(&state.db)?;

    if users::email_exists(&conn, &body.email)? {
        return Err(ApiError::Conflict("An account with that email already exists".into()));
    }

    let user_id = users::create_user(
        &conn,
        body.name.trim(),
        &body.email,
        &password_hash,
        config::FREE_PLAN_GENERATIONS,
        config::FREE_PLAN_COLLECTIONS,
    )?;

    let raw_token = token::generate_token();
    sessions::create_session(
        &conn,
        user_id,
        &token::digest(&raw_token),
        config::SESSION_DURATION_HOURS,
    )?;

    let user = users::get_user(&conn, user_id)?.ok_or(ApiError::NotFound("User"))?;
    tracing::info!("registered user {}", user_id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user,
            token: raw_token,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let conn = db::try_lock(&state.db)?;

    let (user_id, stored_hash) = users::get_credentials_by_email(&conn, &body.email)?
        .ok_or(ApiError::InvalidCredentials)?;

    if !password::verify_password(&body.password, &stored_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let raw_token = token::generate_token();
    sessions::create_session(
        &conn,
        user_id,
        &token::digest(&raw_token),
        config::SESSION_DURATION_HOURS,
    )?;

    let user = users::get_user(&conn, user_id)?.ok_or(ApiError::NotFound("User"))?;

    Ok(Json(AuthResponse {
        user,
        token: raw_token,
    }))
}

/// POST /api/auth/logout - revoke the presented token
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    if let Some(raw_token) = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
    {
        let conn = db::try_lock(&state.db)?;
        sessions::delete_session(&conn, &token::digest(raw_token))?;
    }
    Ok(Json(serde_json::json!({ "message": "Logged out" })))
}

pub(crate) fn validate_name(name: &str) -> ApiResult<()> {
    if name.trim().chars().count() < 2 {
        return Err(ApiError::validation("Name must be at least 2 characters"));
    }
    Ok(())
}

pub(crate) fn validate_email(email: &str) -> ApiResult<()> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ApiError::validation("Invalid email address"))
    }
}

pub(crate) fn validate_password(password: &str) -> ApiResult<()> {
    if password.chars().count() < 6 {
        return Err(ApiError::validation("Password must be at least 6 characters"));
    }
    Ok(())
}

/// Minimal structural check: one '@' with a dotted domain after it
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.contains(' ')
        && !domain.contains('@')
}
