//! Current-user profile handlers.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::auth::handlers::{validate_email, validate_name, validate_password};
use crate::auth::{password, AuthContext};
use crate::db::{self, users};
use crate::domain::{Plan, User};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub photo: Option<String>,
    pub plan: Option<Plan>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLimitsRequest {
    pub generations_left: Option<i64>,
    pub collections_left: Option<i64>,
}

/// GET /api/users/me
pub async fn current_user(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<User>> {
    let conn = db::try_lock(&state.db)?;
    let user = users::get_user(&conn, auth.user_id)?.ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user))
}

/// PUT /api/users/me - partial profile update
pub async fn update_current_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(body): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    if let Some(name) = &body.name {
        validate_name(name)?;
    }
    if let Some(email) = &body.email {
        validate_email(email)?;
    }
    if let Some(pw) = &body.password {
        validate_password(pw)?;
    }

    // Hash before taking the db lock
    let password_hash = match &body.password {
        Some(pw) => Some(
            password::hash_password(pw)
                .map_err(|e| ApiError::Config(format!("password hashing failed: {e}")))?,
        ),
        None => None,
    };

    let conn = db::try_lock(&state.db)?;
    let current = users::get_user(&conn, auth.user_id)?.ok_or(ApiError::NotFound("User"))?;

    if let Some(email) = &body.email {
        let changed = !email.eq_ignore_ascii_case(&current.email);
        if changed && users::email_exists(&conn, email)? {
            return Err(ApiError::Conflict("An account with that email already exists".into()));
        }
    }

    let update = users::UserUpdate {
        name: body.name.map(|n| n.trim().to_string()),
        email: body.email,
        password_hash,
        photo: body.photo,
        plan: body.plan,
    };
    users::update_user(&conn, auth.user_id, &update)?;

    let user = users::get_user(&conn, auth.user_id)?.ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user))
}

/// PATCH /api/users/me/limits - overwrite usage quotas (internal use)
pub async fn update_limits(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(body): Json<UpdateLimitsRequest>,
) -> ApiResult<Json<User>> {
    let conn = db::try_lock(&state.db)?;
    users::update_limits(&conn, auth.user_id, body.generations_left, body.collections_left)?;
    let user = users::get_user(&conn, auth.user_id)?.ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user))
}
