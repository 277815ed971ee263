//! Collection CRUD handlers with free-plan quota enforcement.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthContext;
use crate::config;
use crate::db::{self, cards, collections, users};
use crate::domain::{CollectionWithCards, User};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCollectionRequest {
    pub name: Option<String>,
    pub progress: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct DeleteCollectionResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// GET /api/collections - all of the user's collections with their cards
pub async fn list_collections(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<CollectionWithCards>>> {
    let conn = db::try_lock(&state.db)?;
    let mut result = Vec::new();
    for collection in collections::list_collections(&conn, auth.user_id)? {
        let cards = cards::list_cards(&conn, collection.id)?;
        result.push(CollectionWithCards::new(collection, cards));
    }
    Ok(Json(result))
}

/// GET /api/collections/{id}
pub async fn get_collection(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<CollectionWithCards>> {
    let conn = db::try_lock(&state.db)?;
    let collection = collections::get_collection(&conn, id, auth.user_id)?
        .ok_or(ApiError::NotFound("Collection"))?;
    let cards = cards::list_cards(&conn, collection.id)?;
    Ok(Json(CollectionWithCards::new(collection, cards)))
}

/// POST /api/collections
pub async fn create_collection(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(body): Json<CreateCollectionRequest>,
) -> ApiResult<(StatusCode, Json<CollectionWithCards>)> {
    if body.name.trim().is_empty() {
        return Err(ApiError::validation("Collection name is required"));
    }

    let conn = db::try_lock(&state.db)?;
    let user = users::get_user(&conn, auth.user_id)?.ok_or(ApiError::NotFound("User"))?;

    if user.plan.is_free() && user.collections_left <= 0 {
        return Err(ApiError::forbidden(
            "Collection limit reached. Please upgrade your plan.",
        ));
    }

    let id = collections::insert_collection(&conn, auth.user_id, body.name.trim())?;
    if user.plan.is_free() {
        users::decrement_collections(&conn, auth.user_id)?;
    }

    let collection = collections::get_collection(&conn, id, auth.user_id)?
        .ok_or(ApiError::NotFound("Collection"))?;
    tracing::info!("user {} created collection {}", auth.user_id, id);

    Ok((
        StatusCode::CREATED,
        Json(CollectionWithCards::new(collection, Vec::new())),
    ))
}

/// PUT /api/collections/{id}
pub async fn update_collection(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCollectionRequest>,
) -> ApiResult<Json<CollectionWithCards>> {
    if let Some(name) = &body.name {
        if name.trim().is_empty() {
            return Err(ApiError::validation("Collection name cannot be empty"));
        }
    }
    if let Some(progress) = body.progress {
        if !(0.0..=100.0).contains(&progress) {
            return Err(ApiError::validation("Progress must be between 0 and 100"));
        }
    }

    let conn = db::try_lock(&state.db)?;
    collections::get_collection(&conn, id, auth.user_id)?
        .ok_or(ApiError::NotFound("Collection"))?;

    collections::update_collection(&conn, id, body.name.as_deref().map(str::trim), body.progress)?;

    let collection = collections::get_collection(&conn, id, auth.user_id)?
        .ok_or(ApiError::NotFound("Collection"))?;
    let cards = cards::list_cards(&conn, collection.id)?;
    Ok(Json(CollectionWithCards::new(collection, cards)))
}

/// DELETE /api/collections/{id}
///
/// Free-plan deletions refund a collection slot (capped); the refreshed
/// profile rides along so clients can update their quota display.
pub async fn delete_collection(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteCollectionResponse>> {
    let conn = db::try_lock(&state.db)?;
    collections::get_collection(&conn, id, auth.user_id)?
        .ok_or(ApiError::NotFound("Collection"))?;

    let user = users::get_user(&conn, auth.user_id)?.ok_or(ApiError::NotFound("User"))?;
    collections::delete_collection(&conn, id)?;

    let refreshed = if user.plan.is_free() {
        users::refund_collection_slot(&conn, auth.user_id, config::FREE_PLAN_COLLECTIONS)?;
        users::get_user(&conn, auth.user_id)?
    } else {
        None
    };

    Ok(Json(DeleteCollectionResponse {
        message: "Collection deleted",
        user: refreshed,
    }))
}
