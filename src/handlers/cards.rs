//! Card CRUD and the two scheduler entry points: review and the due set.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::auth::AuthContext;
use crate::db::{self, cards, collections};
use crate::domain::Card;
use crate::error::{ApiError, ApiResult};
use crate::srs::{self, Rating};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    pub collection_id: i64,
    pub front: String,
    pub back: String,
}

#[derive(Debug, Deserialize)]
pub struct CardContent {
    pub front: String,
    pub back: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateRequest {
    pub collection_id: i64,
    pub cards: Vec<CardContent>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCardRequest {
    pub front: Option<String>,
    pub back: Option<String>,
}

/// The rating enum is closed; anything else fails JSON deserialization
/// before the scheduler is ever invoked.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub quality: Rating,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub card: Card,
    /// Minutes until the next review
    pub next_review_in: i64,
    pub next_review_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct BulkCreateResponse {
    pub count: usize,
    pub cards: Vec<Card>,
}

fn validate_side(value: &str, side: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("Card {side} is required")));
    }
    Ok(())
}

/// GET /api/cards/collection/{collection_id} - browse order, newest first
pub async fn collection_cards(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(collection_id): Path<i64>,
) -> ApiResult<Json<Vec<Card>>> {
    let conn = db::try_lock(&state.db)?;
    collections::get_collection(&conn, collection_id, auth.user_id)?
        .ok_or(ApiError::NotFound("Collection"))?;
    Ok(Json(cards::list_cards(&conn, collection_id)?))
}

/// GET /api/cards/collection/{collection_id}/review - the due set
///
/// Storage hands over the collection's cards in creation order; the
/// selector decides eligibility and ordering (never-reviewed first, then
/// oldest due date).
pub async fn due_cards(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(collection_id): Path<i64>,
) -> ApiResult<Json<Vec<Card>>> {
    let conn = db::try_lock(&state.db)?;
    collections::get_collection(&conn, collection_id, auth.user_id)?
        .ok_or(ApiError::NotFound("Collection"))?;

    let all = cards::list_cards_in_creation_order(&conn, collection_id)?;
    let candidates: Vec<srs::DueCandidate> = all
        .iter()
        .map(|c| srs::DueCandidate {
            id: c.id,
            next_review_at: c.schedule.next_review_at,
        })
        .collect();
    let due_ids = srs::select_due(&candidates, Utc::now());

    let mut by_id: HashMap<i64, Card> = all.into_iter().map(|c| (c.id, c)).collect();
    let due = due_ids.iter().filter_map(|id| by_id.remove(id)).collect();
    Ok(Json(due))
}

/// POST /api/cards
pub async fn create_card(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(body): Json<CreateCardRequest>,
) -> ApiResult<(StatusCode, Json<Card>)> {
    validate_side(&body.front, "front")?;
    validate_side(&body.back, "back")?;

    let conn = db::try_lock(&state.db)?;
    collections::get_collection(&conn, body.collection_id, auth.user_id)?
        .ok_or(ApiError::NotFound("Collection"))?;

    let id = cards::insert_card(&conn, body.collection_id, &body.front, &body.back)?;
    let card = cards::get_card_for_user(&conn, id, auth.user_id)?
        .ok_or(ApiError::NotFound("Card"))?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// POST /api/cards/bulk
pub async fn create_cards_bulk(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(body): Json<BulkCreateRequest>,
) -> ApiResult<(StatusCode, Json<BulkCreateResponse>)> {
    if body.cards.is_empty() {
        return Err(ApiError::validation("At least one card is required"));
    }
    for card in &body.cards {
        validate_side(&card.front, "front")?;
        validate_side(&card.back, "back")?;
    }

    let conn = db::try_lock(&state.db)?;
    collections::get_collection(&conn, body.collection_id, auth.user_id)?
        .ok_or(ApiError::NotFound("Collection"))?;

    let batch: Vec<(String, String)> = body
        .cards
        .into_iter()
        .map(|c| (c.front, c.back))
        .collect();
    let count = cards::insert_cards(&conn, body.collection_id, &batch)?;

    let cards = cards::list_cards(&conn, body.collection_id)?;
    Ok((StatusCode::CREATED, Json(BulkCreateResponse { count, cards })))
}

/// PUT /api/cards/{id}
pub async fn update_card(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCardRequest>,
) -> ApiResult<Json<Card>> {
    if let Some(front) = &body.front {
        validate_side(front, "front")?;
    }
    if let Some(back) = &body.back {
        validate_side(back, "back")?;
    }

    let conn = db::try_lock(&state.db)?;
    cards::get_card_for_user(&conn, id, auth.user_id)?.ok_or(ApiError::NotFound("Card"))?;

    cards::update_card_content(&conn, id, body.front.as_deref(), body.back.as_deref())?;
    let card = cards::get_card_for_user(&conn, id, auth.user_id)?
        .ok_or(ApiError::NotFound("Card"))?;
    Ok(Json(card))
}

/// POST /api/cards/{id}/review - apply a recall rating
///
/// Pure scheduling: the card's current state and a single `now` go in, the
/// whole new schedule comes out and is persisted in one statement while the
/// database lock is held, so concurrent reviews of the same card serialize.
pub async fn review_card(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(body): Json<ReviewRequest>,
) -> ApiResult<Json<ReviewResponse>> {
    let conn = db::try_lock(&state.db)?;
    let mut card = cards::get_card_for_user(&conn, id, auth.user_id)?
        .ok_or(ApiError::NotFound("Card"))?;

    let now = Utc::now();
    let schedule = srs::schedule(&card.schedule, body.quality, now);
    cards::update_card_schedule(&conn, card.id, &schedule)?;
    card.schedule = schedule;

    tracing::debug!(
        "card {} rated {}: next review in {} min",
        card.id,
        body.quality.as_str(),
        schedule.interval_minutes
    );

    Ok(Json(ReviewResponse {
        next_review_in: schedule.interval_minutes,
        next_review_at: schedule.next_review_at,
        card,
    }))
}

/// DELETE /api/cards/{id}
pub async fn delete_card(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let conn = db::try_lock(&state.db)?;
    cards::get_card_for_user(&conn, id, auth.user_id)?.ok_or(ApiError::NotFound("Card"))?;
    cards::delete_card(&conn, id)?;
    Ok(Json(serde_json::json!({ "message": "Card deleted" })))
}
