//! AI card generation handler.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthContext;
use crate::config;
use crate::db::{self, cards, collections, users};
use crate::domain::Card;
use crate::error::{ApiError, ApiResult};
use crate::services::Difficulty;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCardsRequest {
    pub text: String,
    pub collection_id: i64,
    #[serde(default)]
    pub num_cards: Option<usize>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    pub collection_name: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateCardsResponse {
    pub cards: Vec<Card>,
    pub generated: usize,
    pub message: &'static str,
}

/// POST /api/ai/generate-cards
pub async fn generate_cards(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(body): Json<GenerateCardsRequest>,
) -> ApiResult<Json<GenerateCardsResponse>> {
    if body.text.trim().chars().count() < 10 {
        return Err(ApiError::validation(
            "Reference text must be at least 10 characters",
        ));
    }
    if body.collection_name.trim().is_empty() {
        return Err(ApiError::validation("Collection name is required"));
    }
    let num_cards = body.num_cards.unwrap_or(config::DEFAULT_GENERATED_CARDS);
    if num_cards == 0 || num_cards > config::MAX_GENERATED_CARDS {
        return Err(ApiError::Validation(format!(
            "Number of cards must be between 1 and {}",
            config::MAX_GENERATED_CARDS
        )));
    }
    let difficulty = body.difficulty.unwrap_or_default();

    let ai = state
        .ai
        .as_ref()
        .ok_or_else(|| ApiError::Config("AI card generation is not configured".to_string()))?;

    // Quota and ownership checks, then release the lock for the upstream call
    let is_free = {
        let conn = db::try_lock(&state.db)?;
        let user = users::get_user(&conn, auth.user_id)?.ok_or(ApiError::NotFound("User"))?;
        if user.plan.is_free() && user.generations_left <= 0 {
            return Err(ApiError::forbidden(
                "Generation limit reached. Please upgrade your plan.",
            ));
        }
        collections::get_collection(&conn, body.collection_id, auth.user_id)?
            .ok_or(ApiError::NotFound("Collection"))?;
        user.plan.is_free()
    };

    let generated = ai.generate_cards(&body.text, num_cards, difficulty).await?;

    let conn = db::try_lock(&state.db)?;
    // The collection may have vanished while the model was thinking
    collections::get_collection(&conn, body.collection_id, auth.user_id)?
        .ok_or(ApiError::NotFound("Collection"))?;

    let batch: Vec<(String, String)> = generated
        .into_iter()
        .map(|c| (c.front, c.back))
        .collect();
    let count = cards::insert_cards(&conn, body.collection_id, &batch)?;

    if is_free {
        users::decrement_generations(&conn, auth.user_id)?;
    }

    let all_cards = cards::list_cards(&conn, body.collection_id)?;
    tracing::info!(
        "generated {} cards into collection {} for user {}",
        count,
        body.collection_id,
        auth.user_id
    );

    Ok(Json(GenerateCardsResponse {
        cards: all_cards,
        generated: count,
        message: "Cards generated successfully",
    }))
}
