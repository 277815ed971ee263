//! Router assembly.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{auth, config, handlers};

/// Build the application router with CORS for the given frontend origins.
pub fn router(state: AppState, frontend_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = frontend_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid frontend origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .route("/", get(handlers::api_index))
        .route("/api/health", get(handlers::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route(
            "/api/users/me",
            get(handlers::current_user).put(handlers::update_current_user),
        )
        .route("/api/users/me/limits", patch(handlers::update_limits))
        .route(
            "/api/collections",
            get(handlers::list_collections).post(handlers::create_collection),
        )
        .route(
            "/api/collections/{id}",
            get(handlers::get_collection)
                .put(handlers::update_collection)
                .delete(handlers::delete_collection),
        )
        .route(
            "/api/cards/collection/{collection_id}",
            get(handlers::collection_cards),
        )
        .route(
            "/api/cards/collection/{collection_id}/review",
            get(handlers::due_cards),
        )
        .route("/api/cards", post(handlers::create_card))
        .route("/api/cards/bulk", post(handlers::create_cards_bulk))
        .route(
            "/api/cards/{id}",
            put(handlers::update_card).delete(handlers::delete_card),
        )
        .route("/api/cards/{id}/review", post(handlers::review_card))
        .route("/api/ai/generate-cards", post(handlers::generate_cards))
        .route("/api/ocr/extract", post(handlers::extract_text))
        .layer(DefaultBodyLimit::max(config::MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
