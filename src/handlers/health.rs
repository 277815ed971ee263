//! API index and health check.

use axum::Json;
use serde_json::{json, Value};

/// GET / - API index
pub async fn api_index() -> Json<Value> {
    Json(json!({
        "message": "Cardly API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/api/health",
            "auth": "/api/auth",
            "users": "/api/users",
            "collections": "/api/collections",
            "cards": "/api/cards",
            "ocr": "/api/ocr",
            "ai": "/api/ai",
        },
    }))
}

/// GET /api/health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Cardly API is running" }))
}
