//! End-to-end API tests: auth, profile, collections, cards, review
//! scheduling and due-set ordering, exercised over HTTP.

use axum::http::StatusCode;
use axum_test::TestServer;
use rusqlite::params;
use serde_json::{json, Value};
use tempfile::TempDir;

use cardly::db::DbPool;
use cardly::state::AppState;
use cardly::{app, db};

/// Spin up a server over a fresh temp database. The pool clone lets tests
/// reach behind the API when they need to shape scheduling state directly.
fn server() -> (TestServer, DbPool, TempDir) {
    let temp = TempDir::new().unwrap();
    let pool = db::init_db(&temp.path().join("cardly.db")).unwrap();
    let state = AppState::new(pool.clone(), None, None);
    let router = app::router(state, &["http://localhost:3000".to_string()]);
    (TestServer::new(router).unwrap(), pool, temp)
}

async fn register(server: &TestServer, email: &str) -> (Value, String) {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Test User",
            "email": email,
            "password": "secret123",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let token = body["token"].as_str().unwrap().to_string();
    (body["user"].clone(), token)
}

async fn create_collection(server: &TestServer, token: &str, name: &str) -> i64 {
    let response = server
        .post("/api/collections")
        .authorization_bearer(token)
        .json(&json!({ "name": name }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}

async fn create_card(server: &TestServer, token: &str, collection_id: i64, front: &str) -> i64 {
    let response = server
        .post("/api/cards")
        .authorization_bearer(token)
        .json(&json!({
            "collectionId": collection_id,
            "front": front,
            "back": "answer",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_and_index() {
    let (server, _pool, _temp) = server();

    let response = server.get("/api/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");

    let response = server.get("/").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Cardly API");
    assert_eq!(body["endpoints"]["cards"], "/api/cards");
}

#[tokio::test]
async fn register_login_and_me() {
    let (server, _pool, _temp) = server();

    let (user, token) = register(&server, "ada@example.com").await;
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["plan"], "free");
    assert_eq!(user["generationsLeft"], 15);
    assert_eq!(user["collectionsLeft"], 10);

    // The token works immediately
    let response = server
        .get("/api/users/me")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["name"], "Test User");

    // Fresh login issues a second valid token
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "ada@example.com", "password": "secret123" }))
        .await;
    response.assert_status_ok();
    let login_token = response.json::<Value>()["token"].as_str().unwrap().to_string();
    assert_ne!(login_token, token);
}

#[tokio::test]
async fn register_rejects_bad_input_and_duplicates() {
    let (server, _pool, _temp) = server();

    for (name, email, password) in [
        ("A", "ok@example.com", "secret123"),      // name too short
        ("Ada", "not-an-email", "secret123"),      // bad email
        ("Ada", "ok@example.com", "short"),        // password too short
    ] {
        let response = server
            .post("/api/auth/register")
            .json(&json!({ "name": name, "email": email, "password": password }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    register(&server, "ada@example.com").await;
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Imposter",
            "email": "ada@example.com",
            "password": "secret123",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let (server, _pool, _temp) = server();
    register(&server, "ada@example.com").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "ada@example.com", "password": "wrong-password" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "nobody@example.com", "password": "secret123" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let (server, _pool, _temp) = server();

    let response = server.get("/api/collections").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .get("/api/collections")
        .authorization_bearer("forged-token")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let (server, _pool, _temp) = server();
    let (_, token) = register(&server, "ada@example.com").await;

    let response = server
        .post("/api/auth/logout")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();

    let response = server
        .get("/api/users/me")
        .authorization_bearer(&token)
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_update_and_limits() {
    let (server, _pool, _temp) = server();
    let (_, token) = register(&server, "ada@example.com").await;

    let response = server
        .put("/api/users/me")
        .authorization_bearer(&token)
        .json(&json!({ "name": "Ada Lovelace", "plan": "annual" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "Ada Lovelace");
    assert_eq!(body["plan"], "annual");
    assert_eq!(body["email"], "ada@example.com");

    let response = server
        .patch("/api/users/me/limits")
        .authorization_bearer(&token)
        .json(&json!({ "generationsLeft": 2 }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["generationsLeft"], 2);
    assert_eq!(body["collectionsLeft"], 10);
}

#[tokio::test]
async fn collection_lifecycle_and_quota() {
    let (server, _pool, _temp) = server();
    let (_, token) = register(&server, "ada@example.com").await;

    let id = create_collection(&server, &token, "Biology").await;

    // Creating spent one slot
    let response = server
        .get("/api/users/me")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.json::<Value>()["collectionsLeft"], 9);

    let response = server
        .put(&format!("/api/collections/{id}"))
        .authorization_bearer(&token)
        .json(&json!({ "progress": 55.0 }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["progress"], 55.0);

    // Exhaust the quota and hit the wall
    let response = server
        .patch("/api/users/me/limits")
        .authorization_bearer(&token)
        .json(&json!({ "collectionsLeft": 0 }))
        .await;
    response.assert_status_ok();

    let response = server
        .post("/api/collections")
        .authorization_bearer(&token)
        .json(&json!({ "name": "One Too Many" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    // Deleting refunds a slot and returns the refreshed profile
    let response = server
        .delete(&format!("/api/collections/{id}"))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user"]["collectionsLeft"], 1);

    let response = server
        .get(&format!("/api/collections/{id}"))
        .authorization_bearer(&token)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn collections_are_private_to_their_owner() {
    let (server, _pool, _temp) = server();
    let (_, owner) = register(&server, "owner@example.com").await;
    let (_, other) = register(&server, "other@example.com").await;

    let id = create_collection(&server, &owner, "Private").await;
    let card_id = create_card(&server, &owner, id, "secret front").await;

    let response = server
        .get(&format!("/api/collections/{id}"))
        .authorization_bearer(&other)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server
        .post(&format!("/api/cards/{card_id}/review"))
        .authorization_bearer(&other)
        .json(&json!({ "quality": "good" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server.get("/api/collections").authorization_bearer(&other).await;
    response.assert_status_ok();
    assert!(response.json::<Value>().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn card_crud_and_bulk() {
    let (server, _pool, _temp) = server();
    let (_, token) = register(&server, "ada@example.com").await;
    let collection = create_collection(&server, &token, "Deck").await;

    let card = create_card(&server, &token, collection, "What is Rust?").await;

    let response = server
        .post("/api/cards/bulk")
        .authorization_bearer(&token)
        .json(&json!({
            "collectionId": collection,
            "cards": [
                { "front": "Q1", "back": "A1" },
                { "front": "Q2", "back": "A2" },
            ],
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["count"], 2);
    assert_eq!(body["cards"].as_array().unwrap().len(), 3);

    let response = server
        .put(&format!("/api/cards/{card}"))
        .authorization_bearer(&token)
        .json(&json!({ "back": "A systems language" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["front"], "What is Rust?");
    assert_eq!(body["back"], "A systems language");

    let response = server
        .delete(&format!("/api/cards/{card}"))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();

    let response = server
        .get(&format!("/api/cards/collection/{collection}"))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>().as_array().unwrap().len(), 2);

    // Blank sides are rejected
    let response = server
        .post("/api/cards")
        .authorization_bearer(&token)
        .json(&json!({ "collectionId": collection, "front": "  ", "back": "x" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn review_schedules_the_card() {
    let (server, _pool, _temp) = server();
    let (_, token) = register(&server, "ada@example.com").await;
    let collection = create_collection(&server, &token, "Deck").await;
    let card = create_card(&server, &token, collection, "front").await;

    // First good: the fresh-card interval
    let response = server
        .post(&format!("/api/cards/{card}/review"))
        .authorization_bearer(&token)
        .json(&json!({ "quality": "good" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["nextReviewIn"], 10);
    assert_eq!(body["card"]["intervalMinutes"], 10);
    assert_eq!(body["card"]["repetitions"], 1);
    assert_eq!(body["card"]["easeFactor"], 2.5);
    assert!(body["nextReviewAt"].is_string());

    // Hard on {10, 2.5, 1}: interval 12, ease 2.35, reps 2
    let response = server
        .post(&format!("/api/cards/{card}/review"))
        .authorization_bearer(&token)
        .json(&json!({ "quality": "hard" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["nextReviewIn"], 12);
    assert_eq!(body["card"]["easeFactor"], 2.35);
    assert_eq!(body["card"]["repetitions"], 2);

    // Again resets progress
    let response = server
        .post(&format!("/api/cards/{card}/review"))
        .authorization_bearer(&token)
        .json(&json!({ "quality": "again" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["card"]["repetitions"], 0);
    assert_eq!(body["card"]["intervalMinutes"], 1);
}

#[tokio::test]
async fn review_rejects_unknown_rating_before_scheduling() {
    let (server, _pool, _temp) = server();
    let (_, token) = register(&server, "ada@example.com").await;
    let collection = create_collection(&server, &token, "Deck").await;
    let card = create_card(&server, &token, collection, "front").await;

    let response = server
        .post(&format!("/api/cards/{card}/review"))
        .authorization_bearer(&token)
        .json(&json!({ "quality": "perfect" }))
        .await;
    assert!(response.status_code().is_client_error());

    // The card's schedule is untouched
    let response = server
        .get(&format!("/api/cards/collection/{collection}"))
        .authorization_bearer(&token)
        .await;
    let cards: Value = response.json();
    assert!(cards[0]["nextReviewAt"].is_null());
}

#[tokio::test]
async fn due_set_orders_null_first_then_oldest() {
    let (server, pool, _temp) = server();
    let (_, token) = register(&server, "ada@example.com").await;
    let collection = create_collection(&server, &token, "Deck").await;

    let first = create_card(&server, &token, collection, "never reviewed A").await;
    let overdue = create_card(&server, &token, collection, "overdue").await;
    let second = create_card(&server, &token, collection, "never reviewed B").await;
    let future = create_card(&server, &token, collection, "not yet due").await;

    // Shape the schedules directly: one card overdue, one far in the future
    {
        let conn = pool.lock().unwrap();
        let past = (chrono::Utc::now() - chrono::Duration::minutes(90)).to_rfc3339();
        let ahead = (chrono::Utc::now() + chrono::Duration::minutes(90)).to_rfc3339();
        conn.execute(
            "UPDATE cards SET next_review_at = ?1, repetitions = 1 WHERE id = ?2",
            params![past, overdue],
        )
        .unwrap();
        conn.execute(
            "UPDATE cards SET next_review_at = ?1, repetitions = 1 WHERE id = ?2",
            params![ahead, future],
        )
        .unwrap();
    }

    let response = server
        .get(&format!("/api/cards/collection/{collection}/review"))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();

    // Never-reviewed cards first in creation order, then the overdue one;
    // the future card is excluded
    assert_eq!(ids, vec![first, second, overdue]);

    // Idempotent: asking again changes nothing
    let response = server
        .get(&format!("/api/cards/collection/{collection}/review"))
        .authorization_bearer(&token)
        .await;
    let again: Vec<i64> = response
        .json::<Value>()
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    assert_eq!(again, ids);
}

#[tokio::test]
async fn unconfigured_external_services_fail_cleanly() {
    let (server, _pool, _temp) = server();
    let (_, token) = register(&server, "ada@example.com").await;
    let collection = create_collection(&server, &token, "Deck").await;

    let response = server
        .post("/api/ai/generate-cards")
        .authorization_bearer(&token)
        .json(&json!({
            "text": "A sufficiently long reference text.",
            "collectionId": collection,
            "collectionName": "Deck",
        }))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["error"], "Service not configured");
}
