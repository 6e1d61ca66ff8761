//! Integration tests for the HTTP API.
//!
//! Every test runs the full router over a fresh in-memory store.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use cb_server::api::{AppState, create_router};
use cb_server::config::BracketDefaults;
use cue_bracket::db::MemoryRepository;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method

fn create_test_server() -> axum::Router {
    let state = AppState::new(Arc::new(MemoryRepository::new()), BracketDefaults::default());
    create_router(state)
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_tournament(app: &axum::Router, max_players: u32) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/tournaments",
        Some(json!({
            "name": "Thursday 9-Ball",
            "date": "2025-08-07",
            "location": "Corner Pocket",
            "max_players": max_players,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn register_players(app: &axum::Router, tournament_id: &str, count: usize) {
    for i in 0..count {
        let (status, _) = send(
            app,
            "POST",
            &format!("/api/v1/tournaments/{tournament_id}/players"),
            Some(json!({ "first_name": format!("Player{i}"), "last_name": "Test" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

fn find_match<'a>(view: &'a Value, round: u64, match_number: u64) -> &'a Value {
    view["matches"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["round"] == round && m["match_number"] == match_number)
        .unwrap()
}

fn win_for_player1() -> Value {
    json!({ "player1_score": 3, "player2_score": 1, "status": "completed" })
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = create_test_server();

    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = create_test_server();

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers().get("x-request-id").unwrap(), "abc-123");
}

// ============================================================================
// Tournament Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_list_tournaments() {
    let app = create_test_server();
    let id = create_tournament(&app, 16).await;

    let (status, body) = send(&app, "GET", &format!("/api/v1/tournaments/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "upcoming");
    assert_eq!(body["max_players"], 16);

    let (status, body) = send(&app, "GET", "/api/v1/tournaments", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_tournament_rejected() {
    let app = create_test_server();

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/tournaments",
        Some(json!({ "name": "", "date": "2025-08-07", "max_players": 8 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unknown_tournament_is_404() {
    let app = create_test_server();
    let id = uuid::Uuid::new_v4();

    let (status, body) = send(&app, "GET", &format!("/api/v1/tournaments/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Tournament not found");

    let (status, _) = send(&app, "GET", &format!("/api/v1/tournaments/{id}/bracket"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_players_listed_in_seed_order() {
    let app = create_test_server();
    let id = create_tournament(&app, 8).await;
    register_players(&app, &id, 3).await;

    let (status, body) = send(&app, "GET", &format!("/api/v1/tournaments/{id}/players"), None).await;

    assert_eq!(status, StatusCode::OK);
    let seeds: Vec<u64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["seed"].as_u64().unwrap())
        .collect();
    assert_eq!(seeds, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_full_tournament_rejects_registration() {
    let app = create_test_server();
    let id = create_tournament(&app, 2).await;
    register_players(&app, &id, 2).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/players"),
        Some(json!({ "first_name": "Late", "last_name": "Comer" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

// ============================================================================
// Bracket Tests
// ============================================================================

#[tokio::test]
async fn test_missing_bracket_is_404() {
    let app = create_test_server();
    let id = create_tournament(&app, 8).await;

    let (status, _) = send(&app, "GET", &format!("/api/v1/tournaments/{id}/bracket"), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_bracket_for_five_players() {
    let app = create_test_server();
    let id = create_tournament(&app, 8).await;
    register_players(&app, &id, 5).await;

    let (status, view) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/bracket"),
        Some(json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(view["bracket"]["bracket_size"], 8);
    assert_eq!(view["total_rounds"], 3);
    assert_eq!(view["matches"].as_array().unwrap().len(), 7);
    assert_eq!(view["layout"]["rounds"].as_array().unwrap().len(), 3);

    // The lone fifth player walks over
    let bye = find_match(&view, 1, 3);
    assert_eq!(bye["status"], "completed");
    assert_eq!(bye["winner"], bye["player1"]);

    let (_, tournament) = send(&app, "GET", &format!("/api/v1/tournaments/{id}"), None).await;
    assert_eq!(tournament["status"], "in_progress");
}

#[tokio::test]
async fn test_server_defaults_apply_to_bracket() {
    let state = AppState::new(
        Arc::new(MemoryRepository::new()),
        BracketDefaults {
            tables_per_bracket: 1,
            race_to: 7,
        },
    );
    let app = create_router(state);
    let id = create_tournament(&app, 8).await;
    register_players(&app, &id, 4).await;

    let (_, view) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/bracket"),
        Some(json!({})),
    )
    .await;

    assert_eq!(view["bracket"]["config"]["uppers_race_to"], 7);
    assert_eq!(find_match(&view, 1, 1)["table_number"], 1);
    assert_eq!(find_match(&view, 1, 2)["table_number"], 1);
}

#[tokio::test]
async fn test_second_active_bracket_conflicts() {
    let app = create_test_server();
    let id = create_tournament(&app, 8).await;
    register_players(&app, &id, 4).await;
    let uri = format!("/api/v1/tournaments/{id}/bracket");

    let (status, _) = send(&app, "POST", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Tournament already has an active bracket");
}

#[tokio::test]
async fn test_unsupported_bracket_size_rejected() {
    let app = create_test_server();
    let id = create_tournament(&app, 8).await;
    register_players(&app, &id, 4).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/bracket"),
        Some(json!({ "bracket_size": 3 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_play_bracket_to_champion() {
    let app = create_test_server();
    let id = create_tournament(&app, 8).await;
    register_players(&app, &id, 4).await;

    let (_, view) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/bracket"),
        Some(json!({})),
    )
    .await;
    let semi1 = find_match(&view, 1, 1).clone();
    let semi2 = find_match(&view, 1, 2).clone();

    let (status, view) = send(
        &app,
        "PUT",
        &format!("/api/v1/matches/{}", semi1["id"].as_str().unwrap()),
        Some(win_for_player1()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(find_match(&view, 1, 1)["winner"], semi1["player1"]);
    assert_eq!(find_match(&view, 2, 1)["player1"], semi1["player1"]);

    let (_, view) = send(
        &app,
        "PUT",
        &format!("/api/v1/matches/{}", semi2["id"].as_str().unwrap()),
        Some(win_for_player1()),
    )
    .await;
    let final_match = find_match(&view, 2, 1).clone();
    assert_eq!(final_match["player2"], semi2["player1"]);

    let (status, view) = send(
        &app,
        "PUT",
        &format!("/api/v1/matches/{}", final_match["id"].as_str().unwrap()),
        Some(win_for_player1()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["champion"], semi1["player1"]);
    assert_eq!(view["bracket"]["status"], "completed");

    let (_, tournament) = send(&app, "GET", &format!("/api/v1/tournaments/{id}"), None).await;
    assert_eq!(tournament["status"], "completed");
}

#[tokio::test]
async fn test_final_cannot_start_before_semis() {
    let app = create_test_server();
    let id = create_tournament(&app, 8).await;
    register_players(&app, &id, 4).await;

    let (_, view) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/bracket"),
        Some(json!({})),
    )
    .await;
    let final_id = find_match(&view, 2, 1)["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/matches/{final_id}"),
        Some(win_for_player1()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_score_beyond_race_rejected() {
    let app = create_test_server();
    let id = create_tournament(&app, 8).await;
    register_players(&app, &id, 2).await;

    let (_, view) = send(
        &app,
        "POST",
        &format!("/api/v1/tournaments/{id}/bracket"),
        Some(json!({})),
    )
    .await;
    let match_id = find_match(&view, 1, 1)["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/matches/{match_id}"),
        Some(json!({ "player1_score": 9, "player2_score": 1, "status": "completed" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid result"));
}

#[tokio::test]
async fn test_unknown_match_is_404() {
    let app = create_test_server();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/matches/{}", uuid::Uuid::new_v4()),
        Some(win_for_player1()),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_bracket_reopens_registration() {
    let app = create_test_server();
    let id = create_tournament(&app, 8).await;
    register_players(&app, &id, 4).await;
    let uri = format!("/api/v1/tournaments/{id}/bracket");

    send(&app, "POST", &uri, Some(json!({}))).await;

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, tournament) = send(&app, "GET", &format!("/api/v1/tournaments/{id}"), None).await;
    assert_eq!(tournament["status"], "upcoming");

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
