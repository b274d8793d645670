//! Integration tests for hexfront-server API

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use hexfront_server::{create_router, ServerConfig, ServerState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> Router {
    let config = ServerConfig::default();
    let state = Arc::new(ServerState::new());
    create_router(&config, state)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read(response).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

/// Small duel: one infantry a side on a 5x1 strip
fn duel_scenario() -> Value {
    json!({
        "scenario": {
            "name": "duel",
            "map": ["....."],
            "armyA": ["infantry"],
            "armyB": ["infantry"],
            "config": { "aiSide": "B" }
        },
        "seed": 1
    })
}

#[tokio::test]
async fn test_status_endpoint() {
    let app = test_app();
    let (status, json) = get(&app, "/api/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["engine"], "rust");
    assert_eq!(json["gameActive"], false);
}

#[tokio::test]
async fn test_units_endpoint() {
    let app = test_app();
    let (status, json) = get(&app, "/api/units").await;

    assert_eq!(status, StatusCode::OK);
    let units = json.as_array().unwrap();
    assert_eq!(units.len(), 7);
    let archers = units.iter().find(|u| u["templateId"] == "archers").unwrap();
    assert_eq!(archers["attackRange"], 3);
}

#[tokio::test]
async fn test_board_endpoint() {
    let app = test_app();
    let (status, json) = get(&app, "/api/board").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["columns"], 9);
    assert_eq!(json["rows"], 7);
    assert_eq!(json["tiles"].as_array().unwrap().len(), 63);
    assert_eq!(json["directions"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_state_without_game_is_not_found() {
    let app = test_app();
    let (status, json) = get(&app, "/api/game/state").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_start_with_default_scenario() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/game/start")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, json) = read(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["snapshot"]["status"], "not_started");
    assert_eq!(json["snapshot"]["units"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_full_game_flow() {
    let app = test_app();

    let (status, _) = post(&app, "/api/game/start", duel_scenario()).await;
    assert_eq!(status, StatusCode::OK);

    // Column 3 is outside side A's zone
    let (status, json) = post(
        &app,
        "/api/game/deploy",
        json!({"side": "A", "unitId": 1, "to": {"q": 3, "r": 0}}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("deployment zone"));

    let (status, _) = post(
        &app,
        "/api/game/deploy",
        json!({"side": "A", "unitId": 1, "to": {"q": 1, "r": 0}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = post(&app, "/api/game/begin", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["snapshot"]["status"], "in_progress");
    assert_eq!(json["snapshot"]["currentPlayer"], "player-a");
    // (1,0) mirrors to (3,0)
    assert_eq!(json["snapshot"]["units"][1]["position"], json!({"q": 3, "r": 0}));

    let (status, json) = get(&app, "/api/game/path?unit=1&q=2&r=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["path"]["cost"], 1);

    let (status, json) = post(
        &app,
        "/api/game/action",
        json!({"actingSide": "A", "kind": "MOVE", "unitId": 1, "to": {"q": 2, "r": 0}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcomes"][0]["kind"], "moved");

    let (status, json) = post(
        &app,
        "/api/game/action",
        json!({"actingSide": "A", "kind": "ATTACK", "unitId": 1, "targetId": 2}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcomes"][0]["damage"], 8);
    assert_eq!(json["snapshot"]["units"][1]["currentHp"], 22);

    let (status, _) = post(
        &app,
        "/api/game/action",
        json!({"actingSide": "A", "kind": "END_TURN"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = post(&app, "/api/game/ai-turn", json!({"side": "B"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["snapshot"]["currentPlayer"], "player-a");
    assert_eq!(json["snapshot"]["turnNumber"], 2);
    // Adjacent, so the AI hit back
    assert_eq!(json["snapshot"]["units"][0]["currentHp"], 22);

    let (status, json) = post(&app, "/api/game/finish", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["snapshot"]["status"], "finished");
    assert_eq!(json["snapshot"]["result"]["winner"], "draw");
}

#[tokio::test]
async fn test_wrong_side_action_rejected() {
    let app = test_app();
    post(&app, "/api/game/start", duel_scenario()).await;
    post(&app, "/api/game/deploy", json!({"side": "A", "auto": true})).await;
    post(&app, "/api/game/begin", json!({})).await;

    let (status, json) = post(
        &app,
        "/api/game/action",
        json!({"actingSide": "B", "kind": "END_TURN"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["success"], false);

    let (_, json) = get(&app, "/api/game/state").await;
    assert_eq!(json["snapshot"]["currentPlayer"], "player-a");
}

#[tokio::test]
async fn test_action_before_battle_rejected() {
    let app = test_app();
    post(&app, "/api/game/start", duel_scenario()).await;

    let (status, json) = post(
        &app,
        "/api/game/action",
        json!({"actingSide": "A", "kind": "END_TURN"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("Deployment"));
}

#[tokio::test]
async fn test_rejected_ai_turn_changes_nothing() {
    let app = test_app();
    post(&app, "/api/game/start", duel_scenario()).await;
    post(&app, "/api/game/deploy", json!({"side": "A", "auto": true})).await;
    post(&app, "/api/game/begin", json!({})).await;
    let (_, before) = get(&app, "/api/game/state").await;

    let (status, json) = post(&app, "/api/game/ai-turn", json!({"side": "B"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["success"], false);

    let (_, after) = get(&app, "/api/game/state").await;
    assert_eq!(after["snapshot"], before["snapshot"]);
}
