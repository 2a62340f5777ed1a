//! Router tests driven through `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use gremview_api::{AppState, create_router};
use gremview_client::mock::{MockBackend, MockReply};
use gremview_core::GremviewConfig;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn app(backend: &MockBackend) -> Router {
    app_with(backend, GremviewConfig::default())
}

fn app_with(backend: &MockBackend, config: GremviewConfig) -> Router {
    let state = AppState::from_config(Arc::new(backend.clone()), config);
    create_router(Arc::new(state))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn graph_backend() -> MockBackend {
    MockBackend::new()
        .on(
            "g.V(1).outE()",
            MockReply::items(vec![json!({
                "id": "e1",
                "label": "knows",
                "outV": {"id": 1, "label": "person"},
                "inV": {"id": 2, "label": "person"},
                "properties": {"weight": 0.5}
            })]),
        )
        .on(
            "elementMap",
            MockReply::items(vec![
                json!({"id": 1, "label": "person", "name": "marko"}),
                json!({"id": 2, "label": "person", "name": "vadas"}),
            ]),
        )
}

// ============================================================================
// /health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(&MockBackend::new()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["name"], "gremview");
}

// ============================================================================
// /api/query
// ============================================================================

#[tokio::test]
async fn test_query_returns_graph_and_log() {
    let backend = graph_backend();
    let (status, body) = send(
        app(&backend),
        post_json("/api/query", json!({"query": "g.V(1).outE()", "host": "localhost", "port": "8182"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["raw"].as_array().unwrap().len(), 1);
    assert_eq!(body["graph"]["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(body["graph"]["links"][0]["source"], 1);
    assert_eq!(body["graph"]["links"][0]["target"], 2);
    assert_eq!(body["executionLog"][0]["type"], "Main Query");
    assert_eq!(body["executionLog"][1]["type"], "Missing Node Fetch");
}

#[tokio::test]
async fn test_missing_query_is_400() {
    let (status, body) = send(app(&MockBackend::new()), post_json("/api/query", json!({"host": "db"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Query is required"}));
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/query")
        .header("content-type", "application/json")
        .body(Body::from("{\"query\": "))
        .unwrap();
    let (status, body) = send(app(&MockBackend::new()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_get_is_405() {
    let request = Request::builder().uri("/api/query").body(Body::empty()).unwrap();
    let (status, body) = send(app(&MockBackend::new()), request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({"error": "Method not allowed"}));
}

#[tokio::test]
async fn test_execution_failure_is_500() {
    let backend = MockBackend::new().on("g.V().nope()", MockReply::fail("No signature of method"));
    let (status, body) = send(app(&backend), post_json("/api/query", json!({"query": "g.V().nope()"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("No signature of method"));
}

#[tokio::test]
async fn test_unreachable_backend_is_502() {
    let backend = MockBackend::new().refuse_connections("Connection refused");
    let (status, body) = send(app(&backend), post_json("/api/query", json!({"query": "g.V()"}))).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("Connection refused"));
}

#[tokio::test(start_paused = true)]
async fn test_primary_timeout_is_504() {
    let backend = MockBackend::new().on("g.V()", MockReply::delayed(Duration::from_secs(60), vec![]));
    let mut config = GremviewConfig::default();
    config.pipeline.primary_timeout_secs = 2;

    let (status, body) = send(
        app_with(&backend, config),
        post_json("/api/query", json!({"query": "g.V()"})),
    )
    .await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"], "Primary query timed out after 2s");
}

#[tokio::test]
async fn test_client_disconnect_closes_backend_session() {
    let backend = MockBackend::new().on(
        "g.V().repeat",
        MockReply::delayed(Duration::from_secs(2), vec![json!(1)]),
    );
    let request = post_json("/api/query", json!({"query": "g.V().repeat(out()).times(20)"}));

    // Dropping the in-flight request future is what a disconnect looks like
    // to the handler.
    let outcome = tokio::time::timeout(Duration::from_millis(50), app(&backend).oneshot(request)).await;
    assert!(outcome.is_err());

    tokio::time::timeout(Duration::from_secs(1), backend.wait_for_closed(1))
        .await
        .unwrap();
    assert_eq!(backend.sessions_opened(), 1);
    assert_eq!(backend.sessions_closed(), 1);
}

// ============================================================================
// Edge properties mode
// ============================================================================

#[tokio::test]
async fn test_edge_properties_mode() {
    let backend = MockBackend::new().on(
        "bothE().project('id', 'keys', 'vals')",
        MockReply::items(vec![json!({"id": "e1", "keys": ["weight", "OUT"], "vals": [0.5, {"id": 1}]})]),
    );
    let (status, body) = send(
        app(&backend),
        post_json("/api/query", json!({"mode": "edgeProps", "sourceId": 1, "edgeId": "e1"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"properties": {"weight": 0.5}}));
}

#[tokio::test]
async fn test_edge_properties_failure_is_500() {
    let backend = MockBackend::new().refuse_connections("Connection refused");
    let (status, body) = send(
        app(&backend),
        post_json("/api/query", json!({"mode": "edgeProps", "sourceId": 1, "edgeId": "e1"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_edge_properties_without_ids_is_400() {
    let (status, _) = send(
        app(&MockBackend::new()),
        post_json("/api/query", json!({"mode": "edgeProps", "sourceId": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// /api/test-connection
// ============================================================================

#[tokio::test]
async fn test_connection_success() {
    let backend = MockBackend::new();
    let (status, body) = send(
        app(&backend),
        post_json("/api/test-connection", json!({"host": "db", "port": 8182})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "connected", "message": "Connection successful"}));
    assert_eq!(backend.sessions_closed(), 1);
}

#[tokio::test]
async fn test_connection_failure() {
    let backend = MockBackend::new().refuse_connections("Connection refused");
    let (status, body) = send(
        app(&backend),
        post_json("/api/test-connection", json!({"host": "db", "port": "8182"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert!(body["error"].as_str().unwrap().contains("Connection refused"));
}

#[tokio::test]
async fn test_connection_rejects_get() {
    let request = Request::builder()
        .uri("/api/test-connection")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(&MockBackend::new()), request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
