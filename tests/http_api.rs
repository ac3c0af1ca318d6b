//! HTTP surface tests using `tower::ServiceExt::oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use intercept_callback::config::{ServiceConfig, StoreBackend};
use intercept_callback::http::{AppState, HttpServer};
use intercept_callback::CallbackService;

mod common;
use common::MockCollaborators;

fn app(config: &ServiceConfig) -> Router {
    let service = Arc::new(CallbackService::from_config(config).unwrap());
    HttpServer::new(config, service).router()
}

fn memory_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.store.backend = StoreBackend::Memory;
    config
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app(&memory_config())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_request_callback_blocks_hosts() {
    let mut config = memory_config();
    config.requests.blocked_hosts = vec!["ads.example".into()];
    let app = app(&config);

    let blocked = app
        .clone()
        .oneshot(post_json(
            "/v1/request",
            json!({"host": "cdn.ads.example", "path": "/x.js", "method": "GET"}),
        ))
        .await
        .unwrap();
    assert_eq!(blocked.status(), StatusCode::OK);
    let body = json_body(blocked).await;
    assert_eq!(body["block_request"], true);
    assert_eq!(body["block_status"], 403);

    let allowed = app
        .oneshot(post_json(
            "/v1/request",
            json!({"host": "example.com", "path": "/", "method": "GET"}),
        ))
        .await
        .unwrap();
    assert_eq!(json_body(allowed).await["block_request"], false);
}

#[tokio::test]
async fn test_response_callback_round_trip() {
    let mock = MockCollaborators::start().await;
    let app = app(&mock.config());

    let request = json!({
        "host": "example.com",
        "path": "/news",
        "method": "GET",
        "headers": {"Cookie": "__transform_mode=xxx"},
        "status_code": 200,
        "content_type": "text/html",
        "body": "<p>Top story</p>"
    });
    let response = app.oneshot(post_json("/v1/response", request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["final_body"], "<p>xxx xxxxx</p>");
    assert_eq!(body["content_was_modified"], true);
    assert_eq!(body["final_headers"]["x-transform-mode"], "xxx");
    assert_eq!(body["processing_error"], Value::Null);
}

#[tokio::test]
async fn test_slow_pipeline_answers_with_error_result_and_keeps_running() {
    let mock = MockCollaborators::start_with_extract_delay(Duration::from_secs(2)).await;
    let mut config = mock.config();
    config.timeouts.request_secs = 1;
    let app = app(&config);

    let request = json!({
        "host": "example.com",
        "path": "/slow",
        "method": "GET",
        "headers": {"Cookie": "__transform_mode=hashes"},
        "status_code": 200,
        "content_type": "text/html",
        "body": "<p>Slow page</p>"
    });
    let response = app.oneshot(post_json("/v1/response", request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["final_status_code"], 500);
    assert_eq!(body["final_headers"]["x-processing-error"], "true");
    assert!(body["processing_error"]
        .as_str()
        .unwrap()
        .contains("exceeded 1s"));

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(mock.extract_calls(), 1);
    assert_eq!(mock.transform_calls(), 1);
    assert_eq!(mock.reconstruct_calls(), 1);
}

#[tokio::test]
async fn test_oversized_callback_body_is_rejected() {
    let mut config = memory_config();
    config.listener.max_body_bytes = 64;
    let app = app(&config);

    let body = json!({"host": "example.com", "path": "/", "body": "x".repeat(256)}).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/v1/response")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_malformed_callback_is_rejected() {
    let response = app(&memory_config())
        .oneshot(post_json("/v1/response", json!({"status_code": "not a number"})))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_stats_require_key_when_configured() {
    let mut config = memory_config();
    config.admin.api_key = Some("s3cret".into());
    let app = app(&config);

    let denied = app
        .clone()
        .oneshot(Request::get("/v1/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);

    let wrong = app
        .clone()
        .oneshot(
            Request::get("/v1/stats")
                .header(header::AUTHORIZATION, "Bearer nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let allowed = app
        .oneshot(
            Request::get("/v1/stats")
                .header(header::AUTHORIZATION, "Bearer s3cret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
    let body = json_body(allowed).await;
    assert_eq!(body["hit_rate"], 0.0);
}

#[tokio::test]
async fn test_stats_reset() {
    let config = memory_config();
    let service = Arc::new(CallbackService::from_config(&config).unwrap());
    let state = AppState {
        service: service.clone(),
        admin_key: None,
        response_deadline: Duration::from_secs(config.timeouts.request_secs),
    };
    let app = HttpServer::build_router(&config, state);

    for _ in 0..3 {
        app.clone()
            .oneshot(post_json(
                "/v1/request",
                json!({"host": "example.com", "path": "/", "method": "GET"}),
            ))
            .await
            .unwrap();
    }

    let reset = app
        .oneshot(
            Request::post("/v1/stats/reset")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(reset.status(), StatusCode::OK);
    assert_eq!(json_body(reset).await["total_requests"], 3);
    assert_eq!(service.stats().stats.total_requests, 0);
}
