//! Command endpoint tests via `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use coldlink_api::{ApiServer, ApiState};
use coldlink_commands::CommandRelay;
use coldlink_nullables::NullSubmitter;
use coldlink_relay::RelayMetrics;
use coldlink_types::Setpoint;

fn state_with(submitter: Arc<NullSubmitter>, expose_metrics: bool) -> ApiState {
    ApiState {
        commands: Arc::new(CommandRelay::new(submitter)),
        metrics: Arc::new(RelayMetrics::new()),
        expose_metrics,
    }
}

fn post(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn string_temperature_is_scaled_and_accepted() {
    let submitter = Arc::new(NullSubmitter::confirming());
    let app = ApiServer::router(state_with(Arc::clone(&submitter), false));

    let response = app
        .oneshot(post("/set-temperature", r#"{"temperature":"21.5"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(submitter.calls(), vec![(Setpoint::Temperature, 2150)]);
}

#[tokio::test]
async fn numeric_temperature_is_accepted_too() {
    let submitter = Arc::new(NullSubmitter::confirming());
    let app = ApiServer::router(state_with(Arc::clone(&submitter), false));

    let response = app
        .oneshot(post("/set-temperature", r#"{"temperature":21.5}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(submitter.calls(), vec![(Setpoint::Temperature, 2150)]);
}

#[tokio::test]
async fn humidity_routes_to_the_humidity_write() {
    let submitter = Arc::new(NullSubmitter::confirming());
    let app = ApiServer::router(state_with(Arc::clone(&submitter), false));

    let response = app
        .oneshot(post("/set-humidity", r#"{"humidity":"60"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(submitter.calls(), vec![(Setpoint::Humidity, 6000)]);
}

#[tokio::test]
async fn absent_value_is_a_client_error_and_never_reaches_the_chain() {
    let submitter = Arc::new(NullSubmitter::confirming());
    let app = ApiServer::router(state_with(Arc::clone(&submitter), false));

    let response = app
        .oneshot(post("/set-temperature", r#"{}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(submitter.calls().is_empty());
}

#[tokio::test]
async fn null_value_counts_as_absent() {
    let submitter = Arc::new(NullSubmitter::confirming());
    let app = ApiServer::router(state_with(Arc::clone(&submitter), false));

    let response = app
        .oneshot(post("/set-humidity", r#"{"humidity":null}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(submitter.calls().is_empty());
}

#[tokio::test]
async fn malformed_value_is_a_client_error() {
    let submitter = Arc::new(NullSubmitter::confirming());
    let app = ApiServer::router(state_with(Arc::clone(&submitter), false));

    let response = app
        .oneshot(post("/set-temperature", r#"{"temperature":"chilly"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(submitter.calls().is_empty());
}

#[tokio::test]
async fn submission_failure_maps_to_server_error() {
    let submitter = Arc::new(NullSubmitter::failing("transaction reverted"));
    let app = ApiServer::router(state_with(Arc::clone(&submitter), false));

    let response = app
        .oneshot(post("/set-temperature", r#"{"temperature":"4"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(submitter.calls().len(), 1);
}

#[tokio::test]
async fn command_metrics_track_outcomes() {
    let submitter = Arc::new(NullSubmitter::confirming());
    let state = state_with(submitter, false);
    let app = ApiServer::router(state.clone());

    let _ = app
        .clone()
        .oneshot(post("/set-temperature", r#"{"temperature":"4"}"#))
        .await
        .unwrap();
    let _ = app
        .oneshot(post("/set-temperature", r#"{}"#))
        .await
        .unwrap();

    assert_eq!(state.metrics.commands_submitted.get(), 1);
    assert_eq!(state.metrics.commands_failed.get(), 1);
}

#[tokio::test]
async fn metrics_endpoint_serves_the_registry_when_enabled() {
    let submitter = Arc::new(NullSubmitter::confirming());
    let app = ApiServer::router(state_with(submitter, true));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("coldlink_commands_submitted_total"));
}

#[tokio::test]
async fn metrics_endpoint_is_hidden_when_disabled() {
    let submitter = Arc::new(NullSubmitter::confirming());
    let app = ApiServer::router(state_with(submitter, false));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
