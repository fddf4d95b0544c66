//! Axum-based command API server.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use prometheus::{Encoder, TextEncoder};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use coldlink_commands::CommandRelay;
use coldlink_relay::RelayMetrics;

use crate::handlers;

/// Shared state for the command API.
#[derive(Clone)]
pub struct ApiState {
    pub commands: Arc<CommandRelay>,
    pub metrics: Arc<RelayMetrics>,
    /// Whether `GET /metrics` is served (config `enable_metrics`).
    pub expose_metrics: bool,
}

/// The command HTTP server.
pub struct ApiServer {
    pub port: u16,
    pub state: ApiState,
}

impl ApiServer {
    pub fn new(port: u16, state: ApiState) -> Self {
        Self { port, state }
    }

    /// The axum router, exposed separately for handler tests.
    pub fn router(state: ApiState) -> Router {
        Router::new()
            .route("/set-temperature", post(handlers::set_temperature))
            .route("/set-humidity", post(handlers::set_humidity))
            .route("/metrics", get(metrics_endpoint))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Bind and serve until the process shuts down.
    pub async fn start(&self) -> Result<(), std::io::Error> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr).await?;
        info!("command API listening on {addr}");
        axum::serve(listener, Self::router(self.state.clone())).await
    }
}

/// Prometheus text exposition of the relay registry.
async fn metrics_endpoint(State(state): State<ApiState>) -> impl IntoResponse {
    if !state.expose_metrics {
        return (StatusCode::NOT_FOUND, String::new());
    }
    let families = state.metrics.registry.gather();
    let mut buffer = Vec::new();
    if TextEncoder::new().encode(&families, &mut buffer).is_err() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "metrics encoding failed".to_string(),
        );
    }
    match String::from_utf8(buffer) {
        Ok(body) => (StatusCode::OK, body),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "metrics encoding failed".to_string(),
        ),
    }
}
