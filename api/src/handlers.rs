//! Command request handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use coldlink_types::Setpoint;

use crate::error::ApiError;
use crate::server::ApiState;

// ── Requests / responses ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetTemperatureRequest {
    /// Accepted as JSON number or string; absent and null both mean the
    /// value is missing.
    pub temperature: Option<Value>,
}

#[derive(Deserialize)]
pub struct SetHumidityRequest {
    pub humidity: Option<Value>,
}

#[derive(Serialize)]
pub struct CommandResponse {
    pub message: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────

pub async fn set_temperature(
    State(state): State<ApiState>,
    Json(request): Json<SetTemperatureRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    info!(value = ?request.temperature, "set-temperature request");
    submit(&state, Setpoint::Temperature, request.temperature).await?;
    Ok(Json(CommandResponse {
        message: "target temperature set".into(),
    }))
}

pub async fn set_humidity(
    State(state): State<ApiState>,
    Json(request): Json<SetHumidityRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    info!(value = ?request.humidity, "set-humidity request");
    submit(&state, Setpoint::Humidity, request.humidity).await?;
    Ok(Json(CommandResponse {
        message: "target humidity set".into(),
    }))
}

async fn submit(state: &ApiState, kind: Setpoint, value: Option<Value>) -> Result<(), ApiError> {
    let text = value.map(value_to_text);
    let result = state.commands.submit(kind, text.as_deref()).await;
    match result {
        Ok(_) => {
            state.metrics.commands_submitted.inc();
            Ok(())
        }
        Err(e) => {
            state.metrics.commands_failed.inc();
            Err(e.into())
        }
    }
}

/// Render the posted JSON value as decimal text. Numbers and strings are
/// what the dashboard sends; any other shape is rendered verbatim and
/// rejected downstream by the scaled-value parser.
fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
