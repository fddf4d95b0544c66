//! Command errors as HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use coldlink_commands::CommandError;

use crate::handlers::CommandResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Command(#[from] CommandError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError::Command(err) = self;
        // Client errors (missing/invalid value) are the caller's to fix;
        // everything else is a submission failure.
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = Json(CommandResponse {
            message: err.to_string(),
        });
        (status, body).into_response()
    }
}
