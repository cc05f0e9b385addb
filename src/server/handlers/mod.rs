//! HTTP handlers for the server.

pub mod export;
pub mod generate;
pub mod images;
pub mod sessions;

use axum::{Json, http::StatusCode};
use serde_json::{Value, json};

use crate::error::{ExportError, PlacardError};

/// Error response shared by all API handlers.
pub type ApiError = (StatusCode, Json<Value>);

pub fn status_for(err: &PlacardError) -> StatusCode {
    match err {
        PlacardError::EmptyInput(_) | PlacardError::Parse(_) | PlacardError::Image(_) => {
            StatusCode::BAD_REQUEST
        }
        PlacardError::Session(_) => StatusCode::NOT_FOUND,
        PlacardError::Export(ExportError::NotReady) => StatusCode::CONFLICT,
        PlacardError::Export(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PlacardError::Remote(_) | PlacardError::RemoteParse(_) => StatusCode::BAD_GATEWAY,
        PlacardError::Config(_) | PlacardError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn api_error(err: PlacardError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }
    (
        status,
        Json(json!({
            "success": false,
            "error": err.to_string(),
        })),
    )
}

pub fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "success": false,
            "error": message.into(),
        })),
    )
}
