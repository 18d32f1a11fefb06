//! JSON envelope shared by every API handler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::warn;

/// `{ success, data, message }` wrapper. `data` is `null` on failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
        }
    }
}

impl ApiEnvelope<serde_json::Value> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
        }
    }
}

pub fn success<T: Serialize>(status: StatusCode, data: T, message: &str) -> Response {
    (status, Json(ApiEnvelope::ok(data, message))).into_response()
}

pub fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(ApiEnvelope::error(message))).into_response()
}

pub fn forbidden() -> Response {
    failure(StatusCode::FORBIDDEN, "Insufficient permissions")
}

/// 400 for a body or path the extractor could not read. The extractor's
/// own text is logged, never returned.
pub fn malformed(rejection: impl Display, message: &str) -> Response {
    warn!(error = %rejection, "malformed request");
    failure(StatusCode::BAD_REQUEST, message)
}
