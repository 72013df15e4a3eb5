//! Canonical response envelope shared by every route.
//!
//! Success and failure both answer `{success, message, data, timestamp}`
//! so callers parse one shape regardless of which internal path executed.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use busload_core::CoreError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// The response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// Human-readable outcome description.
    pub message: String,
    /// Route-specific payload, `null` on failure.
    pub data: Option<Value>,
    /// Server time the envelope was built.
    pub timestamp: DateTime<Utc>,
}

impl ApiResponse {
    /// Builds a success envelope.
    pub fn ok(message: impl Into<String>, data: Value) -> Self {
        Self { success: true, message: message.into(), data: Some(data), timestamp: Utc::now() }
    }

    /// Builds a failure envelope with no data.
    pub fn error(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), data: None, timestamp: Utc::now() }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Maps a core error onto its HTTP status and the failure envelope.
pub fn error_response(error: &CoreError) -> Response {
    let status = match error {
        CoreError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        CoreError::InvalidPayload(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(ApiResponse::error(error.to_string()))).into_response()
}
