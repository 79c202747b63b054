//! HTTP-level error type: wraps [`cachegrid_core::CoreError`] plus
//! adapter-only variants, and renders both as the JSON error envelope
//! clients expect.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cachegrid_core::entry::now_millis;
use cachegrid_core::CoreError;
use serde_json::json;

/// Error surfaced by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Wraps a core-layer failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A request parameter failed adapter-level validation (e.g. `limit`
    /// out of range, missing `confirm=true`).
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::Core(CoreError::NotRunning) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            ApiError::Core(CoreError::Refused) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            ApiError::Core(CoreError::InvalidArgument(_)) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Core(CoreError::Internal(_)) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("error"),
            "detail": detail,
            "timestamp": now_millis(),
        }));

        (status, body).into_response()
    }
}
