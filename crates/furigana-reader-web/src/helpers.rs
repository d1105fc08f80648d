//! Helper types and traits for cleaner route handlers.
//!
//! Errors leave the API as `{"detail": message}` with an HTTP status chosen
//! from the core error kind.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use furigana_reader_core::Error;
use serde_json::json;
use tracing::error;

/// Error response carrying a status and a human-readable detail.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        if e.is_not_found() {
            Self::new(StatusCode::NOT_FOUND, e.to_string())
        } else if e.is_client_error() {
            Self::bad_request(e.to_string())
        } else {
            error!("Request failed: {}", e);
            Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Standard result type for route handlers.
pub type RouteResult<T> = Result<T, ApiError>;

/// Extension trait for converting `Result<T, E>` to `RouteResult<T>`.
pub trait ResultExt<T, E: std::fmt::Display> {
    /// Converts the error to 400 Bad Request.
    fn or_bad_request(self) -> RouteResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for Result<T, E> {
    fn or_bad_request(self) -> RouteResult<T> {
        self.map_err(|e| ApiError::bad_request(e.to_string()))
    }
}
