//! Feed error types with HTTP status code mapping.
//!
//! [`FeedError`] is the central error type of the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::source::RepositoryError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1002,
///     "message": "invalid filter: radius must be a positive number of meters, got 0",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`FeedError`] for ranges).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Service-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | Not Found       | 404 Not Found                |
/// | 3000–3999 | Server          | 500 / 503                    |
/// | 5000–5999 | Event backend   | 502 Bad Gateway              |
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A filter value was rejected at the boundary.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// Coordinates outside the valid range.
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    /// Category name not in the fixed enumeration.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// Event not present in the current feed.
    #[error("event not found: {0}")]
    EventNotFound(String),

    /// The feed engine task is no longer running.
    #[error("feed engine stopped")]
    EngineStopped,

    /// Failure reported by the event backend.
    #[error("event backend error: {0}")]
    Repository(#[from] RepositoryError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FeedError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidFilter(_) => 1002,
            Self::InvalidPosition(_) => 1003,
            Self::UnknownCategory(_) => 1004,
            Self::EventNotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::EngineStopped => 3001,
            Self::Repository(_) => 5001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidFilter(_)
            | Self::InvalidPosition(_)
            | Self::UnknownCategory(_) => StatusCode::BAD_REQUEST,
            Self::EventNotFound(_) => StatusCode::NOT_FOUND,
            Self::EngineStopped => StatusCode::SERVICE_UNAVAILABLE,
            Self::Repository(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
