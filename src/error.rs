//! Herald error types with HTTP status code mapping.
//!
//! [`HeraldError`] is the central error type of the crate. The poll loop only
//! logs it; the status API maps each variant to an HTTP status code and a
//! structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{EventCategory, EventId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "no ongoing defend event with id 10"
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
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Crate-wide error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status               |
/// |-----------|-----------------|---------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request           |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error |
/// | 5000–5999 | Collaborators   | 502 Bad Gateway           |
#[derive(Debug, thiserror::Error)]
pub enum HeraldError {
    /// Configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure talking to the upstream campaign API.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// The upstream campaign API answered with a payload we could not decode.
    #[error("upstream payload could not be decoded: {0}")]
    Decode(String),

    /// The notification channel rejected or failed to receive a message.
    #[error("notification failed: {0}")]
    Notify(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// An upsert would give a category a second live record.
    #[error("{category} slot is held by event {held}, cannot track event {requested}")]
    RegistryConflict {
        /// Category whose slot is occupied.
        category: EventCategory,
        /// Event currently holding the slot.
        held: EventId,
        /// Event that was rejected.
        requested: EventId,
    },

    /// A path parameter could not be parsed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HeraldError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Config(_) => 1002,
            Self::NotFound(_) => 2001,
            Self::RegistryConflict { .. } => 2002,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
            Self::Upstream(_) => 5001,
            Self::Decode(_) => 5002,
            Self::Notify(_) => 5003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RegistryConflict { .. } => StatusCode::CONFLICT,
            Self::Config(_) | Self::Persistence(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Upstream(_) | Self::Decode(_) | Self::Notify(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<sqlx::Error> for HeraldError {
    fn from(e: sqlx::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

impl IntoResponse for HeraldError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
