//! Relay error types with HTTP status code mapping.
//!
//! [`RelayError`] is the central error type for the relay. Every failure is
//! scoped to a single message or a single target connection; nothing here
//! is fatal to the process. Variants that surface over HTTP map to a
//! specific status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::ConnectionId;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid message: topic has no separator",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`RelayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                |
/// |-----------|-------------------|----------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request            |
/// | 2000–2999 | State/Not Found   | 404 Not Found / 410 Gone   |
/// | 3000–3999 | Server/Registry   | 500 / 503                  |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// No device identifier could be extracted from the message; the
    /// message is dropped without retry.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Subscribe or unsubscribe referenced a connection with no registry
    /// record.
    #[error("connection not found: {0}")]
    ConnectionNotFound(ConnectionId),

    /// The delivery target's channel is definitively closed; triggers
    /// registry cleanup and is never surfaced to the sender.
    #[error("connection gone: {0}")]
    ConnectionGone(ConnectionId),

    /// Transient delivery failure (e.g. outbound queue full); logged and
    /// skipped, no retry.
    #[error("delivery failed for {connection_id}: {reason}")]
    DeliveryFailed {
        /// Target connection.
        connection_id: ConnectionId,
        /// Transport-level reason.
        reason: String,
    },

    /// The registry cannot accept or serve the request.
    #[error("registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidMessage(_) => 1001,
            Self::ConnectionNotFound(_) => 2001,
            Self::ConnectionGone(_) => 2002,
            Self::DeliveryFailed { .. } => 2003,
            Self::RegistryUnavailable(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidMessage(_) => StatusCode::BAD_REQUEST,
            Self::ConnectionNotFound(_) => StatusCode::NOT_FOUND,
            Self::ConnectionGone(_) | Self::DeliveryFailed { .. } => StatusCode::GONE,
            Self::RegistryUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
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
