//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Every variant except persistence/internal failures is a per-request,
//! recoverable condition.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::status::Status;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "validation failed: title, reporter_contact.email",
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
    /// Numeric error code (see code ranges below).
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
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 / 409 / 401              |
/// | 3000–3999 | Server          | 500 Internal Server Error    |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Submission rejected before any mutation. Lists every invalid field,
    /// not just the first, so a form can highlight all problems at once.
    #[error("validation failed: {}", fields.join(", "))]
    Validation {
        /// Names of all fields that failed validation.
        fields: Vec<String>,
    },

    /// A latitude, longitude, or radius value was not a finite number.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Page size must be a positive integer.
    #[error("invalid page size: {0}")]
    InvalidPageSize(i64),

    /// Issue with the given ID was not found.
    #[error("issue not found: {0}")]
    NotFound(uuid::Uuid),

    /// Attempted status change violates the lifecycle graph.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Status the issue currently holds.
        from: Status,
        /// Status the caller attempted to move to.
        to: Status,
    },

    /// Voting requires an authenticated user (anonymous reporting is
    /// allowed, anonymous voting is not).
    #[error("voting requires an authenticated user")]
    Unauthenticated,

    /// Persistence layer failure. Passed through unmasked.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation { .. } => 1001,
            Self::InvalidCoordinate(_) => 1002,
            Self::InvalidPageSize(_) => 1003,
            Self::NotFound(_) => 2001,
            Self::InvalidTransition { .. } => 2002,
            Self::Unauthenticated => 2003,
            Self::PersistenceError(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::InvalidCoordinate(_) | Self::InvalidPageSize(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = match &self {
            Self::Validation { fields } => Some(fields.join(", ")),
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validation_lists_every_field() {
        let err = GatewayError::Validation {
            fields: vec!["title".to_string(), "description".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("title"));
        assert!(msg.contains("description"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_transition_maps_to_conflict() {
        let err = GatewayError::InvalidTransition {
            from: Status::Submitted,
            to: Status::InProgress,
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), 2002);
        assert!(err.to_string().contains("submitted"));
        assert!(err.to_string().contains("in_progress"));
    }

    #[test]
    fn unauthenticated_maps_to_401() {
        let err = GatewayError::Unauthenticated;
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
