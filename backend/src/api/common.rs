//! Shared API response envelope and error mapping.
//!
//! Every endpoint returns the same JSON envelope:
//! `{"error": false, "data": ...}` on success and
//! `{"error": true, "message": ...}` on failure.
//!
//! # Error Handling Flow
//! 1. Service layer returns a domain-specific `ServiceError`
//! 2. `service_error_to_http` converts it to a status and envelope
//! 3. Unexpected failures (database, mailer, internal) collapse to an opaque
//!    500; the original error is logged server-side only.

use crate::errors::ServiceError;
use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper for all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// True when the request failed
    pub error: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            error: false,
            data: Some(data),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ApiResponse {
            error: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Rejection type shared by handlers and middleware.
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

/// Converts a service error into an HTTP status and response envelope.
///
/// Storage and other unexpected errors never leak detail to the caller.
pub fn service_error_to_http(error: ServiceError) -> ApiError {
    match error {
        ServiceError::Validation { message } => {
            (StatusCode::BAD_REQUEST, Json(ApiResponse::failure(message)))
        }
        ServiceError::InvalidCredentials { message } => {
            (StatusCode::BAD_REQUEST, Json(ApiResponse::failure(message)))
        }
        ServiceError::NotFound { entity, identifier } => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::failure(format!(
                "{entity} not found: {identifier}"
            ))),
        ),
        ServiceError::AlreadyExists { entity, identifier } => (
            StatusCode::CONFLICT,
            Json(ApiResponse::failure(format!(
                "{entity} already exists: {identifier}"
            ))),
        ),
        ServiceError::NotVerified { message } => {
            (StatusCode::FORBIDDEN, Json(ApiResponse::failure(message)))
        }
        ServiceError::Unauthorized { message } => {
            (StatusCode::UNAUTHORIZED, Json(ApiResponse::failure(message)))
        }
        ServiceError::PermissionDenied { message } => {
            (StatusCode::FORBIDDEN, Json(ApiResponse::failure(message)))
        }
        ServiceError::Database { source } => {
            // The unique index on users.email is the real uniqueness guard;
            // a constraint violation that slipped past the app-level check
            // is a duplicate, not a server fault.
            if is_unique_violation(&source) {
                return (
                    StatusCode::CONFLICT,
                    Json(ApiResponse::failure("Conflict")),
                );
            }
            tracing::error!("Database error: {source:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failure("Internal server error")),
            )
        }
        ServiceError::ExternalService { message } => {
            tracing::error!("External service error: {message}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failure("Internal server error")),
            )
        }
        ServiceError::InternalError { message } => {
            tracing::error!("Internal error: {message}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failure("Internal server error")),
            )
        }
    }
}

fn is_unique_violation(source: &anyhow::Error) -> bool {
    source
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| match e {
            sqlx::Error::Database(db) => Some(db.is_unique_violation()),
            _ => None,
        })
        .unwrap_or(false)
}
