//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::db::DatabaseError;
use crate::scheduling::SchedulingError;

/// Structured error response body. Callers display `message` verbatim.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Token has expired, please login again")]
    TokenExpired,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Doctor is not available for appointments")]
    DoctorUnavailable,
    #[error("This slot is already booked")]
    SlotConflict,
    #[error("Terminal status: {0}")]
    TerminalState(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                "Token has expired, please login again".to_string(),
            ),
            ApiError::Forbidden(detail) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", detail.clone())
            }
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", detail.clone())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::DoctorUnavailable => (
                StatusCode::BAD_REQUEST,
                "DOCTOR_UNAVAILABLE",
                "Doctor is not available for appointments".to_string(),
            ),
            ApiError::SlotConflict => (
                StatusCode::CONFLICT,
                "SLOT_CONFLICT",
                "This slot is already booked".to_string(),
            ),
            ApiError::TerminalState(detail) => {
                (StatusCode::CONFLICT, "TERMINAL_STATUS", detail.clone())
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            success: false,
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<SchedulingError> for ApiError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            SchedulingError::NotFound(entity) => ApiError::NotFound(format!("{entity} not found")),
            SchedulingError::DoctorUnavailable => ApiError::DoctorUnavailable,
            SchedulingError::SlotConflict => ApiError::SlotConflict,
            SchedulingError::TerminalState(status) => {
                ApiError::TerminalState(format!("Cannot change status of {status} appointments"))
            }
            SchedulingError::Forbidden(msg) => ApiError::Forbidden(msg.to_string()),
            SchedulingError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired => ApiError::TokenExpired,
            AuthError::InvalidToken => ApiError::Unauthorized,
            AuthError::Hash(e) => ApiError::Internal(e.to_string()),
        }
    }
}
