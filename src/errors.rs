//! Centralized error handling.
//!
//! One error type for the whole application, with automatic HTTP response
//! conversion. Import failures (`Encoding`, `MalformedRow`, `ReferenceNotFound`)
//! are reported to the uploader as 400s; the import itself has already been
//! rolled back by the time the error reaches the handler.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("{0} already exists")]
    Conflict(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Upload exceeds the limit of {0} bytes")]
    PayloadTooLarge(usize),

    // CSV import
    #[error("Cannot decode uploaded file: {0}")]
    Encoding(String),

    #[error("Malformed row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("Row {row} references unknown {entity} {id}")]
    ReferenceNotFound {
        row: usize,
        entity: &'static str,
        id: i32,
    },

    // External service errors
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::NotFound => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::Encoding(_) => "ENCODING_ERROR",
            AppError::MalformedRow { .. } => "MALFORMED_ROW",
            AppError::ReferenceNotFound { .. } => "REFERENCE_NOT_FOUND",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Jwt(_) => "AUTH_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::Jwt(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::Encoding(_)
            | AppError::MalformedRow { .. }
            | AppError::ReferenceNotFound { .. } => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Conflict(msg) => format!("{} already exists", msg),

            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Jwt(e) => {
                tracing::error!("JWT error: {:?}", e);
                "Invalid or expired token".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn malformed_row(row: usize, reason: impl Into<String>) -> Self {
        AppError::MalformedRow {
            row,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_errors_are_client_errors() {
        assert_eq!(
            AppError::Encoding("bad byte".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::malformed_row(2, "user is not an integer").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ReferenceNotFound { row: 3, entity: "user", id: 99 }.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_oversized_upload() {
        let err = AppError::PayloadTooLarge(1024);
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.user_message(), "Upload exceeds the limit of 1024 bytes");
    }

    #[test]
    fn test_import_error_messages() {
        let err = AppError::ReferenceNotFound { row: 3, entity: "user", id: 99 };
        assert_eq!(err.to_string(), "Row 3 references unknown user 99");

        let err = AppError::malformed_row(1, "missing field 'user'");
        assert_eq!(err.to_string(), "Malformed row 1: missing field 'user'");
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(None::<i32>.ok_or_not_found().unwrap_err().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::internal("connection refused on 10.0.0.3");
        assert_eq!(err.user_message(), "An internal error occurred");
    }
}
