//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Concurrency conflict: concurrent rating update detected")]
    ConcurrencyConflict,

    // Domain errors
    #[error(transparent)]
    Domain(#[from] crate::domain::DomainError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl From<crate::rating::RatingServiceError> for AppError {
    fn from(e: crate::rating::RatingServiceError) -> Self {
        use crate::rating::RatingServiceError;
        match e {
            RatingServiceError::MaxRetriesExceeded => AppError::ConcurrencyConflict,
            RatingServiceError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<crate::portfolio::PortfolioError> for AppError {
    fn from(e: crate::portfolio::PortfolioError) -> Self {
        use crate::portfolio::PortfolioError;
        match e {
            PortfolioError::Database(e) => AppError::Database(e),
            PortfolioError::Rating(e) => e.into(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::InvalidCredentials => {
                (StatusCode::BAD_REQUEST, "invalid_credentials", None)
            }
            AppError::UserAlreadyExists => {
                (StatusCode::BAD_REQUEST, "user_already_exists", None)
            }

            // 404 Not Found
            AppError::ProfileNotFound(email) => {
                (StatusCode::NOT_FOUND, "profile_not_found", Some(email.clone()))
            }
            AppError::UserNotFound(email) => {
                (StatusCode::NOT_FOUND, "user_not_found", Some(email.clone()))
            }

            // 409 Conflict (retryable)
            AppError::ConcurrencyConflict => {
                (StatusCode::CONFLICT, "concurrency_conflict", None)
            }

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(ref domain_err) => {
                use crate::domain::DomainError;
                match domain_err {
                    DomainError::InvalidRating(e) => {
                        (StatusCode::BAD_REQUEST, "invalid_rating", Some(e.to_string()))
                    }
                    DomainError::MissingField(field) => {
                        (StatusCode::BAD_REQUEST, "missing_field", Some(field.to_string()))
                    }
                }
            }

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
