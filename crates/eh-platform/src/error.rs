//! Platform Error Types

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::api::common::ApiError;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Duplicate entity: {entity_type} with {field}={value}")]
    Duplicate { entity_type: String, field: String, value: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authorization error: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store operation timed out: {operation}")]
    Timeout { operation: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Coarse failure classes surfaced to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Forbidden,
    Conflict,
    Unauthorized,
    /// Storage timeout or I/O failure
    Transient,
    Internal,
}

impl PlatformError {
    pub fn not_found(entity_type: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn duplicate(entity_type: impl Into<String>, field: impl Into<String>, value: impl ToString) -> Self {
        Self::Duplicate {
            entity_type: entity_type.into(),
            field: field.into(),
            value: value.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken { message: message.into() }
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout { operation: operation.into() }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Duplicate { .. } => ErrorKind::Conflict,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Unauthorized { .. } | Self::InvalidCredentials | Self::InvalidToken { .. } => {
                ErrorKind::Unauthorized
            }
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Database(_) | Self::Timeout { .. } => ErrorKind::Transient,
            Self::Configuration { .. } | Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// True when the underlying sqlx error is a UNIQUE constraint violation.
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
    }

    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Transient => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Transient => "SERVICE_UNAVAILABLE",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// Client-facing message. Storage and internal details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Invalid email or password".to_string(),
            Self::InvalidToken { .. } => "Invalid or expired token".to_string(),
            Self::Duplicate { entity_type, .. } => format!("{} already exists", entity_type),
            Self::Database(_) | Self::Timeout { .. } => {
                "Storage is temporarily unavailable".to_string()
            }
            Self::Configuration { .. } | Self::Internal { .. } => "Something went wrong".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        match self.kind() {
            ErrorKind::Transient | ErrorKind::Internal => error!(error = %self, "Request failed"),
            _ => {}
        }

        let body = ApiError {
            error: self.error_code().to_string(),
            message: self.public_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for PlatformError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for PlatformError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;
