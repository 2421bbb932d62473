//! Common API types and request validation helpers

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{PlatformError, Result};

/// Standard API error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    pub error: String,
    pub message: String,
}

/// Require at least `min` characters after trimming.
pub fn require_min_chars(field: &str, value: &str, min: usize) -> Result<()> {
    if value.trim().chars().count() < min {
        return Err(PlatformError::validation(format!(
            "{} must be at least {} characters",
            field, min
        )));
    }
    Ok(())
}

/// Minimal structural email check: one `@`, non-empty local part, dotted domain.
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(PlatformError::validation("email must be a valid email address"))
    }
}
