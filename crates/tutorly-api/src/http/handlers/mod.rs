//! HTTP request handlers for the REST API.

pub mod chat;
pub mod generate;
pub mod message;
pub mod taxonomy;

use crate::http::error::AppError;

/// Reject blank required text fields with a 400.
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
