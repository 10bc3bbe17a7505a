//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use tutorly_types::error::{StorageError, TaxonomyError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Persistence errors.
    Storage(StorageError),
    /// Classification, title generation and seeding errors.
    Taxonomy(TaxonomyError),
    /// Validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        AppError::Storage(e)
    }
}

impl From<TaxonomyError> for AppError {
    fn from(e: TaxonomyError) -> Self {
        match e {
            TaxonomyError::Storage(inner) => AppError::Storage(inner),
            other => AppError::Taxonomy(other),
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Storage(StorageError::NotFound) => {
                (StatusCode::NOT_FOUND, "CHAT_NOT_FOUND", "Chat not found".to_string())
            }
            AppError::Storage(StorageError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CONFLICT", msg.clone())
            }
            AppError::Storage(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", e.to_string())
            }
            AppError::Taxonomy(TaxonomyError::SubjectNotFound(name)) => (
                StatusCode::NOT_FOUND,
                "SUBJECT_NOT_FOUND",
                format!("Subject '{name}' not found"),
            ),
            AppError::Taxonomy(TaxonomyError::NoCandidates(msg)) => {
                (StatusCode::NOT_FOUND, "NOTHING_TO_CLASSIFY", msg.clone())
            }
            AppError::Taxonomy(TaxonomyError::Model(e)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "MODEL_ERROR", e.to_string())
            }
            AppError::Taxonomy(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "TAXONOMY_ERROR", e.to_string())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, error = %message, "Request failed");
        }

        let body = json!({
            "data": null,
            "meta": {
                "timestamp": chrono::Utc::now().to_rfc3339(),
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
