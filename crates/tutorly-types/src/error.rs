use thiserror::Error;

use crate::llm::LlmError;

/// Errors from persistence operations (used by the repository traits in tutorly-core).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from taxonomy classification and seeding.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("model error: {0}")]
    Model(#[from] LlmError),

    #[error("invalid outline: {0}")]
    InvalidOutline(String),

    #[error("subject '{0}' not found")]
    SubjectNotFound(String),

    #[error("nothing to classify against: {0}")]
    NoCandidates(String),
}
