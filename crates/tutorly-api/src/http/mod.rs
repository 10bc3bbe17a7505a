//! HTTP/REST API layer for Tutorly.
//!
//! Axum-based REST API serving the tutoring frontend, with JSON error
//! envelopes and CORS support.

pub mod error;
pub mod handlers;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support;
