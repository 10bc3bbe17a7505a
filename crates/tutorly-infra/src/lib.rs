//! Infrastructure layer for Tutorly.
//!
//! Contains implementations of the repository and provider traits defined in
//! `tutorly-core`: SQLite storage, the OpenAI-compatible model provider, and
//! the `config.toml` / data directory helpers.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod sqlite;
