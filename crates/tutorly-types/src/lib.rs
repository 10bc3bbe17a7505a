//! Shared domain types for Tutorly.
//!
//! This crate contains the core domain types used across the Tutorly backend:
//! chats and stored messages, conversation turns, knowledge levels, the
//! subject taxonomy, LLM request/response shapes, configuration, and the
//! error types shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod llm;
pub mod taxonomy;
