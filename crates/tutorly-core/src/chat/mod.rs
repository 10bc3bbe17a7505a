//! Chat and message persistence abstractions for Tutorly.
//!
//! This module defines the `ChatRepository` and `MessageRepository` traits
//! that the infrastructure layer implements, the per-chat `MessageHistory`
//! adapter used as conversation memory, and the `ChatService` behind the
//! chat CRUD endpoints.

pub mod history;
pub mod repository;
pub mod service;
