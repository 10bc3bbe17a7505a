//! Business logic and repository trait definitions for Tutorly.
//!
//! This crate defines the "ports" (repository and LLM provider traits) that the
//! infrastructure layer implements, plus the tutoring pipeline built on them:
//! message history, response sanitizing and stream assembly, the reply
//! orchestrator, and taxonomy classification / seeding. It depends only on
//! `tutorly-types` -- never on `tutorly-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod response;
pub mod taxonomy;
pub mod tutor;

#[cfg(test)]
pub(crate) mod testing;
