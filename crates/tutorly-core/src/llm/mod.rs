//! LLM provider abstractions for Tutorly.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `ModelSettings`: model name and sampling knobs shared by every caller

pub mod box_provider;
pub mod provider;
pub mod settings;
