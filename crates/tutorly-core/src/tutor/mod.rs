//! Knowledge-adapted tutoring replies.
//!
//! - `context`: per-subject knowledge levels reduced to one answer tier
//! - `prompt`: the tutoring prompt template
//! - `guard`: one in-flight generation per chat
//! - `orchestrator`: `TutorService`, blocking and streaming replies

pub mod context;
pub mod guard;
pub mod orchestrator;
pub mod prompt;
