//! Turning raw model output into clean answer text.
//!
//! - `sanitizer`: total function from a raw model reply to its canonical answer
//! - `assembler`: online re-chunking of streamed fragments into readable text

pub mod assembler;
pub mod sanitizer;
