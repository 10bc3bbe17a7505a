//! Streaming assembler.
//!
//! Model streams deliver arbitrary fragments: half words, several lines at
//! once, stray whitespace. `StreamAssembler` re-chunks them into complete
//! lines and sentences while keeping the untouched full response for storage.

use super::sanitizer::clean_line;

const SENTENCE_TERMINALS: [char; 5] = ['.', '!', '?', ':', ';'];

/// Single-pass re-chunker for streamed model output.
///
/// Every call to [`push`](Self::push) returns immediately with zero or more
/// chunks. No returned chunk is ever empty and source newlines are always
/// re-emitted.
#[derive(Debug, Default)]
pub struct StreamAssembler {
    buffer: String,
    previous_ended_with_space: bool,
    full_response: String,
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw fragment and collect the chunks it completes.
    pub fn push(&mut self, fragment: &str) -> Vec<String> {
        self.full_response.push_str(fragment);
        self.buffer.push_str(fragment);

        let mut chunks = Vec::new();

        if self.buffer.contains('\n') {
            let buffered = std::mem::take(&mut self.buffer);
            let mut lines: Vec<&str> = buffered.split('\n').collect();
            let remainder = lines.pop().unwrap_or_default();
            for line in lines {
                let mut chunk = clean_line(line);
                chunk.push('\n');
                chunks.push(chunk);
            }
            self.buffer = remainder.to_string();
            self.previous_ended_with_space = false;
        } else if self.buffer.trim_end().ends_with(SENTENCE_TERMINALS) {
            let buffered = std::mem::take(&mut self.buffer);
            if let Some(mut chunk) = self.spaced(&buffered) {
                chunk.push(' ');
                chunks.push(chunk);
                self.previous_ended_with_space = true;
            }
        }

        chunks
    }

    /// Flush whatever is still buffered and hand back the full raw response.
    pub fn finish(mut self) -> (Option<String>, String) {
        let buffered = std::mem::take(&mut self.buffer);
        let tail = self.spaced(&buffered);
        (tail, self.full_response)
    }

    /// The raw text received so far.
    pub fn full_response(&self) -> &str {
        &self.full_response
    }

    /// Clean `text` and apply the leading-space rule. `None` when nothing
    /// but whitespace remains.
    fn spaced(&self, text: &str) -> Option<String> {
        let cleaned = clean_line(text);
        if cleaned.is_empty() {
            return None;
        }
        if self.previous_ended_with_space || cleaned.starts_with(' ') {
            Some(cleaned)
        } else {
            Some(format!(" {cleaned}"))
        }
    }
}
