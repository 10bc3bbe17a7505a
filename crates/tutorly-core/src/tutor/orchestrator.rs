//! Tutoring reply orchestration.
//!
//! `TutorService` builds the knowledge-adapted prompt, replays the chat's
//! prior turns as conversation memory, calls the model (blocking or
//! streaming) and persists both sides of the exchange. Failures never reach
//! the caller as errors: they become [`APOLOGY_MESSAGE`].

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tracing::{debug, info, warn};

use tutorly_types::error::StorageError;
use tutorly_types::knowledge::KnowledgeLevel;
use tutorly_types::llm::{CompletionRequest, LlmError, Message, StopReason, StreamEvent};

use crate::chat::history::MessageHistory;
use crate::chat::repository::MessageRepository;
use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::settings::ModelSettings;
use crate::response::assembler::StreamAssembler;
use crate::response::sanitizer;

use super::context::KnowledgeContext;
use super::guard::ChatLocks;
use super::prompt::render_tutor_prompt;

/// The only text a user ever sees when generation fails.
pub const APOLOGY_MESSAGE: &str =
    "I apologize, but I encountered an error processing your question. Please try again.";

/// Errors inside a generation. Converted to [`APOLOGY_MESSAGE`] before they
/// leave this module's public functions.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("model error: {0}")]
    Model(#[from] LlmError),
}

/// Input for one tutoring reply.
#[derive(Debug, Clone)]
pub struct ReplyRequest {
    pub chat_id: i64,
    pub question: String,
    pub relevant_subjects: Vec<String>,
    pub subject_knowledge: HashMap<String, KnowledgeLevel>,
}

/// Produces tutoring replies for chats.
#[derive(Clone)]
pub struct TutorService {
    provider: Arc<BoxLlmProvider>,
    settings: ModelSettings,
    locks: ChatLocks,
}

impl TutorService {
    pub fn new(provider: Arc<BoxLlmProvider>, settings: ModelSettings) -> Self {
        Self {
            provider,
            settings,
            locks: ChatLocks::new(),
        }
    }

    pub fn locks(&self) -> &ChatLocks {
        &self.locks
    }

    /// Generate the full answer in one call.
    ///
    /// The question is persisted before the model is called. On success the
    /// sanitized answer is persisted and returned; on any failure the
    /// apology is returned and no assistant turn is written.
    #[tracing::instrument(skip(self, repo, request), fields(chat_id = request.chat_id))]
    pub async fn generate_reply<R: MessageRepository>(
        &self,
        repo: &R,
        request: ReplyRequest,
    ) -> String {
        match self.try_generate(repo, &request).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(chat_id = request.chat_id, error = %e, "Reply generation failed");
                APOLOGY_MESSAGE.to_string()
            }
        }
    }

    async fn try_generate<R: MessageRepository>(
        &self,
        repo: &R,
        request: &ReplyRequest,
    ) -> Result<String, GenerationError> {
        let _guard = self.locks.acquire(request.chat_id).await;
        let mut history = MessageHistory::new(request.chat_id, repo);

        let completion = prepare(&self.settings, &mut history, request, false).await?;
        history.add_user_text(&request.question).await?;

        let response = self.provider.complete(&completion).await?;
        if response.stop_reason == StopReason::ContentFilter {
            return Err(content_filtered().into());
        }
        debug!(
            chat_id = request.chat_id,
            output_tokens = response.usage.output_tokens,
            "Model reply received"
        );

        history.add_assistant_text(&response.content).await?;
        info!(chat_id = request.chat_id, "Reply persisted");
        Ok(sanitizer::sanitize(&response.content))
    }

    /// Stream the answer as cleanly spaced chunks.
    ///
    /// Chunks already sent stay sent. On failure the apology arrives as the
    /// final chunk and no assistant turn is written. Dropping the stream
    /// releases the model connection and the chat guard without persisting
    /// a partial answer.
    pub fn stream_reply<R>(
        &self,
        repo: R,
        request: ReplyRequest,
    ) -> impl Stream<Item = String> + Send + 'static
    where
        R: MessageRepository + 'static,
    {
        let provider = Arc::clone(&self.provider);
        let settings = self.settings.clone();
        let locks = self.locks.clone();

        async_stream::stream! {
            let chat_id = request.chat_id;
            let _guard = locks.acquire(chat_id).await;
            let mut history = MessageHistory::new(chat_id, &repo);

            let prepared = match prepare(&settings, &mut history, &request, true).await {
                Ok(completion) => history
                    .add_user_text(&request.question)
                    .await
                    .map(|()| completion)
                    .map_err(GenerationError::from),
                Err(e) => Err(e),
            };
            let completion = match prepared {
                Ok(completion) => completion,
                Err(e) => {
                    warn!(chat_id, error = %e, "Streaming reply setup failed");
                    yield APOLOGY_MESSAGE.to_string();
                    return;
                }
            };

            let mut events = provider.stream(completion);
            let mut assembler = StreamAssembler::new();
            let mut emitted = false;
            let mut failure: Option<GenerationError> = None;

            while let Some(event) = events.next().await {
                match event {
                    Ok(StreamEvent::TextDelta { text }) => {
                        for chunk in assembler.push(&text) {
                            emitted = true;
                            yield chunk;
                        }
                    }
                    Ok(StreamEvent::Done) => break,
                    Ok(StreamEvent::MessageDelta {
                        stop_reason: StopReason::ContentFilter,
                    }) => {
                        failure = Some(content_filtered().into());
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        failure = Some(e.into());
                        break;
                    }
                }
            }
            drop(events);

            if let Some(e) = failure {
                warn!(chat_id, error = %e, "Model stream failed");
                yield apology_chunk(emitted);
                return;
            }

            let (tail, full_response) = assembler.finish();
            if let Some(tail) = tail {
                emitted = true;
                yield tail;
            }

            match history.add_assistant_text(&full_response).await {
                Ok(()) => info!(chat_id, "Streamed reply persisted"),
                Err(e) => {
                    warn!(chat_id, error = %e, "Persisting streamed reply failed");
                    yield apology_chunk(emitted);
                }
            }
        }
    }
}

/// Build the completion request: prior turns, then the rendered prompt.
async fn prepare<R: MessageRepository>(
    settings: &ModelSettings,
    history: &mut MessageHistory<'_, R>,
    request: &ReplyRequest,
    stream: bool,
) -> Result<CompletionRequest, GenerationError> {
    let context = KnowledgeContext::new(&request.relevant_subjects, &request.subject_knowledge);
    let prompt = render_tutor_prompt(&context, &request.question);

    let mut messages: Vec<Message> = history
        .turns()
        .await?
        .iter()
        .map(|turn| Message {
            role: turn.role.into(),
            content: turn.text.clone(),
        })
        .collect();
    messages.push(Message::user(prompt));

    debug!(
        chat_id = request.chat_id,
        prior_turns = messages.len() - 1,
        level = %context.min_level(),
        "Prepared tutoring request"
    );
    Ok(settings.request(messages, stream))
}

/// A reply cut short by the provider's content filter is never stored as an answer.
fn content_filtered() -> LlmError {
    LlmError::Provider {
        message: "reply stopped by content filter".to_string(),
    }
}

fn apology_chunk(after_output: bool) -> String {
    if after_output {
        format!("\n\n{APOLOGY_MESSAGE}")
    } else {
        APOLOGY_MESSAGE.to_string()
    }
}
