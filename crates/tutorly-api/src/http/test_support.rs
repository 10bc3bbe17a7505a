//! Test fixtures for the HTTP layer: a scripted model and a throwaway state.

use std::pin::Pin;
use std::sync::{Arc, Mutex};

use futures_util::Stream;

use tutorly_core::llm::box_provider::BoxLlmProvider;
use tutorly_core::llm::provider::LlmProvider;
use tutorly_infra::sqlite::pool::{DatabasePool, database_url};
use tutorly_types::config::AppConfig;
use tutorly_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, StopReason, StreamEvent, Usage,
};

use crate::state::AppState;

pub type SentRequests = Arc<Mutex<Vec<CompletionRequest>>>;

/// Model double answering every request with the same text.
pub struct ScriptedModel {
    reply: Result<String, String>,
    sent: SentRequests,
}

impl ScriptedModel {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            sent: Arc::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            sent: Arc::default(),
        }
    }

    fn record(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.sent.lock().unwrap().push(request.clone());
        self.reply
            .clone()
            .map_err(|message| LlmError::Provider { message })
    }
}

impl LlmProvider for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let content = self.record(request)?;
        Ok(CompletionResponse {
            id: "scripted-1".to_string(),
            content,
            model: request.model.clone(),
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        })
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let events: Vec<Result<StreamEvent, LlmError>> = match self.record(&request) {
            Ok(text) => {
                let mut events = vec![Ok(StreamEvent::Connected)];
                events.extend(text.split_inclusive(' ').map(|piece| {
                    Ok(StreamEvent::TextDelta {
                        text: piece.to_string(),
                    })
                }));
                events.push(Ok(StreamEvent::Done));
                events
            }
            Err(e) => vec![Err(e)],
        };
        Box::pin(futures_util::stream::iter(events))
    }
}

/// State backed by a fresh SQLite database and `model`.
///
/// The configured seeding subjects are `["Physics"]`.
pub async fn test_state(model: ScriptedModel) -> (AppState, SentRequests) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("{}?mode=rwc", database_url(dir.path()));
    let data_dir = dir.path().to_path_buf();
    // Leak tempdir so it lives for the test
    std::mem::forget(dir);
    let pool = DatabasePool::new(&url).await.unwrap();

    let mut config = AppConfig::default();
    config.seeding.subjects = vec!["Physics".to_string()];

    let sent = Arc::clone(&model.sent);
    let provider = Arc::new(BoxLlmProvider::new(model));
    (AppState::from_parts(pool, provider, config, data_dir), sent)
}
