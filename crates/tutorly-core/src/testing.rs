//! In-memory fakes for the repository and provider ports.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use futures_util::Stream;

use tutorly_types::chat::{Chat, MessageContent, NewChat, NewMessage, StoredMessage};
use tutorly_types::error::StorageError;
use tutorly_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, StopReason, StreamEvent, Usage,
};
use tutorly_types::taxonomy::{Subject, SubjectOutline, Subtopic, Topic};

use crate::chat::repository::{ChatRepository, MessageRepository};
use crate::llm::provider::LlmProvider;
use crate::taxonomy::repository::TaxonomyRepository;

#[derive(Default)]
struct StoreState {
    next_id: i64,
    chats: Vec<Chat>,
    messages: Vec<StoredMessage>,
    subjects: Vec<Subject>,
    topics: Vec<Topic>,
    subtopics: Vec<Subtopic>,
}

impl StoreState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared in-memory store implementing every repository trait.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    fail_inserts: Arc<AtomicBool>,
    fail_outlines: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every message insert fail with a query error.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Make every outline insert fail with a query error.
    pub fn fail_outlines(&self, fail: bool) {
        self.fail_outlines.store(fail, Ordering::SeqCst);
    }

    pub fn messages_for(&self, chat_id: i64) -> Vec<StoredMessage> {
        let state = self.state.lock().unwrap();
        let mut messages: Vec<_> = state
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| (m.created_at, m.id));
        messages
    }

    pub fn seed_text(&self, chat_id: i64, text: &str, is_bot: bool) {
        self.seed_content(chat_id, MessageContent::text(text), is_bot);
    }

    pub fn seed_content(&self, chat_id: i64, content: MessageContent, is_bot: bool) {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.messages.push(StoredMessage {
            id,
            chat_id,
            content,
            is_bot,
            created_at: Utc::now() - Duration::seconds(3600 - id),
        });
    }

    pub fn seed_subject(&self, name: &str) -> Subject {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let subject = Subject {
            id,
            name: name.to_string(),
        };
        state.subjects.push(subject.clone());
        subject
    }

    pub fn seed_topic(&self, subject_id: i64, name: &str) -> Topic {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let topic = Topic {
            id,
            subject_id,
            name: name.to_string(),
        };
        state.topics.push(topic.clone());
        topic
    }

    pub fn topics_for(&self, subject_id: i64) -> Vec<Topic> {
        let state = self.state.lock().unwrap();
        state
            .topics
            .iter()
            .filter(|t| t.subject_id == subject_id)
            .cloned()
            .collect()
    }

    pub fn subtopic_count(&self) -> usize {
        self.state.lock().unwrap().subtopics.len()
    }
}

impl ChatRepository for InMemoryStore {
    async fn create_chat(&self, chat: &NewChat) -> Result<Chat, StorageError> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let now = Utc::now();
        let created = Chat {
            id,
            title: chat.title.clone(),
            tags: chat.tags.clone(),
            notes: None,
            created_at: now,
            updated_at: now,
        };
        state.chats.push(created.clone());
        Ok(created)
    }

    async fn get_chat(&self, chat_id: i64) -> Result<Option<Chat>, StorageError> {
        let state = self.state.lock().unwrap();
        Ok(state.chats.iter().find(|c| c.id == chat_id).cloned())
    }

    async fn list_chats(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Chat>, StorageError> {
        let state = self.state.lock().unwrap();
        let mut chats = state.chats.clone();
        chats.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(chats
            .into_iter()
            .skip(offset.unwrap_or(0) as usize)
            .take(limit.unwrap_or(i64::MAX) as usize)
            .collect())
    }

    async fn update_chat(&self, chat: &Chat) -> Result<(), StorageError> {
        let mut state = self.state.lock().unwrap();
        let existing = state
            .chats
            .iter_mut()
            .find(|c| c.id == chat.id)
            .ok_or(StorageError::NotFound)?;
        *existing = chat.clone();
        Ok(())
    }
}

impl MessageRepository for InMemoryStore {
    async fn list_messages(&self, chat_id: i64) -> Result<Vec<StoredMessage>, StorageError> {
        Ok(self.messages_for(chat_id))
    }

    async fn page_messages(
        &self,
        chat_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StoredMessage>, StorageError> {
        Ok(self
            .messages_for(chat_id)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn latest_message(&self, chat_id: i64) -> Result<Option<StoredMessage>, StorageError> {
        Ok(self.messages_for(chat_id).pop())
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<StoredMessage, StorageError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StorageError::Query("insert rejected".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let stored = StoredMessage {
            id,
            chat_id: message.chat_id,
            content: message.content.clone(),
            is_bot: message.is_bot,
            created_at: message.created_at,
        };
        state.messages.push(stored.clone());
        Ok(stored)
    }

    async fn delete_messages(&self, chat_id: i64) -> Result<u64, StorageError> {
        let mut state = self.state.lock().unwrap();
        let before = state.messages.len();
        state.messages.retain(|m| m.chat_id != chat_id);
        Ok((before - state.messages.len()) as u64)
    }
}

impl TaxonomyRepository for InMemoryStore {
    async fn list_subjects(&self) -> Result<Vec<Subject>, StorageError> {
        Ok(self.state.lock().unwrap().subjects.clone())
    }

    async fn find_subject(&self, name: &str) -> Result<Option<Subject>, StorageError> {
        let state = self.state.lock().unwrap();
        Ok(state.subjects.iter().find(|s| s.name == name).cloned())
    }

    async fn ensure_subject(&self, name: &str) -> Result<Subject, StorageError> {
        if let Some(subject) = self.find_subject(name).await? {
            return Ok(subject);
        }
        Ok(self.seed_subject(name))
    }

    async fn list_topics(&self, subject_id: i64) -> Result<Vec<Topic>, StorageError> {
        Ok(self.topics_for(subject_id))
    }

    async fn list_subtopics(&self, topic_id: i64) -> Result<Vec<Subtopic>, StorageError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .subtopics
            .iter()
            .filter(|s| s.topic_id == topic_id)
            .cloned()
            .collect())
    }

    async fn subjects_without_topics(&self) -> Result<Vec<Subject>, StorageError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .subjects
            .iter()
            .filter(|s| !state.topics.iter().any(|t| t.subject_id == s.id))
            .cloned()
            .collect())
    }

    async fn insert_outline(
        &self,
        subject_id: i64,
        outline: &SubjectOutline,
    ) -> Result<(), StorageError> {
        if self.fail_outlines.load(Ordering::SeqCst) {
            return Err(StorageError::Query("outline rejected".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        for chapter in &outline.chapters {
            let topic_id = state.next_id();
            state.topics.push(Topic {
                id: topic_id,
                subject_id,
                name: chapter.name.clone(),
            });
            for entry in &chapter.subtopics {
                let id = state.next_id();
                state.subtopics.push(Subtopic {
                    id,
                    topic_id,
                    name: entry.subtopic.clone(),
                });
            }
        }
        Ok(())
    }
}

enum Script {
    Reply(String),
    Fail(String),
}

/// Provider replaying a fixed script and recording every request.
pub struct ScriptedProvider {
    complete: Script,
    stream: Vec<Script>,
    stop_reason: StopReason,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    /// `complete` returns `text`; `stream` yields it as one fragment.
    pub fn replying(text: &str) -> Self {
        Self {
            complete: Script::Reply(text.to_string()),
            stream: vec![Script::Reply(text.to_string())],
            stop_reason: StopReason::EndTurn,
            requests: Arc::default(),
        }
    }

    /// Both `complete` and `stream` fail immediately.
    pub fn failing(message: &str) -> Self {
        Self {
            complete: Script::Fail(message.to_string()),
            stream: vec![Script::Fail(message.to_string())],
            stop_reason: StopReason::EndTurn,
            requests: Arc::default(),
        }
    }

    /// `stream` yields `fragments` in order; `complete` returns them joined.
    pub fn streaming(fragments: Vec<&str>) -> Self {
        Self {
            complete: Script::Reply(fragments.concat()),
            stream: fragments
                .into_iter()
                .map(|f| Script::Reply(f.to_string()))
                .collect(),
            stop_reason: StopReason::EndTurn,
            requests: Arc::default(),
        }
    }

    /// `stream` yields `fragments` and then drops with a transport error.
    pub fn streaming_then_failing(fragments: Vec<&str>, message: &str) -> Self {
        let mut provider = Self::streaming(fragments);
        provider.stream.push(Script::Fail(message.to_string()));
        provider.complete = Script::Fail(message.to_string());
        provider
    }

    /// Stop reason reported by `complete` and at the end of `stream`.
    pub fn with_stop_reason(mut self, stop_reason: StopReason) -> Self {
        self.stop_reason = stop_reason;
        self
    }

    /// Handle on the requests this provider has received.
    pub fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.complete {
            Script::Reply(text) => Ok(CompletionResponse {
                id: "scripted-1".to_string(),
                content: text.clone(),
                model: request.model.clone(),
                stop_reason: self.stop_reason,
                usage: Usage::default(),
            }),
            Script::Fail(message) => Err(LlmError::Provider {
                message: message.clone(),
            }),
        }
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        self.requests.lock().unwrap().push(request);
        let mut events = vec![Ok(StreamEvent::Connected)];
        let mut failed = false;
        for step in &self.stream {
            match step {
                Script::Reply(text) => events.push(Ok(StreamEvent::TextDelta { text: text.clone() })),
                Script::Fail(message) => {
                    events.push(Err(LlmError::Stream(message.clone())));
                    failed = true;
                    break;
                }
            }
        }
        if !failed {
            events.push(Ok(StreamEvent::MessageDelta {
                stop_reason: self.stop_reason,
            }));
            events.push(Ok(StreamEvent::Done));
        }
        Box::pin(futures_util::stream::iter(events))
    }
}
