//! Per-chat message history used as conversation memory.
//!
//! `MessageHistory` is scoped to one `chat_id` and one repository handle for
//! the duration of a single generation call. It normalizes stored segment
//! content into plain turns on the way out, and wraps turns as a single text
//! segment on the way in.

use tracing::debug;

use tutorly_types::chat::{ConversationTurn, NewMessage, TurnRole};
use tutorly_types::error::StorageError;

use crate::chat::repository::MessageRepository;
use crate::response::sanitizer;

/// Cached view of the chat's turns.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryCache {
    Unloaded,
    Loaded(Vec<ConversationTurn>),
}

/// Message store adapter for one chat.
pub struct MessageHistory<'a, R: MessageRepository> {
    chat_id: i64,
    repo: &'a R,
    cache: HistoryCache,
}

impl<'a, R: MessageRepository> MessageHistory<'a, R> {
    pub fn new(chat_id: i64, repo: &'a R) -> Self {
        Self {
            chat_id,
            repo,
            cache: HistoryCache::Unloaded,
        }
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    pub fn cache(&self) -> &HistoryCache {
        &self.cache
    }

    /// Read the chat's turns from the store, oldest first.
    ///
    /// Always hits the store and refreshes the cache.
    pub async fn load_history(&mut self) -> Result<Vec<ConversationTurn>, StorageError> {
        let stored = self.repo.list_messages(self.chat_id).await?;
        let turns: Vec<ConversationTurn> = stored.iter().map(|m| m.to_turn()).collect();
        debug!(chat_id = self.chat_id, turns = turns.len(), "Loaded message history");
        self.cache = HistoryCache::Loaded(turns.clone());
        Ok(turns)
    }

    /// The chat's turns, loading them on first access.
    pub async fn turns(&mut self) -> Result<&[ConversationTurn], StorageError> {
        if matches!(self.cache, HistoryCache::Unloaded) {
            self.load_history().await?;
        }
        match &self.cache {
            HistoryCache::Loaded(turns) => Ok(turns.as_slice()),
            HistoryCache::Unloaded => Ok(&[][..]),
        }
    }

    /// Persist a turn, then record it in the cache.
    ///
    /// Assistant text is sanitized before it is written. If the write fails
    /// the cache is left exactly as it was.
    pub async fn append(&mut self, turn: ConversationTurn) -> Result<(), StorageError> {
        let turn = match turn.role {
            TurnRole::Assistant => ConversationTurn {
                text: sanitizer::sanitize(&turn.text),
                ..turn
            },
            TurnRole::User => turn,
        };

        let message = NewMessage::from_turn(self.chat_id, &turn);
        self.repo.insert_message(&message).await?;

        if let HistoryCache::Loaded(turns) = &mut self.cache {
            turns.push(turn);
        }
        Ok(())
    }

    pub async fn add_user_text(&mut self, text: &str) -> Result<(), StorageError> {
        self.append(ConversationTurn::user(text)).await
    }

    pub async fn add_assistant_text(&mut self, text: &str) -> Result<(), StorageError> {
        self.append(ConversationTurn::assistant(text)).await
    }

    /// Delete every stored message of the chat and empty the cache.
    pub async fn clear(&mut self) -> Result<(), StorageError> {
        let removed = self.repo.delete_messages(self.chat_id).await?;
        debug!(chat_id = self.chat_id, removed, "Cleared message history");
        self.cache = HistoryCache::Loaded(Vec::new());
        Ok(())
    }
}
