//! Chat service for chat CRUD and manual message management.
//!
//! ChatService coordinates the ChatRepository and MessageRepository behind
//! the chat endpoints: creating and listing chats, tags, notes, titles,
//! message listing and creation, and clearing a chat's history.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::info;

use tutorly_types::chat::{Chat, ChatSummary, MessageContent, NewChat, NewMessage, StoredMessage};
use tutorly_types::error::StorageError;

use crate::chat::history::MessageHistory;
use crate::chat::repository::{ChatRepository, MessageRepository};

/// Shown as `lastMessage` for a chat without messages.
pub const NO_MESSAGES_YET: &str = "No messages yet";

/// Shown as `lastMessage` when the newest message has no text segment.
pub const NO_TEXT_CONTENT: &str = "No text content";

/// Tags that describe a knowledge level rather than a topic.
const KNOWLEDGE_LEVEL_TAGS: [&str; 4] = ["beginner", "intermediate", "advanced", "expert"];

/// Orchestrates chat lifecycle and message persistence.
///
/// Generic over the repository traits to keep tutorly-core free of any
/// infrastructure dependency.
#[derive(Clone)]
pub struct ChatService<C: ChatRepository, M: MessageRepository> {
    chat_repo: C,
    message_repo: M,
}

impl<C: ChatRepository, M: MessageRepository> ChatService<C, M> {
    pub fn new(chat_repo: C, message_repo: M) -> Self {
        Self {
            chat_repo,
            message_repo,
        }
    }

    // --- Chats ---

    pub async fn create_chat(&self, chat: NewChat) -> Result<Chat, StorageError> {
        let created = self.chat_repo.create_chat(&chat).await?;
        info!(chat_id = created.id, title = %created.title, "Chat created");
        Ok(created)
    }

    pub async fn get_chat(&self, chat_id: i64) -> Result<Option<Chat>, StorageError> {
        self.chat_repo.get_chat(chat_id).await
    }

    /// Like [`get_chat`](Self::get_chat) but a missing chat is an error.
    pub async fn require_chat(&self, chat_id: i64) -> Result<Chat, StorageError> {
        self.chat_repo
            .get_chat(chat_id)
            .await?
            .ok_or(StorageError::NotFound)
    }

    /// List chats, newest first, each with the text of its latest message.
    pub async fn list_chats(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatSummary>, StorageError> {
        let chats = self.chat_repo.list_chats(limit, offset).await?;
        let mut summaries = Vec::with_capacity(chats.len());
        for chat in chats {
            let last_message = match self.message_repo.latest_message(chat.id).await? {
                Some(message) if message.content.has_text() => message.content.plain_text(),
                Some(_) => NO_TEXT_CONTENT.to_string(),
                None => NO_MESSAGES_YET.to_string(),
            };
            summaries.push(ChatSummary {
                chat,
                last_message: Some(last_message),
            });
        }
        Ok(summaries)
    }

    /// Distinct tags across all chats, sorted, without knowledge-level tags.
    pub async fn list_tags(&self) -> Result<Vec<String>, StorageError> {
        let chats = self.chat_repo.list_chats(None, None).await?;
        let tags: BTreeSet<String> = chats
            .into_iter()
            .flat_map(|chat| chat.tags)
            .filter(|tag| {
                !tag.trim().is_empty()
                    && !KNOWLEDGE_LEVEL_TAGS.contains(&tag.to_lowercase().as_str())
            })
            .collect();
        Ok(tags.into_iter().collect())
    }

    pub async fn get_notes(&self, chat_id: i64) -> Result<Option<String>, StorageError> {
        Ok(self.require_chat(chat_id).await?.notes)
    }

    pub async fn update_notes(&self, chat_id: i64, notes: String) -> Result<Chat, StorageError> {
        let mut chat = self.require_chat(chat_id).await?;
        chat.notes = Some(notes);
        chat.updated_at = Utc::now();
        self.chat_repo.update_chat(&chat).await?;
        info!(chat_id, "Chat notes updated");
        Ok(chat)
    }

    pub async fn update_title(&self, chat_id: i64, title: String) -> Result<Chat, StorageError> {
        let mut chat = self.require_chat(chat_id).await?;
        chat.title = title;
        chat.updated_at = Utc::now();
        self.chat_repo.update_chat(&chat).await?;
        info!(chat_id, title = %chat.title, "Chat title updated");
        Ok(chat)
    }

    // --- Messages ---

    /// A page of a chat's messages, oldest first.
    pub async fn get_messages(
        &self,
        chat_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StoredMessage>, StorageError> {
        self.require_chat(chat_id).await?;
        self.message_repo.page_messages(chat_id, limit, offset).await
    }

    /// Store a manually authored message, rich segments included.
    ///
    /// Callers validate that `content` is not empty.
    pub async fn create_message(
        &self,
        chat_id: i64,
        content: MessageContent,
        is_bot: bool,
    ) -> Result<StoredMessage, StorageError> {
        self.require_chat(chat_id).await?;
        let message = NewMessage {
            chat_id,
            content,
            is_bot,
            created_at: Utc::now(),
        };
        self.message_repo.insert_message(&message).await
    }

    /// Delete every message of a chat.
    pub async fn clear_history(&self, chat_id: i64) -> Result<(), StorageError> {
        self.require_chat(chat_id).await?;
        let mut history = MessageHistory::new(chat_id, &self.message_repo);
        history.clear().await?;
        info!(chat_id, "Chat history cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStore;
    use tutorly_types::chat::Segment;

    fn service(store: &InMemoryStore) -> ChatService<InMemoryStore, InMemoryStore> {
        ChatService::new(store.clone(), store.clone())
    }

    fn new_chat(title: &str, tags: &[&str]) -> NewChat {
        NewChat {
            title: title.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_list_chats_includes_last_message() {
        let store = InMemoryStore::new();
        let chats = service(&store);
        let empty = chats.create_chat(new_chat("Empty", &[])).await.unwrap();
        let busy = chats.create_chat(new_chat("Busy", &[])).await.unwrap();
        store.seed_text(busy.id, "first", false);
        store.seed_text(busy.id, "latest", true);

        let summaries = chats.list_chats(None, None).await.unwrap();
        let find = |id: i64| {
            summaries
                .iter()
                .find(|s| s.chat.id == id)
                .and_then(|s| s.last_message.clone())
        };
        assert_eq!(find(busy.id).as_deref(), Some("latest"));
        assert_eq!(find(empty.id).as_deref(), Some(NO_MESSAGES_YET));
    }

    #[tokio::test]
    async fn test_last_message_without_text_segment() {
        let store = InMemoryStore::new();
        let chats = service(&store);
        let chat = chats.create_chat(new_chat("Video", &[])).await.unwrap();
        store.seed_content(
            chat.id,
            MessageContent::Segments(vec![Segment {
                kind: "video".to_string(),
                value: "abc".to_string(),
            }]),
            true,
        );
        let summaries = chats.list_chats(None, None).await.unwrap();
        assert_eq!(summaries[0].last_message.as_deref(), Some(NO_TEXT_CONTENT));
    }

    #[tokio::test]
    async fn test_list_tags_filters_levels_and_blanks() {
        let store = InMemoryStore::new();
        let chats = service(&store);
        chats
            .create_chat(new_chat("a", &["Physics", "Beginner", ""]))
            .await
            .unwrap();
        chats
            .create_chat(new_chat("b", &["Calculus", "physics", "Expert"]))
            .await
            .unwrap();

        let tags = chats.list_tags().await.unwrap();
        assert_eq!(tags, vec!["Calculus", "Physics", "physics"]);
    }

    #[tokio::test]
    async fn test_notes_and_title_updates() {
        let store = InMemoryStore::new();
        let chats = service(&store);
        let chat = chats.create_chat(new_chat("Draft", &[])).await.unwrap();

        assert_eq!(chats.get_notes(chat.id).await.unwrap(), None);
        chats
            .update_notes(chat.id, "# Vectors".to_string())
            .await
            .unwrap();
        assert_eq!(
            chats.get_notes(chat.id).await.unwrap().as_deref(),
            Some("# Vectors")
        );

        let renamed = chats
            .update_title(chat.id, "Vector Basics".to_string())
            .await
            .unwrap();
        assert_eq!(renamed.title, "Vector Basics");
        assert!(renamed.updated_at >= chat.updated_at);
    }

    #[tokio::test]
    async fn test_missing_chat_is_not_found() {
        let store = InMemoryStore::new();
        let chats = service(&store);
        assert!(matches!(
            chats.update_title(99, "x".to_string()).await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            chats.get_messages(99, 50, 0).await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            chats
                .create_message(99, MessageContent::text("hi"), false)
                .await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_create_message_keeps_rich_segments() {
        let store = InMemoryStore::new();
        let chats = service(&store);
        let chat = chats.create_chat(new_chat("Rich", &[])).await.unwrap();
        let content = MessageContent::Segments(vec![
            Segment::text("Here is the formula"),
            Segment {
                kind: "math".to_string(),
                value: "f(x) = ax^2".to_string(),
            },
        ]);

        let stored = chats
            .create_message(chat.id, content.clone(), true)
            .await
            .unwrap();
        assert_eq!(stored.content, content);

        let page = chats.get_messages(chat.id, 50, 0).await.unwrap();
        assert_eq!(page.len(), 1);
        assert!(page[0].is_bot);
    }

    #[tokio::test]
    async fn test_clear_history_empties_chat() {
        let store = InMemoryStore::new();
        let chats = service(&store);
        let chat = chats.create_chat(new_chat("Clear me", &[])).await.unwrap();
        store.seed_text(chat.id, "q", false);
        store.seed_text(chat.id, "a", true);

        chats.clear_history(chat.id).await.unwrap();
        assert!(chats.get_messages(chat.id, 50, 0).await.unwrap().is_empty());
        assert!(chats.get_chat(chat.id).await.unwrap().is_some());
    }
}
