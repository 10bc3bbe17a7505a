//! ChatRepository and MessageRepository trait definitions.

use tutorly_types::chat::{Chat, NewChat, NewMessage, StoredMessage};
use tutorly_types::error::StorageError;

/// Repository trait for chat persistence.
///
/// Implementations live in tutorly-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// Create a new chat and return it with its assigned id.
    fn create_chat(
        &self,
        chat: &NewChat,
    ) -> impl std::future::Future<Output = Result<Chat, StorageError>> + Send;

    fn get_chat(
        &self,
        chat_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, StorageError>> + Send;

    /// List chats, newest first.
    fn list_chats(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<Chat>, StorageError>> + Send;

    /// Overwrite title, tags, notes and `updated_at` of an existing chat.
    ///
    /// Returns `StorageError::NotFound` if the chat does not exist.
    fn update_chat(
        &self,
        chat: &Chat,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}

/// Repository trait for the ordered message sequence of a chat.
pub trait MessageRepository: Send + Sync {
    /// All messages of a chat, ascending by `created_at` (ties broken by id).
    fn list_messages(
        &self,
        chat_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<StoredMessage>, StorageError>> + Send;

    /// A page of a chat's messages in the same order as `list_messages`.
    fn page_messages(
        &self,
        chat_id: i64,
        limit: i64,
        offset: i64,
    ) -> impl std::future::Future<Output = Result<Vec<StoredMessage>, StorageError>> + Send;

    /// The newest message of a chat, if any.
    fn latest_message(
        &self,
        chat_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<StoredMessage>, StorageError>> + Send;

    /// Insert a message and return the stored row.
    fn insert_message(
        &self,
        message: &NewMessage,
    ) -> impl std::future::Future<Output = Result<StoredMessage, StorageError>> + Send;

    /// Delete every message of a chat. Returns the number of rows removed.
    fn delete_messages(
        &self,
        chat_id: i64,
    ) -> impl std::future::Future<Output = Result<u64, StorageError>> + Send;
}
