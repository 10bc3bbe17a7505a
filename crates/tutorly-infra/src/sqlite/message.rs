//! SQLite message repository implementation.
//!
//! Message content is stored as JSON text (`[{"type": "text", "value": ...}]`).
//! Rows that do not decode as segments are surfaced verbatim rather than
//! rejected, so older or hand-edited rows stay readable.

use sqlx::Row;

use tutorly_core::chat::repository::MessageRepository;
use tutorly_types::chat::{MessageContent, NewMessage, StoredMessage};
use tutorly_types::error::StorageError;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `MessageRepository`.
#[derive(Clone)]
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct MessageRow {
    id: i64,
    chat_id: i64,
    content: String,
    is_bot: bool,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            content: row.try_get("content")?,
            is_bot: row.try_get("is_bot")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<StoredMessage, StorageError> {
        Ok(StoredMessage {
            id: self.id,
            chat_id: self.chat_id,
            content: MessageContent::from_json_str(&self.content),
            is_bot: self.is_bot,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn into_messages(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<StoredMessage>, StorageError> {
    let mut messages = Vec::with_capacity(rows.len());
    for row in rows {
        let msg_row = MessageRow::from_row(row).map_err(query_error)?;
        messages.push(msg_row.into_message()?);
    }
    Ok(messages)
}

impl MessageRepository for SqliteMessageRepository {
    async fn list_messages(&self, chat_id: i64) -> Result<Vec<StoredMessage>, StorageError> {
        let rows = sqlx::query(
            "SELECT * FROM messages WHERE chat_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        into_messages(&rows)
    }

    async fn page_messages(
        &self,
        chat_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StoredMessage>, StorageError> {
        let rows = sqlx::query(
            r#"SELECT * FROM messages WHERE chat_id = ?
               ORDER BY created_at ASC, id ASC
               LIMIT ? OFFSET ?"#,
        )
        .bind(chat_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        into_messages(&rows)
    }

    async fn latest_message(&self, chat_id: i64) -> Result<Option<StoredMessage>, StorageError> {
        let row = sqlx::query(
            "SELECT * FROM messages WHERE chat_id = ? ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(chat_id)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_error)?;

        match row {
            Some(row) => {
                let msg_row = MessageRow::from_row(&row).map_err(query_error)?;
                Ok(Some(msg_row.into_message()?))
            }
            None => Ok(None),
        }
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<StoredMessage, StorageError> {
        let result = sqlx::query(
            r#"INSERT INTO messages (chat_id, content, is_bot, created_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(message.chat_id)
        .bind(message.content.to_json_string())
        .bind(message.is_bot)
        .bind(format_datetime(&message.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(StoredMessage {
            id: result.last_insert_rowid(),
            chat_id: message.chat_id,
            content: message.content.clone(),
            is_bot: message.is_bot,
            created_at: message.created_at,
        })
    }

    async fn delete_messages(&self, chat_id: i64) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM messages WHERE chat_id = ?")
            .bind(chat_id)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected())
    }
}
