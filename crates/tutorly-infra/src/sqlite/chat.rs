//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `tutorly-core` using sqlx with split read/write pools:
//! raw queries, a private Row struct, reads on the reader pool and writes on the writer.

use sqlx::Row;

use tutorly_core::chat::repository::ChatRepository;
use tutorly_types::chat::{Chat, NewChat};
use tutorly_types::error::StorageError;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `ChatRepository`.
#[derive(Clone)]
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Chat.
struct ChatRow {
    id: i64,
    title: String,
    tags: String,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            tags: row.try_get("tags")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_chat(self) -> Result<Chat, StorageError> {
        let tags: Vec<String> = serde_json::from_str(&self.tags)
            .map_err(|e| StorageError::Query(format!("invalid tags for chat {}: {e}", self.id)))?;

        Ok(Chat {
            id: self.id,
            title: self.title,
            tags,
            notes: self.notes,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn encode_tags(tags: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(tags).map_err(|e| StorageError::Query(format!("invalid tags: {e}")))
}

/// Append `LIMIT`/`OFFSET` clauses. SQLite needs a LIMIT before any OFFSET.
pub(crate) fn push_paging(sql: &mut String, limit: Option<i64>, offset: Option<i64>) {
    if limit.is_none() && offset.is_none() {
        return;
    }
    sql.push_str(&format!(" LIMIT {}", limit.unwrap_or(-1)));
    if let Some(offset) = offset {
        sql.push_str(&format!(" OFFSET {offset}"));
    }
}

impl ChatRepository for SqliteChatRepository {
    async fn create_chat(&self, chat: &NewChat) -> Result<Chat, StorageError> {
        let now = chrono::Utc::now();
        let tags = encode_tags(&chat.tags)?;

        let result = sqlx::query(
            r#"INSERT INTO chats (title, tags, notes, created_at, updated_at)
               VALUES (?, ?, NULL, ?, ?)"#,
        )
        .bind(&chat.title)
        .bind(&tags)
        .bind(format_datetime(&now))
        .bind(format_datetime(&now))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(Chat {
            id: result.last_insert_rowid(),
            title: chat.title.clone(),
            tags: chat.tags.clone(),
            notes: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_chat(&self, chat_id: i64) -> Result<Option<Chat>, StorageError> {
        let row = sqlx::query("SELECT * FROM chats WHERE id = ?")
            .bind(chat_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let chat_row = ChatRow::from_row(&row).map_err(query_error)?;
                Ok(Some(chat_row.into_chat()?))
            }
            None => Ok(None),
        }
    }

    async fn list_chats(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Chat>, StorageError> {
        let mut sql = String::from("SELECT * FROM chats ORDER BY created_at DESC, id DESC");
        push_paging(&mut sql, limit, offset);

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let mut chats = Vec::with_capacity(rows.len());
        for row in &rows {
            let chat_row = ChatRow::from_row(row).map_err(query_error)?;
            chats.push(chat_row.into_chat()?);
        }

        Ok(chats)
    }

    async fn update_chat(&self, chat: &Chat) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"UPDATE chats
               SET title = ?, tags = ?, notes = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&chat.title)
        .bind(encode_tags(&chat.tags)?)
        .bind(&chat.notes)
        .bind(format_datetime(&chat.updated_at))
        .bind(chat.id)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
