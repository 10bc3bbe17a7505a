//! Chat CRUD HTTP handlers.
//!
//! Endpoints:
//! - GET    /chats/                 - List chats with their latest message
//! - POST   /chats/                 - Create a chat
//! - GET    /chats/{id}/messages/   - Page through a chat's messages
//! - DELETE /chats/{id}/messages/   - Clear a chat's history
//! - GET    /tags/                  - Distinct tags across all chats
//! - GET    /chats/{id}/notes       - Read a chat's notes
//! - PUT    /chats/{id}/notes       - Replace a chat's notes
//! - PUT    /chats/{id}/title       - Rename a chat

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use tutorly_types::chat::{Chat, ChatSummary, NewChat, StoredMessage};

use crate::http::error::AppError;
use crate::state::AppState;

use super::require_text;

/// Query parameters for chat listing.
#[derive(Debug, Deserialize)]
pub struct ChatListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_chat_limit")]
    pub limit: i64,
}

fn default_chat_limit() -> i64 {
    10
}

/// Query parameters for message listing.
#[derive(Debug, Deserialize)]
pub struct MessageListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_message_limit")]
    pub limit: i64,
}

fn default_message_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct NotesQuery {
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleUpdate {
    pub title: String,
}

fn check_paging(skip: i64, limit: i64) -> Result<(), AppError> {
    if skip < 0 || limit < 0 {
        return Err(AppError::Validation(
            "skip and limit must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn success() -> Json<Value> {
    Json(json!({ "status": "success" }))
}

/// GET /chats/ - List chats, newest first.
pub async fn list_chats(
    State(state): State<AppState>,
    Query(query): Query<ChatListQuery>,
) -> Result<Json<Vec<ChatSummary>>, AppError> {
    check_paging(query.skip, query.limit)?;
    let chats = state
        .chat_service
        .list_chats(Some(query.limit), Some(query.skip))
        .await?;
    Ok(Json(chats))
}

/// POST /chats/ - Create a chat.
pub async fn create_chat(
    State(state): State<AppState>,
    Json(body): Json<NewChat>,
) -> Result<Json<ChatSummary>, AppError> {
    require_text("title", &body.title)?;
    let chat = state.chat_service.create_chat(body).await?;
    Ok(Json(ChatSummary {
        chat,
        last_message: None,
    }))
}

/// GET /chats/{id}/messages/ - A page of messages, oldest first.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
    Query(query): Query<MessageListQuery>,
) -> Result<Json<Vec<StoredMessage>>, AppError> {
    check_paging(query.skip, query.limit)?;
    let messages = state
        .chat_service
        .get_messages(chat_id, query.limit, query.skip)
        .await?;
    Ok(Json(messages))
}

/// DELETE /chats/{id}/messages/ - Delete every message of a chat.
pub async fn clear_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    // Wait for an in-flight reply so it cannot land after the clear.
    let _guard = state.tutor_service.locks().acquire(chat_id).await;
    state.chat_service.clear_history(chat_id).await?;
    Ok(success())
}

/// GET /tags/ - Sorted distinct tags.
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.chat_service.list_tags().await?))
}

/// GET /chats/{id}/notes
pub async fn get_notes(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let notes = state.chat_service.get_notes(chat_id).await?;
    Ok(Json(json!({ "notes": notes })))
}

/// PUT /chats/{id}/notes?notes=...
pub async fn update_notes(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
    Query(query): Query<NotesQuery>,
) -> Result<Json<Value>, AppError> {
    state.chat_service.update_notes(chat_id, query.notes).await?;
    Ok(success())
}

/// PUT /chats/{id}/title
pub async fn update_title(
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
    Json(body): Json<TitleUpdate>,
) -> Result<Json<Chat>, AppError> {
    require_text("title", &body.title)?;
    let chat = state
        .chat_service
        .update_title(chat_id, body.title.trim().to_string())
        .await?;
    Ok(Json(chat))
}
