//! Manual message creation.
//!
//! POST /messages/ stores a message authored outside the tutor loop, such as
//! a rich segment list (text, math, video) composed by the frontend.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use tutorly_types::chat::{MessageContent, StoredMessage};

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub chat_id: i64,
    pub content: MessageContent,
    #[serde(default)]
    pub is_bot: bool,
}

/// POST /messages/ - Store a message in an existing chat.
pub async fn create_message(
    State(state): State<AppState>,
    Json(body): Json<CreateMessageRequest>,
) -> Result<Json<StoredMessage>, AppError> {
    if !body.content.has_text() {
        return Err(AppError::Validation(
            "content must be a list of {type, value} segments with at least one text segment"
                .to_string(),
        ));
    }

    let _guard = state.tutor_service.locks().acquire(body.chat_id).await;
    let message = state
        .chat_service
        .create_message(body.chat_id, body.content, body.is_bot)
        .await?;
    tracing::debug!(chat_id = message.chat_id, message_id = message.id, "Message created");
    Ok(Json(message))
}
