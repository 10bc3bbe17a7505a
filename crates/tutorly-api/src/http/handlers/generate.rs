//! Tutoring reply endpoints.
//!
//! Endpoints:
//! - POST /generate-response/        - Full answer as `{"response": ...}`
//! - POST /generate-response/stream  - Answer streamed as a chunked `text/plain` body
//!
//! Both persist the question and the answer. Model failures are not HTTP
//! errors: the user receives the apology text instead.

use std::collections::HashMap;
use std::convert::Infallible;

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};

use tutorly_core::tutor::orchestrator::ReplyRequest;
use tutorly_types::knowledge::KnowledgeLevel;

use crate::http::error::AppError;
use crate::state::AppState;

use super::require_text;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub chat_id: i64,
    pub question: String,
    #[serde(default)]
    pub subjects: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub response: String,
}

/// Check the chat and the body, then build the orchestrator input.
///
/// Every requested subject is assumed to be known at an intermediate level.
async fn prepare(state: &AppState, body: GenerateRequest) -> Result<ReplyRequest, AppError> {
    state.chat_service.require_chat(body.chat_id).await?;
    require_text("question", &body.question)?;
    let subjects: Vec<String> = body
        .subjects
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if subjects.is_empty() {
        return Err(AppError::Validation(
            "at least one subject is required".to_string(),
        ));
    }

    let subject_knowledge: HashMap<String, KnowledgeLevel> = subjects
        .iter()
        .map(|s| (s.clone(), KnowledgeLevel::Intermediate))
        .collect();

    Ok(ReplyRequest {
        chat_id: body.chat_id,
        question: body.question,
        relevant_subjects: subjects,
        subject_knowledge,
    })
}

/// POST /generate-response/
pub async fn generate_response(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let request = prepare(&state, body).await?;
    let response = state
        .tutor_service
        .generate_reply(&state.message_repo, request)
        .await;
    Ok(Json(GenerateResponse { response }))
}

/// POST /generate-response/stream
///
/// Validation happens before the first byte is sent; after that, failures
/// show up as the apology chunk at the end of the body.
pub async fn generate_response_stream(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Result<Response, AppError> {
    let request = prepare(&state, body).await?;
    let chunks = state
        .tutor_service
        .stream_reply(state.message_repo.clone(), request)
        .map(Ok::<_, Infallible>);

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(chunks),
    )
        .into_response())
}
