//! Subject taxonomy, classification and title endpoints.
//!
//! Endpoints:
//! - GET  /subjects/              - All subjects
//! - GET  /subjects/{id}/topics/  - Topics of one subject (404 when none)
//! - POST /classify-subject/      - Subjects relevant to a question
//! - POST /classify-topic/        - Topics of a subject relevant to a question
//! - POST /generate-title/        - Short title for a question or conversation

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http::error::AppError;
use crate::state::AppState;

use super::require_text;

/// `{id, name}` view shared by subjects and topics.
#[derive(Debug, Serialize)]
pub struct NamedItem {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TitleResponse {
    pub text: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct ClassifySubjectRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifySubjectResponse {
    pub question: String,
    pub relevant_subjects: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClassifyTopicRequest {
    pub question: String,
    pub subject: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyTopicResponse {
    pub question: String,
    pub subject: String,
    pub relevant_topics: Vec<String>,
}

/// GET /subjects/
pub async fn list_subjects(State(state): State<AppState>) -> Result<Json<Vec<NamedItem>>, AppError> {
    let subjects = state.taxonomy_service.subjects().await?;
    Ok(Json(
        subjects
            .into_iter()
            .map(|s| NamedItem { id: s.id, name: s.name })
            .collect(),
    ))
}

/// GET /subjects/{id}/topics/
pub async fn list_topics(
    State(state): State<AppState>,
    Path(subject_id): Path<i64>,
) -> Result<Json<Vec<NamedItem>>, AppError> {
    let topics = state.taxonomy_service.topics(subject_id).await?;
    Ok(Json(
        topics
            .into_iter()
            .map(|t| NamedItem { id: t.id, name: t.name })
            .collect(),
    ))
}

/// POST /classify-subject/
pub async fn classify_subject(
    State(state): State<AppState>,
    Json(body): Json<ClassifySubjectRequest>,
) -> Result<Json<ClassifySubjectResponse>, AppError> {
    require_text("question", &body.question)?;
    let relevant_subjects = state
        .taxonomy_service
        .classify_subject(&body.question)
        .await?;
    Ok(Json(ClassifySubjectResponse {
        question: body.question,
        relevant_subjects,
    }))
}

/// POST /classify-topic/
pub async fn classify_topic(
    State(state): State<AppState>,
    Json(body): Json<ClassifyTopicRequest>,
) -> Result<Json<ClassifyTopicResponse>, AppError> {
    require_text("question", &body.question)?;
    require_text("subject", &body.subject)?;
    let relevant_topics = state
        .taxonomy_service
        .classify_topic(&body.question, &body.subject)
        .await?;
    Ok(Json(ClassifyTopicResponse {
        question: body.question,
        subject: body.subject,
        relevant_topics,
    }))
}

/// POST /generate-title/
pub async fn generate_title(
    State(state): State<AppState>,
    Json(body): Json<TitleRequest>,
) -> Result<Json<TitleResponse>, AppError> {
    require_text("text", &body.text)?;
    let title = state.taxonomy_service.generate_title(&body.text).await?;
    Ok(Json(TitleResponse {
        text: body.text,
        title,
    }))
}
