//! Subject taxonomy types: subjects, topics, subtopics, and generated outlines.

use serde::{Deserialize, Serialize};

/// A top-level field of study. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
}

/// A chapter-level topic belonging to a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub subject_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtopic {
    pub id: i64,
    pub topic_id: i64,
    pub name: String,
}

/// A validated, model-generated table of contents for one subject.
///
/// Chapters keep the order the model produced them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectOutline {
    pub subject: String,
    pub chapters: Vec<ChapterOutline>,
}

impl SubjectOutline {
    pub fn subtopic_count(&self) -> usize {
        self.chapters.iter().map(|c| c.subtopics.len()).sum()
    }
}

/// One chapter of a [`SubjectOutline`]; becomes a [`Topic`] row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterOutline {
    pub name: String,
    /// Normalized difficulty in `[0, 1]`, when the model supplied one.
    pub difficulty: Option<f64>,
    pub subtopics: Vec<SubtopicEntry>,
}

/// One subtopic of a chapter; becomes a [`Subtopic`] row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtopicEntry {
    pub subtopic: String,
    pub difficulty: f64,
}

/// Per-subject result of a seeding run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedOutcome {
    pub subject: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SeedOutcome {
    pub fn succeeded(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(subject: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}
