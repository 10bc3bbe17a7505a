//! Subject outline seeding.
//!
//! Subjects start out as bare names. `SubjectSeeder::run` finds every subject
//! without topics, asks the model for a textbook outline, validates its shape
//! and stores the chapters as topics and their subtopics in one transaction.
//! Running it again only touches subjects that are still empty, so it is safe
//! to call from a periodic scheduler.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use tutorly_types::error::TaxonomyError;
use tutorly_types::taxonomy::{ChapterOutline, SeedOutcome, Subject, SubjectOutline, SubtopicEntry};

use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::settings::ModelSettings;

use super::parse_json_reply;
use super::prompts::render_outline;
use super::repository::TaxonomyRepository;

/// Batch job filling empty subjects with generated outlines.
pub struct SubjectSeeder<T: TaxonomyRepository> {
    repo: T,
    provider: Arc<BoxLlmProvider>,
    settings: ModelSettings,
    configured_subjects: Vec<String>,
}

impl<T: TaxonomyRepository> SubjectSeeder<T> {
    pub fn new(repo: T, provider: Arc<BoxLlmProvider>, settings: ModelSettings) -> Self {
        Self {
            repo,
            provider,
            settings,
            configured_subjects: Vec::new(),
        }
    }

    /// Subject names inserted (if missing) at the start of every run.
    pub fn with_subjects(mut self, subjects: Vec<String>) -> Self {
        self.configured_subjects = subjects;
        self
    }

    /// Seed every subject that has no topics yet.
    ///
    /// Per-subject failures are reported in the outcomes; only failing to
    /// read the subject list aborts the run.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self) -> Result<Vec<SeedOutcome>, TaxonomyError> {
        for name in &self.configured_subjects {
            let name = name.trim();
            if !name.is_empty() {
                self.repo.ensure_subject(name).await?;
            }
        }

        let empty = self.repo.subjects_without_topics().await?;
        info!(subjects = empty.len(), "Seeding subjects without topics");

        let mut outcomes = Vec::with_capacity(empty.len());
        for subject in empty {
            let outcome = match self.seed_subject(&subject).await {
                Ok(outline) => {
                    info!(
                        subject = %subject.name,
                        chapters = outline.chapters.len(),
                        subtopics = outline.subtopic_count(),
                        "Subject seeded"
                    );
                    SeedOutcome::succeeded(&subject.name)
                }
                Err(e) => {
                    warn!(subject = %subject.name, error = %e, "Seeding subject failed");
                    SeedOutcome::failed(&subject.name, e.to_string())
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn seed_subject(&self, subject: &Subject) -> Result<SubjectOutline, TaxonomyError> {
        let request = self.settings.prompt(render_outline(&subject.name));
        let response = self.provider.complete(&request).await?;
        let outline = parse_outline(&subject.name, &response.content)?;
        self.repo.insert_outline(subject.id, &outline).await?;
        Ok(outline)
    }
}

/// Parse and validate a model-generated outline for `subject`.
///
/// Expected shape: `{subject: {chapter: {"subtopics": [{"subtopic", "difficulty"}], "difficulty"}}}`
/// with every difficulty in `[0, 1]`.
pub fn parse_outline(subject: &str, raw: &str) -> Result<SubjectOutline, TaxonomyError> {
    let invalid = |reason: String| TaxonomyError::InvalidOutline(reason);

    let root: Value =
        parse_json_reply(raw).ok_or_else(|| invalid("reply is not valid JSON".to_string()))?;
    let chapters = root
        .get(subject)
        .and_then(Value::as_object)
        .ok_or_else(|| invalid(format!("missing object for subject '{subject}'")))?;
    if chapters.is_empty() {
        return Err(invalid("outline has no chapters".to_string()));
    }

    let chapters = chapters
        .iter()
        .map(|(name, chapter)| parse_chapter(name, chapter))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SubjectOutline {
        subject: subject.to_string(),
        chapters,
    })
}

fn parse_chapter(name: &str, chapter: &Value) -> Result<ChapterOutline, TaxonomyError> {
    let invalid = |reason: String| TaxonomyError::InvalidOutline(format!("chapter '{name}': {reason}"));

    let fields: &Map<String, Value> = chapter
        .as_object()
        .ok_or_else(|| invalid("not an object".to_string()))?;
    let entries = fields
        .get("subtopics")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("missing subtopics list".to_string()))?;

    let difficulty = match fields.get("difficulty") {
        None | Some(Value::Null) => None,
        Some(value) => Some(difficulty_of(value).ok_or_else(|| invalid("bad difficulty".to_string()))?),
    };

    let subtopics = entries
        .iter()
        .map(|entry| {
            let subtopic = entry
                .get("subtopic")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| invalid("subtopic without a name".to_string()))?;
            let difficulty = entry
                .get("difficulty")
                .and_then(difficulty_of)
                .ok_or_else(|| invalid(format!("subtopic '{subtopic}' has a bad difficulty")))?;
            Ok(SubtopicEntry {
                subtopic: subtopic.to_string(),
                difficulty,
            })
        })
        .collect::<Result<Vec<_>, TaxonomyError>>()?;

    Ok(ChapterOutline {
        name: name.trim().to_string(),
        difficulty,
        subtopics,
    })
}

fn difficulty_of(value: &Value) -> Option<f64> {
    value.as_f64().filter(|d| (0.0..=1.0).contains(d))
}
