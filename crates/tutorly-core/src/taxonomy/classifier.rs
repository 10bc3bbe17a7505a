//! Question classification and title generation.
//!
//! Each call is a single one-shot prompt. Classification degrades to an
//! empty list when the model fails or replies with something unusable;
//! title generation reports the failure instead.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use tutorly_types::error::TaxonomyError;
use tutorly_types::llm::LlmError;

use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::settings::ModelSettings;

use super::parse_json_reply;
use super::prompts::{
    render_classification, render_title, SUBJECT_CLASSIFICATION_PROMPT,
    SUBTOPIC_CLASSIFICATION_PROMPT, TOPIC_CLASSIFICATION_PROMPT,
};

#[derive(Deserialize)]
struct TitleReply {
    title: String,
}

/// Model-backed classifier for questions.
#[derive(Clone)]
pub struct Classifier {
    provider: Arc<BoxLlmProvider>,
    settings: ModelSettings,
}

impl Classifier {
    pub fn new(provider: Arc<BoxLlmProvider>, settings: ModelSettings) -> Self {
        Self { provider, settings }
    }

    /// Subjects from `available` that are relevant to `question`.
    #[tracing::instrument(skip(self, available), fields(options = available.len()))]
    pub async fn classify_subjects(&self, question: &str, available: &[String]) -> Vec<String> {
        let prompt = render_classification(SUBJECT_CLASSIFICATION_PROMPT, question, "", available);
        self.pick(prompt, available).await
    }

    /// Topics of `subject` from `available` that are relevant to `question`.
    #[tracing::instrument(skip(self, available), fields(options = available.len()))]
    pub async fn classify_topics(
        &self,
        question: &str,
        subject: &str,
        available: &[String],
    ) -> Vec<String> {
        let prompt = render_classification(TOPIC_CLASSIFICATION_PROMPT, question, subject, available);
        self.pick(prompt, available).await
    }

    /// Subtopics of `subject` from `available` that are relevant to `question`.
    #[tracing::instrument(skip(self, available), fields(options = available.len()))]
    pub async fn classify_subtopics(
        &self,
        question: &str,
        subject: &str,
        available: &[String],
    ) -> Vec<String> {
        let prompt =
            render_classification(SUBTOPIC_CLASSIFICATION_PROMPT, question, subject, available);
        self.pick(prompt, available).await
    }

    /// A title of at most a few words for `text`.
    #[tracing::instrument(skip(self, text))]
    pub async fn generate_title(&self, text: &str) -> Result<String, TaxonomyError> {
        let raw = self.ask(render_title(text)).await?;
        let reply: TitleReply = parse_json_reply(&raw).ok_or_else(|| {
            LlmError::Deserialization(format!("title reply is not a JSON object: {raw}"))
        })?;
        let title = reply.title.trim().to_string();
        if title.is_empty() {
            return Err(LlmError::Deserialization("title reply was empty".to_string()).into());
        }
        debug!(title = %title, "Title generated");
        Ok(title)
    }

    /// Ask the model to choose from `available`; keep only listed names.
    async fn pick(&self, prompt: String, available: &[String]) -> Vec<String> {
        let raw = match self.ask(prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Classification request failed");
                return Vec::new();
            }
        };
        match parse_json_reply::<Vec<String>>(&raw) {
            Some(chosen) => chosen
                .into_iter()
                .filter(|name| available.contains(name))
                .collect(),
            None => {
                warn!(raw = %raw, "Classification reply was not a JSON array");
                Vec::new()
            }
        }
    }

    async fn ask(&self, prompt: String) -> Result<String, LlmError> {
        let request = self.settings.prompt(prompt);
        let response = self.provider.complete(&request).await?;
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;

    fn classifier(provider: ScriptedProvider) -> Classifier {
        Classifier::new(
            Arc::new(BoxLlmProvider::new(provider)),
            ModelSettings {
                model: "test-model".to_string(),
                temperature: 1.0,
                max_tokens: 128,
            },
        )
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_classify_subjects_keeps_only_available() {
        let provider = ScriptedProvider::replying("```json\n[\"Physics\", \"Astrology\"]\n```");
        let requests = provider.requests();
        let chosen = classifier(provider)
            .classify_subjects("Why do planets orbit?", &names(&["Physics", "Mathematics"]))
            .await;
        assert_eq!(chosen, vec!["Physics"]);

        let sent = requests.lock().unwrap();
        assert!(sent[0].messages[0]
            .content
            .contains("Available subjects: Physics, Mathematics"));
    }

    #[tokio::test]
    async fn test_classify_topics_on_garbage_is_empty() {
        let chosen = classifier(ScriptedProvider::replying("Vectors, probably"))
            .classify_topics("dot product?", "Linear Algebra", &names(&["Vectors"]))
            .await;
        assert!(chosen.is_empty());
    }

    #[tokio::test]
    async fn test_classify_subtopics_on_model_failure_is_empty() {
        let chosen = classifier(ScriptedProvider::failing("timeout"))
            .classify_subtopics("q", "Physics", &names(&["Velocity"]))
            .await;
        assert!(chosen.is_empty());
    }

    #[tokio::test]
    async fn test_generate_title_parses_quoted_json() {
        let title = classifier(ScriptedProvider::replying(
            "'{\"title\": \"Matrix Vector Multiplication\"}'",
        ))
        .generate_title("How do I multiply a matrix by a vector?")
        .await
        .unwrap();
        assert_eq!(title, "Matrix Vector Multiplication");
    }

    #[tokio::test]
    async fn test_generate_title_rejects_unusable_reply() {
        let result = classifier(ScriptedProvider::replying("Matrices"))
            .generate_title("text")
            .await;
        assert!(matches!(result, Err(TaxonomyError::Model(_))));
    }
}
