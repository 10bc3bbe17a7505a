//! Taxonomy lookups and classification against stored subjects.

use tutorly_types::error::TaxonomyError;
use tutorly_types::taxonomy::{Subject, Topic};

use super::classifier::Classifier;
use super::repository::TaxonomyRepository;

/// Combines the taxonomy store with the model-backed classifier.
#[derive(Clone)]
pub struct TaxonomyService<T: TaxonomyRepository> {
    repo: T,
    classifier: Classifier,
}

impl<T: TaxonomyRepository> TaxonomyService<T> {
    pub fn new(repo: T, classifier: Classifier) -> Self {
        Self { repo, classifier }
    }

    pub async fn subjects(&self) -> Result<Vec<Subject>, TaxonomyError> {
        Ok(self.repo.list_subjects().await?)
    }

    /// Topics of a subject; a subject without topics is reported as such.
    pub async fn topics(&self, subject_id: i64) -> Result<Vec<Topic>, TaxonomyError> {
        let topics = self.repo.list_topics(subject_id).await?;
        if topics.is_empty() {
            return Err(TaxonomyError::NoCandidates(format!(
                "no topics found for subject {subject_id}"
            )));
        }
        Ok(topics)
    }

    /// Stored subjects relevant to `question`.
    pub async fn classify_subject(&self, question: &str) -> Result<Vec<String>, TaxonomyError> {
        let available: Vec<String> = self
            .repo
            .list_subjects()
            .await?
            .into_iter()
            .map(|s| s.name)
            .collect();
        if available.is_empty() {
            return Err(TaxonomyError::NoCandidates(
                "no subjects available".to_string(),
            ));
        }
        Ok(self.classifier.classify_subjects(question, &available).await)
    }

    /// Topics of the subject named `subject` relevant to `question`.
    pub async fn classify_topic(
        &self,
        question: &str,
        subject: &str,
    ) -> Result<Vec<String>, TaxonomyError> {
        let found = self
            .repo
            .find_subject(subject)
            .await?
            .ok_or_else(|| TaxonomyError::SubjectNotFound(subject.to_string()))?;
        let available: Vec<String> = self
            .repo
            .list_topics(found.id)
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect();
        if available.is_empty() {
            return Err(TaxonomyError::NoCandidates(format!(
                "no topics available for subject '{subject}'"
            )));
        }
        Ok(self
            .classifier
            .classify_topics(question, subject, &available)
            .await)
    }

    /// Subtopics of `topic_id` relevant to `question`.
    pub async fn classify_subtopic(
        &self,
        question: &str,
        subject: &str,
        topic_id: i64,
    ) -> Result<Vec<String>, TaxonomyError> {
        let available: Vec<String> = self
            .repo
            .list_subtopics(topic_id)
            .await?
            .into_iter()
            .map(|s| s.name)
            .collect();
        if available.is_empty() {
            return Err(TaxonomyError::NoCandidates(format!(
                "no subtopics available for topic {topic_id}"
            )));
        }
        Ok(self
            .classifier
            .classify_subtopics(question, subject, &available)
            .await)
    }

    pub async fn generate_title(&self, text: &str) -> Result<String, TaxonomyError> {
        self.classifier.generate_title(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::llm::box_provider::BoxLlmProvider;
    use crate::llm::settings::ModelSettings;
    use crate::testing::{InMemoryStore, ScriptedProvider};
    use tutorly_types::taxonomy::{ChapterOutline, SubjectOutline, SubtopicEntry};

    fn service(store: &InMemoryStore, reply: &str) -> TaxonomyService<InMemoryStore> {
        let classifier = Classifier::new(
            Arc::new(BoxLlmProvider::new(ScriptedProvider::replying(reply))),
            ModelSettings {
                model: "test-model".to_string(),
                temperature: 1.0,
                max_tokens: 64,
            },
        );
        TaxonomyService::new(store.clone(), classifier)
    }

    #[tokio::test]
    async fn test_classify_subject_without_subjects() {
        let store = InMemoryStore::new();
        let result = service(&store, "[]").classify_subject("q").await;
        assert!(matches!(result, Err(TaxonomyError::NoCandidates(_))));
    }

    #[tokio::test]
    async fn test_classify_subject_filters_to_stored() {
        let store = InMemoryStore::new();
        store.seed_subject("Physics");
        let chosen = service(&store, r#"["Physics", "Biology"]"#)
            .classify_subject("Why do things fall?")
            .await
            .unwrap();
        assert_eq!(chosen, vec!["Physics"]);
    }

    #[tokio::test]
    async fn test_classify_topic_unknown_subject() {
        let store = InMemoryStore::new();
        let result = service(&store, "[]").classify_topic("q", "Alchemy").await;
        assert!(matches!(result, Err(TaxonomyError::SubjectNotFound(name)) if name == "Alchemy"));
    }

    #[tokio::test]
    async fn test_classify_topic_and_subtopic() {
        let store = InMemoryStore::new();
        let physics = store.seed_subject("Physics");
        store
            .insert_outline(
                physics.id,
                &SubjectOutline {
                    subject: "Physics".to_string(),
                    chapters: vec![ChapterOutline {
                        name: "Kinematics".to_string(),
                        difficulty: Some(0.2),
                        subtopics: vec![SubtopicEntry {
                            subtopic: "Kinematics".to_string(),
                            difficulty: 0.2,
                        }],
                    }],
                },
            )
            .await
            .unwrap();

        let taxonomy = service(&store, r#"["Kinematics"]"#);
        assert_eq!(
            taxonomy.classify_topic("speed?", "Physics").await.unwrap(),
            vec!["Kinematics"]
        );

        let topic = &taxonomy.topics(physics.id).await.unwrap()[0];
        assert_eq!(
            taxonomy
                .classify_subtopic("speed?", "Physics", topic.id)
                .await
                .unwrap(),
            vec!["Kinematics"]
        );
    }

    #[tokio::test]
    async fn test_topics_of_empty_subject() {
        let store = InMemoryStore::new();
        let subject = store.seed_subject("Physics");
        assert!(matches!(
            service(&store, "[]").topics(subject.id).await,
            Err(TaxonomyError::NoCandidates(_))
        ));
    }
}
