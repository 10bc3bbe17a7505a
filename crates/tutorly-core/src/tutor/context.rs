//! Knowledge context for a question.

use std::collections::HashMap;

use tutorly_types::knowledge::{KnowledgeLevel, KnowledgeTier};

/// The user's level for each subject relevant to a question.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeContext {
    levels: Vec<(String, KnowledgeLevel)>,
}

impl KnowledgeContext {
    /// Look up a level for every relevant subject. Subjects without an
    /// entry in `known` default to `Novice`.
    pub fn new(relevant_subjects: &[String], known: &HashMap<String, KnowledgeLevel>) -> Self {
        let levels = relevant_subjects
            .iter()
            .map(|subject| {
                let level = known.get(subject).copied().unwrap_or_default();
                (subject.clone(), level)
            })
            .collect();
        Self { levels }
    }

    /// The least-informed subject gates verbosity for the whole answer.
    pub fn min_level(&self) -> KnowledgeLevel {
        KnowledgeLevel::least(self.levels.iter().map(|(_, level)| *level))
    }

    pub fn tier(&self) -> KnowledgeTier {
        self.min_level().tier()
    }

    /// One line per subject, in the order the subjects were given.
    pub fn describe(&self) -> String {
        self.levels
            .iter()
            .map(|(subject, level)| format!("For {subject}, the user has {level} knowledge level."))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
