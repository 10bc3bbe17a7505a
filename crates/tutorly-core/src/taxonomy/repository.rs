//! TaxonomyRepository trait definition.

use tutorly_types::error::StorageError;
use tutorly_types::taxonomy::{Subject, SubjectOutline, Subtopic, Topic};

/// Repository trait for subjects, topics and subtopics.
///
/// Implementations live in tutorly-infra (e.g., `SqliteTaxonomyRepository`).
pub trait TaxonomyRepository: Send + Sync {
    /// All subjects, ordered by id.
    fn list_subjects(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Subject>, StorageError>> + Send;

    fn find_subject(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Option<Subject>, StorageError>> + Send;

    /// Return the subject named `name`, inserting it first if missing.
    fn ensure_subject(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Subject, StorageError>> + Send;

    /// Topics of a subject, in insertion order.
    fn list_topics(
        &self,
        subject_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Topic>, StorageError>> + Send;

    /// Subtopics of a topic, in insertion order.
    fn list_subtopics(
        &self,
        topic_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Subtopic>, StorageError>> + Send;

    /// Subjects that do not have a single topic yet.
    fn subjects_without_topics(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Subject>, StorageError>> + Send;

    /// Insert every chapter and subtopic of `outline` under `subject_id`.
    ///
    /// All rows are written in one transaction; on error nothing is kept.
    fn insert_outline(
        &self,
        subject_id: i64,
        outline: &SubjectOutline,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}
