//! SQLite taxonomy repository implementation.
//!
//! Subjects own topics (textbook chapters) which own subtopics. Outlines are
//! written in a single transaction on the writer pool so a failed seeding run
//! never leaves a half-populated subject behind.

use sqlx::Row;

use tutorly_core::taxonomy::repository::TaxonomyRepository;
use tutorly_types::error::StorageError;
use tutorly_types::taxonomy::{Subject, SubjectOutline, Subtopic, Topic};

use super::pool::DatabasePool;
use super::query_error;

/// SQLite-backed implementation of `TaxonomyRepository`.
#[derive(Clone)]
pub struct SqliteTaxonomyRepository {
    pool: DatabasePool,
}

impl SqliteTaxonomyRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn subject_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Subject, sqlx::Error> {
    Ok(Subject {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

fn topic_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Topic, sqlx::Error> {
    Ok(Topic {
        id: row.try_get("id")?,
        subject_id: row.try_get("subject_id")?,
        name: row.try_get("name")?,
    })
}

fn subtopic_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Subtopic, sqlx::Error> {
    Ok(Subtopic {
        id: row.try_get("id")?,
        topic_id: row.try_get("topic_id")?,
        name: row.try_get("name")?,
    })
}

fn subjects_from_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Subject>, StorageError> {
    rows.iter()
        .map(|row| subject_from_row(row).map_err(query_error))
        .collect()
}

impl TaxonomyRepository for SqliteTaxonomyRepository {
    async fn list_subjects(&self) -> Result<Vec<Subject>, StorageError> {
        let rows = sqlx::query("SELECT id, name FROM subjects ORDER BY id")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        subjects_from_rows(&rows)
    }

    async fn find_subject(&self, name: &str) -> Result<Option<Subject>, StorageError> {
        let row = sqlx::query("SELECT id, name FROM subjects WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.as_ref()
            .map(subject_from_row)
            .transpose()
            .map_err(query_error)
    }

    async fn ensure_subject(&self, name: &str) -> Result<Subject, StorageError> {
        sqlx::query("INSERT OR IGNORE INTO subjects (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        // Read back through the writer so the row is visible immediately.
        let row = sqlx::query("SELECT id, name FROM subjects WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool.writer)
            .await
            .map_err(query_error)?;

        subject_from_row(&row).map_err(query_error)
    }

    async fn list_topics(&self, subject_id: i64) -> Result<Vec<Topic>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, subject_id, name FROM topics WHERE subject_id = ? ORDER BY id",
        )
        .bind(subject_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|row| topic_from_row(row).map_err(query_error))
            .collect()
    }

    async fn list_subtopics(&self, topic_id: i64) -> Result<Vec<Subtopic>, StorageError> {
        let rows =
            sqlx::query("SELECT id, topic_id, name FROM subtopics WHERE topic_id = ? ORDER BY id")
                .bind(topic_id)
                .fetch_all(&self.pool.reader)
                .await
                .map_err(query_error)?;

        rows.iter()
            .map(|row| subtopic_from_row(row).map_err(query_error))
            .collect()
    }

    async fn subjects_without_topics(&self) -> Result<Vec<Subject>, StorageError> {
        let rows = sqlx::query(
            r#"SELECT s.id, s.name FROM subjects s
               WHERE NOT EXISTS (SELECT 1 FROM topics t WHERE t.subject_id = s.id)
               ORDER BY s.id"#,
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        subjects_from_rows(&rows)
    }

    async fn insert_outline(
        &self,
        subject_id: i64,
        outline: &SubjectOutline,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        for chapter in &outline.chapters {
            let topic = sqlx::query(
                "INSERT INTO topics (subject_id, name, difficulty) VALUES (?, ?, ?)",
            )
            .bind(subject_id)
            .bind(&chapter.name)
            .bind(chapter.difficulty)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
            let topic_id = topic.last_insert_rowid();

            for entry in &chapter.subtopics {
                sqlx::query(
                    "INSERT INTO subtopics (topic_id, name, difficulty) VALUES (?, ?, ?)",
                )
                .bind(topic_id)
                .bind(&entry.subtopic)
                .bind(entry.difficulty)
                .execute(&mut *tx)
                .await
                .map_err(query_error)?;
            }
        }

        tx.commit().await.map_err(query_error)?;
        tracing::debug!(
            subject_id,
            chapters = outline.chapters.len(),
            "Outline stored"
        );
        Ok(())
    }
}
