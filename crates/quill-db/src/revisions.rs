//! Revision repository backed by SQLite.
//!
//! Revisions are append-only snapshots. Rehydration re-verifies the
//! stored content hash, so a corrupt row surfaces as an error instead of
//! silently restoring bad content.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use quill_core::{Error, NoteId, Result, Revision, RevisionId, RevisionRepository};

/// SQLite implementation of [`RevisionRepository`].
#[derive(Debug, Clone)]
pub struct SqliteRevisionRepository {
    pool: SqlitePool,
}

impl SqliteRevisionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_revision(row: &SqliteRow) -> Result<Revision> {
    let id: RevisionId = row.try_get("id").map_err(Error::Database)?;
    let note_id: NoteId = row.try_get("note_id").map_err(Error::Database)?;
    let content: String = row.try_get("content").map_err(Error::Database)?;
    let content_hash: String = row.try_get("content_hash").map_err(Error::Database)?;
    let saved_at: DateTime<Utc> = row.try_get("saved_at").map_err(Error::Database)?;
    Revision::reconstruct(id, note_id, &content, &content_hash, saved_at)
}

#[async_trait]
impl RevisionRepository for SqliteRevisionRepository {
    async fn insert(&self, revision: &Revision) -> Result<()> {
        sqlx::query(
            "INSERT INTO revision (id, note_id, content, content_hash, saved_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(revision.id)
        .bind(revision.note_id)
        .bind(revision.content.to_json_string())
        .bind(&revision.content_hash)
        .bind(revision.saved_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn fetch(&self, id: RevisionId) -> Result<Revision> {
        let row = sqlx::query(
            "SELECT id, note_id, content, content_hash, saved_at FROM revision WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(row) => row_to_revision(&row),
            None => Err(Error::RevisionNotFound(id)),
        }
    }

    async fn list_for_note(&self, note_id: NoteId) -> Result<Vec<Revision>> {
        let rows = sqlx::query(
            "SELECT id, note_id, content, content_hash, saved_at
             FROM revision
             WHERE note_id = ?
             ORDER BY saved_at DESC, id DESC",
        )
        .bind(note_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(row_to_revision).collect()
    }

    async fn delete_for_note(&self, note_id: NoteId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM revision WHERE note_id = ?")
            .bind(note_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}
