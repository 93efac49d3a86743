//! Note repository backed by SQLite.
//!
//! Stores the structured document as its serialized JSON alongside a
//! plain-text projection (`search_text`) used for substring search.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use quill_core::{Error, Note, NoteContent, NoteId, NoteRepository, Result};

/// SQLite implementation of [`NoteRepository`].
#[derive(Debug, Clone)]
pub struct SqliteNoteRepository {
    pool: SqlitePool,
}

impl SqliteNoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Transaction-scoped insert, for composition inside a unit of work.
    pub async fn insert_tx(note: &Note, tx: &mut Transaction<'_, Sqlite>) -> Result<()> {
        sqlx::query(
            "INSERT INTO note (id, content, search_text, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(note.id)
        .bind(note.content.to_json_string())
        .bind(note.content.to_plain_text())
        .bind(note.created_at)
        .bind(note.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    /// Transaction-scoped content update. Bumps `updated_at` and refreshes
    /// the plain-text projection.
    pub async fn update_content_tx(
        id: NoteId,
        content: &NoteContent,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE note SET content = ?, search_text = ?, updated_at = ? WHERE id = ?",
        )
        .bind(content.to_json_string())
        .bind(content.to_plain_text())
        .bind(Utc::now())
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }
}

pub(crate) fn row_to_note(row: &SqliteRow) -> Result<Note> {
    let id: NoteId = row.try_get("id").map_err(Error::Database)?;
    let content: String = row.try_get("content").map_err(Error::Database)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(Error::Database)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(Error::Database)?;
    Note::reconstruct(id, &content, created_at, updated_at)
}

#[async_trait]
impl NoteRepository for SqliteNoteRepository {
    async fn insert(&self, note: &Note) -> Result<()> {
        sqlx::query(
            "INSERT INTO note (id, content, search_text, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(note.id)
        .bind(note.content.to_json_string())
        .bind(note.content.to_plain_text())
        .bind(note.created_at)
        .bind(note.updated_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn fetch(&self, id: NoteId) -> Result<Note> {
        let row = sqlx::query(
            "SELECT id, content, created_at, updated_at FROM note WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(row) => row_to_note(&row),
            None => Err(Error::NoteNotFound(id)),
        }
    }

    async fn update_content(&self, id: NoteId, content: &NoteContent) -> Result<()> {
        let result = sqlx::query(
            "UPDATE note SET content = ?, search_text = ?, updated_at = ? WHERE id = ?",
        )
        .bind(content.to_json_string())
        .bind(content.to_plain_text())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: NoteId) -> Result<()> {
        let result = sqlx::query("DELETE FROM note WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    async fn exists(&self, id: NoteId) -> Result<bool> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM note WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(exists != 0)
    }

    async fn list_ids(&self) -> Result<Vec<NoteId>> {
        let ids: Vec<NoteId> =
            sqlx::query_scalar("SELECT id FROM note ORDER BY created_at DESC, id DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(ids)
    }
}
