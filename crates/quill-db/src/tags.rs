//! Tag repository backed by SQLite.
//!
//! Tag rows are shared across notes and joined through the `note_tag`
//! link table. Usage counts are always recomputed from current links.
//! The `_tx` variants mirror the pool methods for composition inside a
//! unit of work; callers holding a transaction must use them, since the
//! pool methods would try to acquire a second connection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::debug;

use quill_core::{
    Error, NoteId, Result, Tag, TagId, TagName, TagRepository, TagWithUsage,
};

/// SQLite implementation of [`TagRepository`].
#[derive(Debug, Clone)]
pub struct SqliteTagRepository {
    pool: SqlitePool,
}

impl SqliteTagRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Transaction-scoped find-or-create.
    ///
    /// The unique-name constraint is the arbiter: the insert is a no-op
    /// when the name already exists, and the follow-up select returns the
    /// surviving row either way.
    pub async fn find_or_create_tx(
        name: &TagName,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> Result<Tag> {
        let candidate = Tag::create(name.clone());
        sqlx::query("INSERT INTO tag (id, name, created_at) VALUES (?, ?, ?) ON CONFLICT(name) DO NOTHING")
            .bind(candidate.id)
            .bind(candidate.name.as_str())
            .bind(candidate.created_at)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        let row = sqlx::query("SELECT id, name, created_at FROM tag WHERE name = ?")
            .bind(name.as_str())
            .fetch_one(&mut **tx)
            .await
            .map_err(Error::Database)?;
        row_to_tag(&row)
    }

    /// Transaction-scoped lookup of the tags linked to a note.
    pub async fn tags_for_note_tx(
        note_id: NoteId,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT t.id, t.name, t.created_at
             FROM tag t
             JOIN note_tag nt ON nt.tag_id = t.id
             WHERE nt.note_id = ?
             ORDER BY t.name",
        )
        .bind(note_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(row_to_tag).collect()
    }

    /// Transaction-scoped idempotent link.
    pub async fn link_tx(
        note_id: NoteId,
        tag_id: TagId,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO note_tag (note_id, tag_id) VALUES (?, ?)
             ON CONFLICT(note_id, tag_id) DO NOTHING",
        )
        .bind(note_id)
        .bind(tag_id)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    /// Transaction-scoped unlink.
    pub async fn unlink_tx(
        note_id: NoteId,
        tag_id: TagId,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> Result<()> {
        sqlx::query("DELETE FROM note_tag WHERE note_id = ? AND tag_id = ?")
            .bind(note_id)
            .bind(tag_id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

}

fn row_to_tag(row: &SqliteRow) -> Result<Tag> {
    let id: TagId = row.try_get("id").map_err(Error::Database)?;
    let name: String = row.try_get("name").map_err(Error::Database)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(Error::Database)?;
    Tag::reconstruct(id, &name, created_at)
}

#[async_trait]
impl TagRepository for SqliteTagRepository {
    async fn find_or_create(&self, name: &TagName) -> Result<Tag> {
        let candidate = Tag::create(name.clone());
        sqlx::query("INSERT INTO tag (id, name, created_at) VALUES (?, ?, ?) ON CONFLICT(name) DO NOTHING")
            .bind(candidate.id)
            .bind(candidate.name.as_str())
            .bind(candidate.created_at)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        let row = sqlx::query("SELECT id, name, created_at FROM tag WHERE name = ?")
            .bind(name.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        row_to_tag(&row)
    }

    async fn fetch(&self, id: TagId) -> Result<Tag> {
        let row = sqlx::query("SELECT id, name, created_at FROM tag WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        match row {
            Some(row) => row_to_tag(&row),
            None => Err(Error::TagNotFound(id)),
        }
    }

    async fn find_by_name(&self, name: &TagName) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, created_at FROM tag WHERE name = ?")
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.map(|row| row_to_tag(&row)).transpose()
    }

    async fn list_with_usage(&self) -> Result<Vec<TagWithUsage>> {
        let rows = sqlx::query(
            "SELECT t.id, t.name, t.created_at, COUNT(nt.note_id) AS usage_count
             FROM tag t
             LEFT JOIN note_tag nt ON nt.tag_id = t.id
             GROUP BY t.id, t.name, t.created_at
             ORDER BY t.name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter()
            .map(|row| {
                let tag = row_to_tag(row)?;
                let usage_count: i64 = row.try_get("usage_count").map_err(Error::Database)?;
                Ok(TagWithUsage { tag, usage_count })
            })
            .collect()
    }

    async fn tags_for_note(&self, note_id: NoteId) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT t.id, t.name, t.created_at
             FROM tag t
             JOIN note_tag nt ON nt.tag_id = t.id
             WHERE nt.note_id = ?
             ORDER BY t.name",
        )
        .bind(note_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(row_to_tag).collect()
    }

    async fn link(&self, note_id: NoteId, tag_id: TagId) -> Result<()> {
        sqlx::query(
            "INSERT INTO note_tag (note_id, tag_id) VALUES (?, ?)
             ON CONFLICT(note_id, tag_id) DO NOTHING",
        )
        .bind(note_id)
        .bind(tag_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn unlink(&self, note_id: NoteId, tag_id: TagId) -> Result<()> {
        sqlx::query("DELETE FROM note_tag WHERE note_id = ? AND tag_id = ?")
            .bind(note_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn delete_unused(&self) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM tag WHERE NOT EXISTS (SELECT 1 FROM note_tag nt WHERE nt.tag_id = tag.id)",
        )
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        let deleted = result.rows_affected();
        if deleted > 0 {
            debug!(
                subsystem = "db",
                component = "tags",
                op = "delete_unused",
                deleted = deleted,
                "Removed orphaned tags"
            );
        }
        Ok(deleted)
    }
}
