//! Embedded schema migration.
//!
//! The schema is applied idempotently at connect time; there is no
//! external migrations directory for an embedded single-file store.

use sqlx::SqlitePool;
use tracing::debug;

use quill_core::{Error, Result};

/// Schema statements, applied in order. All are idempotent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS note (
        id          BLOB PRIMARY KEY,
        content     TEXT NOT NULL,
        search_text TEXT NOT NULL DEFAULT '',
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tag (
        id         BLOB PRIMARY KEY,
        name       TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS note_tag (
        note_id BLOB NOT NULL REFERENCES note(id) ON DELETE CASCADE,
        tag_id  BLOB NOT NULL REFERENCES tag(id) ON DELETE CASCADE,
        PRIMARY KEY (note_id, tag_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_note_tag_tag ON note_tag(tag_id)",
    r#"
    CREATE TABLE IF NOT EXISTS revision (
        id           BLOB PRIMARY KEY,
        note_id      BLOB NOT NULL REFERENCES note(id) ON DELETE CASCADE,
        content      TEXT NOT NULL,
        content_hash TEXT NOT NULL,
        saved_at     TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_revision_note ON revision(note_id)",
    r#"
    CREATE TABLE IF NOT EXISTS asset (
        id         BLOB PRIMARY KEY,
        note_id    BLOB NOT NULL REFERENCES note(id) ON DELETE CASCADE,
        file_path  TEXT NOT NULL,
        file_name  TEXT NOT NULL,
        file_size  INTEGER NOT NULL,
        mime_type  TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_asset_note ON asset(note_id)",
    r#"
    CREATE TABLE IF NOT EXISTS settings (
        id                    INTEGER PRIMARY KEY CHECK (id = 1),
        order_by              TEXT NOT NULL,
        sort_order            TEXT NOT NULL,
        auto_save_interval_ms INTEGER NOT NULL
    )
    "#,
];

/// Apply the schema to the given pool.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(Error::Database)?;
    }
    debug!(
        subsystem = "db",
        component = "migrations",
        op = "apply",
        statements = SCHEMA.len(),
        "Schema applied"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::create_memory_pool;

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let pool = create_memory_pool().await.expect("pool");
        migrate(&pool).await.expect("first migrate");
        migrate(&pool).await.expect("second migrate");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .expect("list tables");

        assert_eq!(tables, vec!["asset", "note", "note_tag", "revision", "settings", "tag"]);
    }
}
