//! Asset repository backed by SQLite.
//!
//! Asset rows track metadata for note-owned binary attachments; the
//! bytes themselves live wherever `file_path` points. Size and MIME
//! validation happens in `Asset::create` before any row is written.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use quill_core::{
    Asset, AssetId, AssetRepository, CreateAssetRequest, Error, NoteId, Result,
};

/// SQLite implementation of [`AssetRepository`].
#[derive(Debug, Clone)]
pub struct SqliteAssetRepository {
    pool: SqlitePool,
}

impl SqliteAssetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_asset(row: &SqliteRow) -> Result<Asset> {
    let id: AssetId = row.try_get("id").map_err(Error::Database)?;
    let note_id: NoteId = row.try_get("note_id").map_err(Error::Database)?;
    let file_path: String = row.try_get("file_path").map_err(Error::Database)?;
    let file_name: String = row.try_get("file_name").map_err(Error::Database)?;
    let file_size: i64 = row.try_get("file_size").map_err(Error::Database)?;
    let mime_type: String = row.try_get("mime_type").map_err(Error::Database)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(Error::Database)?;
    Asset::reconstruct(
        id, note_id, &file_path, &file_name, file_size, &mime_type, created_at,
    )
}

#[async_trait]
impl AssetRepository for SqliteAssetRepository {
    async fn insert(&self, req: CreateAssetRequest) -> Result<Asset> {
        let asset = Asset::create(req)?;

        sqlx::query(
            "INSERT INTO asset (id, note_id, file_path, file_name, file_size, mime_type, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(asset.id)
        .bind(asset.note_id)
        .bind(&asset.file_path)
        .bind(&asset.file_name)
        .bind(asset.file_size.bytes())
        .bind(asset.mime_type.as_str())
        .bind(asset.created_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(asset)
    }

    async fn fetch(&self, id: AssetId) -> Result<Asset> {
        let row = sqlx::query(
            "SELECT id, note_id, file_path, file_name, file_size, mime_type, created_at
             FROM asset WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(row) => row_to_asset(&row),
            None => Err(Error::AssetNotFound(id)),
        }
    }

    async fn list_for_note(&self, note_id: NoteId) -> Result<Vec<Asset>> {
        let rows = sqlx::query(
            "SELECT id, note_id, file_path, file_name, file_size, mime_type, created_at
             FROM asset
             WHERE note_id = ?
             ORDER BY created_at ASC, id ASC",
        )
        .bind(note_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(row_to_asset).collect()
    }

    async fn delete(&self, id: AssetId) -> Result<()> {
        let result = sqlx::query("DELETE FROM asset WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::AssetNotFound(id));
        }
        Ok(())
    }

    async fn delete_for_note(&self, note_id: NoteId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM asset WHERE note_id = ?")
            .bind(note_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}
