//! Settings repository backed by SQLite.
//!
//! One row, `id = 1`, enforced by a CHECK constraint. Reading before any
//! save yields the documented defaults rather than an error.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use quill_core::{Error, ErrorCode, Result, Settings, SettingsRepository};

/// SQLite implementation of [`SettingsRepository`].
#[derive(Debug, Clone)]
pub struct SqliteSettingsRepository {
    pool: SqlitePool,
}

impl SqliteSettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for SqliteSettingsRepository {
    async fn get(&self) -> Result<Settings> {
        let row = sqlx::query(
            "SELECT order_by, sort_order, auto_save_interval_ms FROM settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(row) => {
                let order_by: String = row.try_get("order_by").map_err(Error::Database)?;
                let sort_order: String = row.try_get("sort_order").map_err(Error::Database)?;
                let raw_interval: i64 = row
                    .try_get("auto_save_interval_ms")
                    .map_err(Error::Database)?;
                // Fail closed on a row outside u32 range instead of
                // wrapping it into a valid-looking interval.
                let interval_ms = u32::try_from(raw_interval).map_err(|_| {
                    Error::validation(
                        ErrorCode::CorruptRow,
                        format!("stored auto-save interval {raw_interval} ms is out of range"),
                    )
                })?;
                Settings::reconstruct(&order_by, &sort_order, interval_ms)
            }
            None => Ok(Settings::default()),
        }
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        sqlx::query(
            "INSERT INTO settings (id, order_by, sort_order, auto_save_interval_ms)
             VALUES (1, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 order_by = excluded.order_by,
                 sort_order = excluded.sort_order,
                 auto_save_interval_ms = excluded.auto_save_interval_ms",
        )
        .bind(settings.order_by.as_str())
        .bind(settings.order.as_str())
        .bind(settings.auto_save_interval.millis() as i64)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn exists(&self) -> Result<bool> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE id = 1)")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(exists != 0)
    }

    async fn reset(&self) -> Result<()> {
        sqlx::query("DELETE FROM settings WHERE id = 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
