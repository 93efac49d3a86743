//! Unit of work: a transaction boundary for multi-repository operations.
//!
//! The closure receives a live transaction; it commits only when the
//! closure returns `Ok`, and rolls back on any error. Inside the closure
//! only the repositories' `_tx` method variants may be used. The pool
//! methods would try to acquire a second connection, which deadlocks on
//! a single-connection pool.

use std::future::Future;
use std::pin::Pin;

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use quill_core::{Error, Result};

/// Runs closures inside a single SQLite transaction.
#[derive(Debug, Clone)]
pub struct UnitOfWork {
    pool: SqlitePool,
}

impl UnitOfWork {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Execute `f` inside a transaction, committing iff it returns `Ok`.
    ///
    /// ```ignore
    /// let note_id = db.unit_of_work().run(|tx| Box::pin(async move {
    ///     SqliteNoteRepository::insert_tx(&note, tx).await?;
    ///     SqliteTagRepository::link_tx(note.id, tag.id, tx).await?;
    ///     Ok(note.id)
    /// })).await?;
    /// ```
    pub async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send,
        F: for<'t> FnOnce(
                &'t mut Transaction<'static, Sqlite>,
            ) -> Pin<Box<dyn Future<Output = Result<T>> + Send + 't>>
            + Send,
    {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        match f(&mut tx).await {
            Ok(value) => {
                tx.commit().await.map_err(Error::Database)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    debug!(
                        subsystem = "db",
                        component = "unit_of_work",
                        op = "rollback",
                        error = %rollback_err,
                        "Rollback failed after aborted unit of work"
                    );
                }
                Err(err)
            }
        }
    }
}
