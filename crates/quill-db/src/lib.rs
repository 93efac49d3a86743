//! # quill-db
//!
//! Embedded SQLite storage layer for quill. Implements the repository
//! ports defined in `quill-core` and bundles them behind a [`Database`]
//! aggregate with pooling, schema migration, and a transactional unit of
//! work.

pub mod assets;
pub mod migrations;
pub mod notes;
pub mod pool;
pub mod revisions;
pub mod search;
pub mod settings;
pub mod tags;
pub mod unit_of_work;

pub use assets::SqliteAssetRepository;
pub use notes::SqliteNoteRepository;
pub use pool::{create_memory_pool, create_pool, create_pool_with_config, PoolConfig};
pub use revisions::SqliteRevisionRepository;
pub use search::{escape_like, SqliteSearchProvider};
pub use settings::SqliteSettingsRepository;
pub use tags::SqliteTagRepository;
pub use unit_of_work::UnitOfWork;

use sqlx::SqlitePool;

use quill_core::Result;

/// All repositories over one shared pool.
///
/// Cloning is cheap; every clone shares the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    pub notes: SqliteNoteRepository,
    pub tags: SqliteTagRepository,
    pub revisions: SqliteRevisionRepository,
    pub assets: SqliteAssetRepository,
    pub settings: SqliteSettingsRepository,
    pub search: SqliteSearchProvider,
}

impl Database {
    /// Assemble repositories over an existing pool. The schema must
    /// already be applied; the `connect_*` constructors handle that.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            notes: SqliteNoteRepository::new(pool.clone()),
            tags: SqliteTagRepository::new(pool.clone()),
            revisions: SqliteRevisionRepository::new(pool.clone()),
            assets: SqliteAssetRepository::new(pool.clone()),
            settings: SqliteSettingsRepository::new(pool.clone()),
            search: SqliteSearchProvider::new(pool.clone()),
            pool,
        }
    }

    /// Open (creating if missing) a file-backed database and apply the
    /// schema.
    pub async fn connect(path: &str) -> Result<Self> {
        let pool = pool::create_pool(path).await?;
        migrations::migrate(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Open a file-backed database with custom pool configuration.
    pub async fn connect_with_config(path: &str, config: PoolConfig) -> Result<Self> {
        let pool = pool::create_pool_with_config(path, config).await?;
        migrations::migrate(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Open a fresh in-memory database. Each call is fully isolated.
    pub async fn connect_memory() -> Result<Self> {
        let pool = pool::create_memory_pool().await?;
        migrations::migrate(&pool).await?;
        Ok(Self::new(pool))
    }

    /// A unit of work over this database's pool.
    pub fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(self.pool.clone())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
