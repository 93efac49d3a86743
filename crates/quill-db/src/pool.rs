//! Database connection pool management.
//!
//! The store is an embedded single-user SQLite database; the pool exists
//! so concurrent in-flight async operations can interleave reads while the
//! engine's own transaction mechanism serializes writes.

use std::str::FromStr;
use std::time::{Duration, Instant};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

use quill_core::Result;

/// Default maximum number of connections in the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default connection acquire timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default idle timeout in seconds.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// Pool configuration options.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Minimum number of connections to maintain.
    pub min_connections: u32,
    /// Connection acquire timeout duration.
    pub connect_timeout: Duration,
    /// Idle connection timeout duration.
    pub idle_timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: 1,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            idle_timeout: Some(Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS)),
        }
    }
}

impl PoolConfig {
    /// Create a new pool configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of connections.
    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    /// Set the minimum number of connections.
    pub fn min_connections(mut self, n: u32) -> Self {
        self.min_connections = n;
        self
    }

    /// Set the connection acquire timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the idle connection timeout.
    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }
}

/// Create a file-backed SQLite pool with default configuration.
///
/// The database file is created if missing. Foreign keys are enabled on
/// every connection; cascade deletes depend on this.
pub async fn create_pool(path: &str) -> Result<SqlitePool> {
    create_pool_with_config(path, PoolConfig::default()).await
}

/// Create a file-backed SQLite pool with custom configuration.
pub async fn create_pool_with_config(path: &str, config: PoolConfig) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    connect(options, config, path).await
}

/// Create an in-memory SQLite pool.
///
/// An in-memory database lives and dies with its connection, so the pool
/// is pinned to exactly one connection that is never reaped. Each call
/// yields a fully isolated store; tests rely on this.
pub async fn create_memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(quill_core::Error::Database)?
        .foreign_keys(true);

    let config = PoolConfig::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None);

    connect(options, config, ":memory:").await
}

async fn connect(
    options: SqliteConnectOptions,
    config: PoolConfig,
    path: &str,
) -> Result<SqlitePool> {
    let start = Instant::now();

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout)
        .connect_with(options)
        .await
        .map_err(quill_core::Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "established",
        path = path,
        max_connections = config.max_connections,
        duration_ms = start.elapsed().as_millis() as u64,
        "Database connection pool established"
    );
    Ok(pool)
}
