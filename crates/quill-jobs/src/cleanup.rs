//! Debounced tag cleanup.
//!
//! Tag mutations can strand orphaned tag rows. Rather than sweeping on
//! every mutation, callers request a sweep and the scheduler coalesces
//! bursts: each request resets a single pending timer, and the sweep runs
//! once after the configured quiet period (trailing edge). The sweep
//! deletes every currently-orphaned tag, so coalescing never loses a
//! candidate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use quill_core::defaults::DEFAULT_CLEANUP_DELAY_MS;
use quill_core::TagRepository;
use quill_db::Database;

/// Configuration for the cleanup scheduler.
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// Quiet period before a requested sweep runs, in milliseconds.
    pub delay_ms: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_CLEANUP_DELAY_MS,
        }
    }
}

impl CleanupConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `TAG_CLEANUP_DELAY_MS` | `1000` | Quiet period before a sweep runs |
    pub fn from_env() -> Self {
        let delay_ms = std::env::var("TAG_CLEANUP_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_CLEANUP_DELAY_MS);

        Self { delay_ms }
    }

    /// Set the quiet period.
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }
}

/// A scheduled sweep. `armed` is true while the timer is still waiting;
/// the task clears it the moment the quiet period elapses.
#[derive(Debug)]
struct ScheduledSweep {
    handle: JoinHandle<()>,
    armed: Arc<AtomicBool>,
}

/// Debounced scheduler for the orphaned-tag sweep.
///
/// Cloning is cheap; clones share the same pending-timer slot.
#[derive(Debug, Clone)]
pub struct CleanupScheduler {
    db: Database,
    delay: Duration,
    pending: Arc<Mutex<Option<ScheduledSweep>>>,
}

impl CleanupScheduler {
    pub fn new(db: Database, config: CleanupConfig) -> Self {
        Self {
            db,
            delay: Duration::from_millis(config.delay_ms),
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Request a sweep after the quiet period, resetting any pending one.
    ///
    /// Only a timer still waiting out its quiet period is cancellable: a
    /// sweep whose timer already fired is an in-flight storage operation
    /// and runs to completion.
    pub async fn schedule(&self) {
        let mut slot = self.pending.lock().await;
        if let Some(prev) = slot.take() {
            if prev.armed.load(Ordering::Acquire) {
                prev.handle.abort();
            }
        }

        let armed = Arc::new(AtomicBool::new(true));
        let task_armed = armed.clone();
        let db = self.db.clone();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            task_armed.store(false, Ordering::Release);
            match db.tags.delete_unused().await {
                Ok(deleted) => {
                    debug!(
                        subsystem = "jobs",
                        component = "cleanup",
                        op = "sweep",
                        deleted = deleted,
                        "Orphaned tag sweep complete"
                    );
                }
                Err(err) => {
                    warn!(
                        subsystem = "jobs",
                        component = "cleanup",
                        op = "sweep",
                        error = %err,
                        "Orphaned tag sweep failed"
                    );
                }
            }
        });
        *slot = Some(ScheduledSweep { handle, armed });
    }

    /// Drop a pending sweep without running it. A sweep whose timer has
    /// already fired is not affected.
    pub async fn cancel(&self) {
        let mut slot = self.pending.lock().await;
        if let Some(prev) = slot.take() {
            if prev.armed.load(Ordering::Acquire) {
                prev.handle.abort();
            }
        }
    }

    /// Whether a sweep is currently waiting out its quiet period.
    pub async fn is_pending(&self) -> bool {
        let slot = self.pending.lock().await;
        slot.as_ref()
            .map(|s| s.armed.load(Ordering::Acquire) && !s.handle.is_finished())
            .unwrap_or(false)
    }
}
