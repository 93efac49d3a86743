//! # quill-jobs
//!
//! Coordination layer for quill: transactional note saves with tag
//! synchronization, revision checkpoints, and a debounced background
//! sweep for orphaned tags.

pub mod cleanup;
pub mod tag_sync;

pub use cleanup::{CleanupConfig, CleanupScheduler};
pub use tag_sync::{NoteSyncService, TagSyncOutcome};
