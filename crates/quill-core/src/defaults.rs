//! Default values and domain limits.
//!
//! All tunable constants live here so that limits referenced from
//! validation, repositories, and tests stay in one place.

/// Maximum size of an uploaded asset in bytes (10 MiB).
pub const MAX_FILE_SIZE_BYTES: i64 = 10 * 1024 * 1024;

/// Maximum tag name length in characters (not bytes).
pub const MAX_TAG_NAME_CHARS: usize = 100;

/// Minimum auto-save interval in milliseconds. Values below this are
/// rejected, never clamped.
pub const MIN_AUTO_SAVE_INTERVAL_MS: u32 = 1000;

/// Default auto-save interval in milliseconds.
pub const DEFAULT_AUTO_SAVE_INTERVAL_MS: u32 = 5000;

/// Upper bound for a search page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default search page size.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// MIME types accepted for assets. Anything else is rejected with
/// `ErrorCode::UnsupportedMimeType`.
pub const SUPPORTED_IMAGE_MIME_TYPES: &[&str] =
    &["image/png", "image/jpeg", "image/gif", "image/webp"];

/// Debounce delay before orphaned tags are cleaned up, in milliseconds.
pub const DEFAULT_CLEANUP_DELAY_MS: u64 = 1000;

/// Maximum length of a generated export file name stem, in characters.
pub const EXPORT_FILE_NAME_MAX_CHARS: usize = 50;
