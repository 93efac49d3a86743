//! Error types for the quill note store.

use thiserror::Error;

use crate::models::{AssetId, NoteId, RevisionId, TagId};

/// Result type alias using quill's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable machine-readable codes for validation and business-rule failures.
///
/// The UI layer maps these to human-readable messages; `user_message` below
/// is the canonical mapping and is exhaustive over all codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Identifier is not a syntactically valid UUID.
    InvalidId,
    /// Tag name is empty.
    TagNameEmpty,
    /// Tag name exceeds the maximum length.
    TagNameTooLong,
    /// Tag name contains characters outside the allowed set.
    TagNameInvalidChars,
    /// Note content is not a well-formed structured document.
    MalformedContent,
    /// Auto-save interval is below the minimum.
    IntervalTooShort,
    /// File size is zero or negative.
    FileEmpty,
    /// File size exceeds the maximum.
    FileTooLarge,
    /// MIME type is not in the supported image allow-list.
    UnsupportedMimeType,
    /// Unknown sort field.
    InvalidOrderBy,
    /// Unknown sort direction.
    InvalidSortOrder,
    /// Page number is zero (pages are 1-indexed).
    InvalidPage,
    /// Page size is zero or exceeds the upper bound.
    InvalidPageSize,
    /// A stored row failed re-validation on read.
    CorruptRow,
}

impl ErrorCode {
    /// The stable wire representation of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidId => "invalid_id",
            ErrorCode::TagNameEmpty => "tag_name_empty",
            ErrorCode::TagNameTooLong => "tag_name_too_long",
            ErrorCode::TagNameInvalidChars => "tag_name_invalid_chars",
            ErrorCode::MalformedContent => "malformed_content",
            ErrorCode::IntervalTooShort => "interval_too_short",
            ErrorCode::FileEmpty => "file_empty",
            ErrorCode::FileTooLarge => "file_too_large",
            ErrorCode::UnsupportedMimeType => "unsupported_mime_type",
            ErrorCode::InvalidOrderBy => "invalid_order_by",
            ErrorCode::InvalidSortOrder => "invalid_sort_order",
            ErrorCode::InvalidPage => "invalid_page",
            ErrorCode::InvalidPageSize => "invalid_page_size",
            ErrorCode::CorruptRow => "corrupt_row",
        }
    }

    /// Human-readable message for this code.
    ///
    /// Exhaustive by construction: adding a code forces a decision here
    /// instead of silently falling through to a generic message.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidId => "The identifier is not valid.",
            ErrorCode::TagNameEmpty => "Tag names cannot be empty.",
            ErrorCode::TagNameTooLong => "Tag names must be 100 characters or less.",
            ErrorCode::TagNameInvalidChars => {
                "Tag names may only contain letters, digits, hyphens, and underscores."
            }
            ErrorCode::MalformedContent => "The note content is malformed.",
            ErrorCode::IntervalTooShort => "Auto-save interval must be at least 1000 ms.",
            ErrorCode::FileEmpty => "The file is empty.",
            ErrorCode::FileTooLarge => "The file exceeds the 10 MiB size limit.",
            ErrorCode::UnsupportedMimeType => "Only PNG, JPEG, GIF, and WebP images are supported.",
            ErrorCode::InvalidOrderBy => "Unknown sort field.",
            ErrorCode::InvalidSortOrder => "Unknown sort direction.",
            ErrorCode::InvalidPage => "Page numbers start at 1.",
            ErrorCode::InvalidPageSize => "Page size must be between 1 and 100.",
            ErrorCode::CorruptRow => "A stored record could not be read back.",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error type for quill operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Input failed a value-object schema.
    #[error("Validation error [{code}]: {message}")]
    Validation { code: ErrorCode, message: String },

    /// A domain invariant would be violated.
    #[error("Business rule violation [{code}]: {message}")]
    BusinessRule { code: ErrorCode, message: String },

    /// Database operation failed (wraps sqlx::Error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Note not found.
    #[error("Note not found: {0}")]
    NoteNotFound(NoteId),

    /// Tag not found.
    #[error("Tag not found: {0}")]
    TagNotFound(TagId),

    /// Revision not found.
    #[error("Revision not found: {0}")]
    RevisionNotFound(RevisionId),

    /// Asset not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(AssetId),

    /// A browser/platform adapter failed.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// The user cancelled the operation. Not a failure: callers treat this
    /// as a no-op, never as something to surface in an error toast.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Construct a `Validation` error.
    pub fn validation(code: ErrorCode, message: impl Into<String>) -> Self {
        Error::Validation {
            code,
            message: message.into(),
        }
    }

    /// Construct a `BusinessRule` error.
    pub fn business_rule(code: ErrorCode, message: impl Into<String>) -> Self {
        Error::BusinessRule {
            code,
            message: message.into(),
        }
    }

    /// The machine-readable code carried by validation and business-rule
    /// errors, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::Validation { code, .. } | Error::BusinessRule { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether this error represents a user cancellation (a no-op, not a
    /// failure).
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Map any error to a user-facing message.
    ///
    /// Known codes get their specific message; everything else falls back
    /// to a generic message deliberately.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Validation { code, .. } | Error::BusinessRule { code, .. } => {
                code.user_message()
            }
            Error::NotFound(_)
            | Error::NoteNotFound(_)
            | Error::TagNotFound(_)
            | Error::RevisionNotFound(_)
            | Error::AssetNotFound(_) => "The requested item could not be found.",
            Error::Cancelled => "",
            _ => "An unknown error occurred.",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
