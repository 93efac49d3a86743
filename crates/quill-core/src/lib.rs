//! # quill-core
//!
//! Core types, traits, and validation for quill, a local single-user
//! note store with tag synchronization, combined search, and Markdown
//! export.
//!
//! This crate provides:
//! - Validated value objects (ids, tag names, structured note content)
//! - Entities with `create`/`reconstruct` constructors
//! - Repository port traits implemented by the storage layer
//! - Inline hashtag extraction
//! - Markdown export

pub mod defaults;
pub mod error;
pub mod export;
pub mod models;
pub mod tags;
pub mod traits;
pub mod uuid_utils;

pub use error::{Error, ErrorCode, Result};
pub use export::{sanitize_file_name, ExportedNote, MarkdownExporter};
pub use models::{
    Asset, AssetId, AutoSaveInterval, CreateAssetRequest, FileSize, MimeType, Note, NoteContent,
    NoteId, OrderBy, Revision, RevisionId, Settings, SortOrder, Tag, TagId, TagName, TagWithUsage,
};
pub use tags::{strip_hashtags, validate_tag_name, HashtagExtractor};
pub use traits::{
    AssetRepository, NoteRepository, RevisionRepository, SearchNotesRequest, SearchNotesResponse,
    SearchProvider, SettingsRepository, TagExtractor, TagRepository,
};
pub use uuid_utils::new_v7;
