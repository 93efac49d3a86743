//! Port traits for the quill note store.
//!
//! These traits define the persistence contracts that concrete storage
//! implementations must satisfy. Conventions, held uniformly:
//!
//! - a required single-entity lookup (`fetch`) fails with the matching
//!   `*NotFound` error variant when the row is absent;
//! - a collection query scoped to a parent (`list_for_note`) returns an
//!   empty vector, never an error, when nothing matches;
//! - an optional lookup (`find_by_name`) returns `Ok(None)`.

use async_trait::async_trait;

use crate::defaults::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::error::{Error, ErrorCode, Result};
use crate::models::{
    Asset, AssetId, CreateAssetRequest, Note, NoteContent, NoteId, OrderBy, Revision, RevisionId,
    Settings, SortOrder, Tag, TagId, TagName, TagWithUsage,
};

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Repository for note CRUD operations.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Persist a new note.
    async fn insert(&self, note: &Note) -> Result<()>;

    /// Fetch a note by id, failing with `NoteNotFound` when absent.
    async fn fetch(&self, id: NoteId) -> Result<Note>;

    /// Replace a note's content and bump its `updated_at` timestamp.
    async fn update_content(&self, id: NoteId, content: &NoteContent) -> Result<()>;

    /// Delete a note, cascading to its tag links, revisions, and assets.
    async fn delete(&self, id: NoteId) -> Result<()>;

    /// Check if a note exists.
    async fn exists(&self, id: NoteId) -> Result<bool>;

    /// List all note ids, newest first.
    async fn list_ids(&self) -> Result<Vec<NoteId>>;
}

// =============================================================================
// TAG REPOSITORY
// =============================================================================

/// Repository for tag rows and note-tag links.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Find a tag by name, creating it when absent.
    ///
    /// Race-safe: the unique-name constraint at the storage layer is the
    /// source of truth, so a create losing the race is treated as "already
    /// exists" and re-fetched, never as a fatal error.
    async fn find_or_create(&self, name: &TagName) -> Result<Tag>;

    /// Fetch a tag by id, failing with `TagNotFound` when absent.
    async fn fetch(&self, id: TagId) -> Result<Tag>;

    /// Look up a tag by exact (case-sensitive) name.
    async fn find_by_name(&self, name: &TagName) -> Result<Option<Tag>>;

    /// List all tags with their recomputed usage counts.
    async fn list_with_usage(&self) -> Result<Vec<TagWithUsage>>;

    /// Tags currently linked to a note, ordered by name.
    async fn tags_for_note(&self, note_id: NoteId) -> Result<Vec<Tag>>;

    /// Link a tag to a note (idempotent).
    async fn link(&self, note_id: NoteId, tag_id: TagId) -> Result<()>;

    /// Remove a note-tag link.
    async fn unlink(&self, note_id: NoteId, tag_id: TagId) -> Result<()>;

    /// Delete all tags with zero remaining links. Returns the number of
    /// tags deleted.
    async fn delete_unused(&self) -> Result<u64>;
}

// =============================================================================
// REVISION REPOSITORY
// =============================================================================

/// Repository for append-only note revision snapshots.
#[async_trait]
pub trait RevisionRepository: Send + Sync {
    /// Persist a revision snapshot.
    async fn insert(&self, revision: &Revision) -> Result<()>;

    /// Fetch a revision by id, failing with `RevisionNotFound` when absent.
    async fn fetch(&self, id: RevisionId) -> Result<Revision>;

    /// All revisions of a note, newest first. Empty when none exist.
    async fn list_for_note(&self, note_id: NoteId) -> Result<Vec<Revision>>;

    /// Prune all revisions of a note. Returns the number deleted.
    async fn delete_for_note(&self, note_id: NoteId) -> Result<u64>;
}

// =============================================================================
// ASSET REPOSITORY
// =============================================================================

/// Repository for note-owned binary assets.
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Validate the request and persist a new asset.
    async fn insert(&self, req: CreateAssetRequest) -> Result<Asset>;

    /// Fetch an asset by id, failing with `AssetNotFound` when absent.
    async fn fetch(&self, id: AssetId) -> Result<Asset>;

    /// All assets of a note, oldest first. Empty when none exist.
    async fn list_for_note(&self, note_id: NoteId) -> Result<Vec<Asset>>;

    /// Delete a single asset.
    async fn delete(&self, id: AssetId) -> Result<()>;

    /// Delete all assets of a note. Returns the number deleted.
    async fn delete_for_note(&self, note_id: NoteId) -> Result<u64>;
}

// =============================================================================
// SETTINGS REPOSITORY
// =============================================================================

/// Repository for the singleton settings record.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Current settings; documented defaults when none were ever saved.
    async fn get(&self) -> Result<Settings>;

    /// Overwrite settings wholesale.
    async fn save(&self, settings: &Settings) -> Result<()>;

    /// Whether a settings record has been persisted.
    async fn exists(&self) -> Result<bool>;

    /// Restore defaults.
    async fn reset(&self) -> Result<()>;
}

// =============================================================================
// COMBINED SEARCH / PAGINATION
// =============================================================================

/// Request for the combined search/pagination query.
#[derive(Debug, Clone)]
pub struct SearchNotesRequest {
    /// Free-text filter; empty means "no text filter".
    pub query: String,
    /// Tag intersection filter: a note must carry ALL listed tags to
    /// match. Empty means "no tag filter".
    pub tag_ids: Vec<TagId>,
    /// 1-indexed page number.
    pub page: u32,
    pub page_size: u32,
    pub order_by: OrderBy,
    pub order: SortOrder,
}

impl Default for SearchNotesRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            tag_ids: Vec::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            order_by: OrderBy::default(),
            order: SortOrder::default(),
        }
    }
}

impl SearchNotesRequest {
    /// Check pagination bounds before touching storage.
    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(Error::business_rule(
                ErrorCode::InvalidPage,
                "pages are 1-indexed",
            ));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::business_rule(
                ErrorCode::InvalidPageSize,
                format!("page size must be 1..={MAX_PAGE_SIZE}, got {}", self.page_size),
            ));
        }
        Ok(())
    }

    /// Row offset implied by the page window.
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }
}

/// Response for the combined query: one page of notes plus the total
/// matching row count, so callers can compute "has more" without a second
/// request.
#[derive(Debug, Clone)]
pub struct SearchNotesResponse {
    pub items: Vec<Note>,
    pub total: i64,
}

/// Provider for the combined search/pagination query.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Answer "page N of notes matching free-text query AND tag filters,
    /// sorted by field/direction" in one call.
    async fn search(&self, req: SearchNotesRequest) -> Result<SearchNotesResponse>;
}

// =============================================================================
// TAG EXTRACTION
// =============================================================================

/// Extracts the set of tag names present in note text.
///
/// Must return case-sensitively deduplicated names, an empty list (not an
/// error) for content without tags, and an error only for genuine
/// extractor failures.
pub trait TagExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Result<Vec<String>>;
}
