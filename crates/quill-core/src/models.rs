//! Entities and value objects for the quill note store.
//!
//! Every constructor validates its input and returns a `Result`; the
//! `reconstruct` constructors apply the same schema to rows read back from
//! storage and fail closed on corrupt data instead of coercing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::defaults::{
    DEFAULT_AUTO_SAVE_INTERVAL_MS, MAX_FILE_SIZE_BYTES, MIN_AUTO_SAVE_INTERVAL_MS,
    SUPPORTED_IMAGE_MIME_TYPES,
};
use crate::error::{Error, ErrorCode, Result};
use crate::tags::validate_tag_name;
use crate::uuid_utils::new_v7;

// =============================================================================
// IDENTIFIERS
// =============================================================================

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
            sqlx::Type,
        )]
        #[sqlx(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh time-ordered (UUIDv7) identifier.
            pub fn new() -> Self {
                Self(new_v7())
            }

            /// Parse an identifier from its string form, rejecting anything
            /// that is not a syntactically valid UUID.
            pub fn parse(raw: &str) -> Result<Self> {
                Uuid::parse_str(raw).map(Self).map_err(|_| {
                    Error::validation(
                        ErrorCode::InvalidId,
                        format!("{} is not a valid UUID: {raw:?}", stringify!($name)),
                    )
                })
            }

            /// The underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(
    /// Identifier of a note.
    NoteId
);
entity_id!(
    /// Identifier of a tag.
    TagId
);
entity_id!(
    /// Identifier of a revision snapshot.
    RevisionId
);
entity_id!(
    /// Identifier of an asset.
    AssetId
);

// =============================================================================
// VALUE OBJECTS
// =============================================================================

/// A validated tag name.
///
/// Case-sensitive, globally unique by exact name. Charset: ASCII
/// alphanumerics, hyphen, underscore, and CJK scripts. No whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagName(String);

impl TagName {
    /// Validate and wrap a tag name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_tag_name(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A structured rich-text document, stored as an opaque tree of typed nodes.
///
/// The core validates well-formedness only: every node is a JSON object
/// with a string `type` field and, if present, an array `content` field.
/// It never interprets node semantics beyond the plain-text projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteContent(JsonValue);

impl NoteContent {
    /// Validate and wrap a structured document.
    pub fn new(value: JsonValue) -> Result<Self> {
        validate_document_node(&value)?;
        Ok(Self(value))
    }

    /// The empty document a new note starts with.
    pub fn empty() -> Self {
        Self(json!({ "type": "doc", "content": [] }))
    }

    /// Parse a document from its serialized JSON form, failing closed on
    /// anything that does not deserialize or validate.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(raw).map_err(|e| {
            Error::validation(ErrorCode::MalformedContent, format!("invalid JSON: {e}"))
        })?;
        Self::new(value)
    }

    pub fn as_json(&self) -> &JsonValue {
        &self.0
    }

    /// Serialize back to the storage representation.
    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }

    /// Concatenate all `text` leaves, with block nodes separated by
    /// newlines. This projection feeds substring search, hashtag
    /// extraction, and Markdown export.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.0, &mut out);
        out.trim_end().to_string()
    }
}

fn collect_text(node: &JsonValue, out: &mut String) {
    if let Some(text) = node.get("text").and_then(|t| t.as_str()) {
        out.push_str(text);
    }
    if let Some(children) = node.get("content").and_then(|c| c.as_array()) {
        for child in children {
            collect_text(child, out);
        }
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
    }
}

fn validate_document_node(value: &JsonValue) -> Result<()> {
    let obj = value.as_object().ok_or_else(|| {
        Error::validation(
            ErrorCode::MalformedContent,
            "content node must be a JSON object",
        )
    })?;

    match obj.get("type") {
        Some(JsonValue::String(_)) => {}
        _ => {
            return Err(Error::validation(
                ErrorCode::MalformedContent,
                "content node must have a string `type` field",
            ))
        }
    }

    if let Some(content) = obj.get("content") {
        let children = content.as_array().ok_or_else(|| {
            Error::validation(
                ErrorCode::MalformedContent,
                "content node `content` field must be an array",
            )
        })?;
        for child in children {
            validate_document_node(child)?;
        }
    }

    Ok(())
}

/// Auto-save interval in milliseconds, at least 1000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AutoSaveInterval(u32);

impl AutoSaveInterval {
    /// Validate an interval. Values below the minimum are rejected with
    /// `IntervalTooShort`, never silently clamped.
    pub fn new(millis: u32) -> Result<Self> {
        if millis < MIN_AUTO_SAVE_INTERVAL_MS {
            return Err(Error::validation(
                ErrorCode::IntervalTooShort,
                format!("auto-save interval {millis} ms is below the {MIN_AUTO_SAVE_INTERVAL_MS} ms minimum"),
            ));
        }
        Ok(Self(millis))
    }

    pub fn millis(&self) -> u32 {
        self.0
    }
}

impl Default for AutoSaveInterval {
    fn default() -> Self {
        Self(DEFAULT_AUTO_SAVE_INTERVAL_MS)
    }
}

/// Validated asset size in bytes: positive and at most 10 MiB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileSize(i64);

impl FileSize {
    /// Validate a byte count. Zero/negative and over-limit sizes carry
    /// distinct error codes.
    pub fn new(bytes: i64) -> Result<Self> {
        if bytes <= 0 {
            return Err(Error::validation(
                ErrorCode::FileEmpty,
                format!("file size must be positive, got {bytes}"),
            ));
        }
        if bytes > MAX_FILE_SIZE_BYTES {
            return Err(Error::business_rule(
                ErrorCode::FileTooLarge,
                format!("file size {bytes} exceeds the {MAX_FILE_SIZE_BYTES} byte limit"),
            ));
        }
        Ok(Self(bytes))
    }

    pub fn bytes(&self) -> i64 {
        self.0
    }
}

/// A MIME type from the supported image allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MimeType(String);

impl MimeType {
    pub fn new(mime: impl Into<String>) -> Result<Self> {
        let mime = mime.into();
        if !SUPPORTED_IMAGE_MIME_TYPES.contains(&mime.as_str()) {
            return Err(Error::business_rule(
                ErrorCode::UnsupportedMimeType,
                format!("unsupported MIME type: {mime}"),
            ));
        }
        Ok(Self(mime))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Field notes are sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    #[default]
    Created,
    Updated,
}

impl OrderBy {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "created" => Ok(OrderBy::Created),
            "updated" => Ok(OrderBy::Updated),
            _ => Err(Error::business_rule(
                ErrorCode::InvalidOrderBy,
                format!("unknown sort field: {raw:?}"),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::Created => "created",
            OrderBy::Updated => "updated",
        }
    }

    /// The note table column this sort key maps to.
    pub fn column(&self) -> &'static str {
        match self {
            OrderBy::Created => "created_at",
            OrderBy::Updated => "updated_at",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(Error::business_rule(
                ErrorCode::InvalidSortOrder,
                format!("unknown sort direction: {raw:?}"),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

// =============================================================================
// ENTITIES
// =============================================================================

/// A note: identity, opaque structured content, timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub content: NoteContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Create a new note, stamping identity and timestamps.
    pub fn create(content: NoteContent) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::new(),
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrate a note from raw storage fields, re-validating content.
    pub fn reconstruct(
        id: NoteId,
        content_json: &str,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            id,
            content: NoteContent::from_json_str(content_json)?,
            created_at,
            updated_at,
        })
    }
}

/// A tag row. Shared across notes; no note owns a tag exclusively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: TagName,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn create(name: TagName) -> Self {
        Self {
            id: TagId::new(),
            name,
            created_at: Utc::now(),
        }
    }

    pub fn reconstruct(id: TagId, name: &str, created_at: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            id,
            name: TagName::new(name)?,
            created_at,
        })
    }
}

/// A tag with its usage count. The count is always recomputed from the
/// current note links, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagWithUsage {
    #[serde(flatten)]
    pub tag: Tag,
    pub usage_count: i64,
}

/// An append-only content snapshot of a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub id: RevisionId,
    pub note_id: NoteId,
    pub content: NoteContent,
    /// `sha256:`-prefixed hex digest of the serialized content.
    pub content_hash: String,
    pub saved_at: DateTime<Utc>,
}

impl Revision {
    /// Snapshot the given content for a note.
    pub fn create(note_id: NoteId, content: NoteContent) -> Self {
        let content_hash = Self::hash_content(&content);
        Self {
            id: RevisionId::new(),
            note_id,
            content,
            content_hash,
            saved_at: Utc::now(),
        }
    }

    /// Rehydrate a revision, verifying the stored hash against the stored
    /// content. A mismatch means the row is corrupt.
    pub fn reconstruct(
        id: RevisionId,
        note_id: NoteId,
        content_json: &str,
        content_hash: &str,
        saved_at: DateTime<Utc>,
    ) -> Result<Self> {
        let content = NoteContent::from_json_str(content_json)?;
        if Self::hash_content(&content) != content_hash {
            return Err(Error::validation(
                ErrorCode::CorruptRow,
                format!("revision {id} content hash mismatch"),
            ));
        }
        Ok(Self {
            id,
            note_id,
            content,
            content_hash: content_hash.to_string(),
            saved_at,
        })
    }

    /// Compute the SHA256 hash of serialized content.
    pub fn hash_content(content: &NoteContent) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.to_json_string().as_bytes());
        format!("sha256:{}", hex::encode(hasher.finalize()))
    }
}

/// Request for creating an asset; validated by `Asset::create`.
#[derive(Debug, Clone)]
pub struct CreateAssetRequest {
    pub note_id: NoteId,
    /// Storage-relative location, opaque to the core.
    pub file_path: String,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
}

/// A binary attachment owned by a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub note_id: NoteId,
    pub file_path: String,
    pub file_name: String,
    pub file_size: FileSize,
    pub mime_type: MimeType,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    /// Validate the request and stamp identity and creation time.
    pub fn create(req: CreateAssetRequest) -> Result<Self> {
        if req.file_name.trim().is_empty() {
            return Err(Error::validation(
                ErrorCode::MalformedContent,
                "asset file name cannot be empty",
            ));
        }
        Ok(Self {
            id: AssetId::new(),
            note_id: req.note_id,
            file_path: req.file_path,
            file_name: req.file_name,
            file_size: FileSize::new(req.file_size)?,
            mime_type: MimeType::new(req.mime_type)?,
            created_at: Utc::now(),
        })
    }

    pub fn reconstruct(
        id: AssetId,
        note_id: NoteId,
        file_path: &str,
        file_name: &str,
        file_size: i64,
        mime_type: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            id,
            note_id,
            file_path: file_path.to_string(),
            file_name: file_name.to_string(),
            file_size: FileSize::new(file_size)?,
            mime_type: MimeType::new(mime_type)?,
            created_at,
        })
    }
}

/// Singleton user settings, overwritten wholesale on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub order_by: OrderBy,
    pub order: SortOrder,
    pub auto_save_interval: AutoSaveInterval,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            order_by: OrderBy::Created,
            order: SortOrder::Desc,
            auto_save_interval: AutoSaveInterval::default(),
        }
    }
}

impl Settings {
    /// Rehydrate settings from raw storage fields.
    pub fn reconstruct(order_by: &str, order: &str, auto_save_interval_ms: u32) -> Result<Self> {
        Ok(Self {
            order_by: OrderBy::parse(order_by)?,
            order: SortOrder::parse(order)?,
            auto_save_interval: AutoSaveInterval::new(auto_save_interval_ms)?,
        })
    }
}
