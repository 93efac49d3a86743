use quill_core::{Error, Note, NoteContent, TagId, TagName, TagRepository};
use quill_db::Database;
use serde_json::json;

use quill_core::NoteRepository;

fn doc(text: &str) -> NoteContent {
    NoteContent::new(json!({
        "type": "doc",
        "content": [
            { "type": "paragraph", "content": [ { "type": "text", "text": text } ] }
        ]
    }))
    .expect("valid document")
}

fn tag(name: &str) -> TagName {
    TagName::new(name).expect("valid tag name")
}

/// find_or_create returns the same row for the same name.
#[tokio::test]
async fn test_find_or_create_is_idempotent() {
    let db = Database::connect_memory().await.expect("connect");

    let first = db.tags.find_or_create(&tag("rust")).await.expect("create");
    let second = db.tags.find_or_create(&tag("rust")).await.expect("reuse");
    assert_eq!(first.id, second.id);
}

/// Tag names are case-sensitive; "Rust" and "rust" are distinct tags.
#[tokio::test]
async fn test_tag_names_are_case_sensitive() {
    let db = Database::connect_memory().await.expect("connect");

    let lower = db.tags.find_or_create(&tag("rust")).await.expect("lower");
    let upper = db.tags.find_or_create(&tag("Rust")).await.expect("upper");
    assert_ne!(lower.id, upper.id);

    let found = db
        .tags
        .find_by_name(&tag("Rust"))
        .await
        .expect("find_by_name");
    assert_eq!(found.map(|t| t.id), Some(upper.id));
}

#[tokio::test]
async fn test_find_by_name_returns_none_for_unknown() {
    let db = Database::connect_memory().await.expect("connect");

    let found = db.tags.find_by_name(&tag("nope")).await.expect("lookup");
    assert!(found.is_none());
}

#[tokio::test]
async fn test_fetch_missing_tag_fails_with_not_found() {
    let db = Database::connect_memory().await.expect("connect");

    let err = db.tags.fetch(TagId::new()).await.unwrap_err();
    assert!(matches!(err, Error::TagNotFound(_)));
}

/// Linking is idempotent and tags_for_note comes back ordered by name.
#[tokio::test]
async fn test_link_and_list_tags_for_note() {
    let db = Database::connect_memory().await.expect("connect");

    let note = Note::create(doc("tagged"));
    db.notes.insert(&note).await.expect("insert note");

    let zebra = db.tags.find_or_create(&tag("zebra")).await.expect("zebra");
    let apple = db.tags.find_or_create(&tag("apple")).await.expect("apple");

    db.tags.link(note.id, zebra.id).await.expect("link zebra");
    db.tags.link(note.id, apple.id).await.expect("link apple");
    db.tags
        .link(note.id, apple.id)
        .await
        .expect("duplicate link is a no-op");

    let tags = db.tags.tags_for_note(note.id).await.expect("list");
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["apple", "zebra"]);
}

/// Usage counts are recomputed from live links.
#[tokio::test]
async fn test_list_with_usage_counts_links() {
    let db = Database::connect_memory().await.expect("connect");

    let a = Note::create(doc("a"));
    let b = Note::create(doc("b"));
    db.notes.insert(&a).await.expect("insert a");
    db.notes.insert(&b).await.expect("insert b");

    let shared = db.tags.find_or_create(&tag("shared")).await.expect("shared");
    let lonely = db.tags.find_or_create(&tag("lonely")).await.expect("lonely");

    db.tags.link(a.id, shared.id).await.expect("link");
    db.tags.link(b.id, shared.id).await.expect("link");

    let listing = db.tags.list_with_usage().await.expect("list");
    let by_name = |name: &str| {
        listing
            .iter()
            .find(|t| t.tag.name.as_str() == name)
            .map(|t| t.usage_count)
    };
    assert_eq!(by_name("shared"), Some(2));
    assert_eq!(by_name("lonely"), Some(0));
}

/// delete_unused removes only tags with zero remaining links.
#[tokio::test]
async fn test_delete_unused_sweeps_orphans() {
    let db = Database::connect_memory().await.expect("connect");

    let note = Note::create(doc("keeper"));
    db.notes.insert(&note).await.expect("insert");

    let kept = db.tags.find_or_create(&tag("kept")).await.expect("kept");
    db.tags.find_or_create(&tag("orphan1")).await.expect("o1");
    db.tags.find_or_create(&tag("orphan2")).await.expect("o2");
    db.tags.link(note.id, kept.id).await.expect("link");

    let deleted = db.tags.delete_unused().await.expect("sweep");
    assert_eq!(deleted, 2);

    let remaining = db.tags.list_with_usage().await.expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].tag.name.as_str(), "kept");
}

#[tokio::test]
async fn test_unlink_then_sweep_removes_tag() {
    let db = Database::connect_memory().await.expect("connect");

    let note = Note::create(doc("fickle"));
    db.notes.insert(&note).await.expect("insert");

    let t = db.tags.find_or_create(&tag("fleeting")).await.expect("tag");
    db.tags.link(note.id, t.id).await.expect("link");
    db.tags.unlink(note.id, t.id).await.expect("unlink");

    let deleted = db.tags.delete_unused().await.expect("sweep");
    assert_eq!(deleted, 1);
}
