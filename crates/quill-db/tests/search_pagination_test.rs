use chrono::{Duration, Utc};
use quill_core::{
    Note, NoteContent, NoteId, NoteRepository, OrderBy, SearchNotesRequest, SearchProvider,
    SortOrder, TagName, TagRepository,
};
use quill_db::Database;
use serde_json::json;

fn doc(text: &str) -> NoteContent {
    NoteContent::new(json!({
        "type": "doc",
        "content": [
            { "type": "paragraph", "content": [ { "type": "text", "text": text } ] }
        ]
    }))
    .expect("valid document")
}

/// A note with controlled timestamps, for deterministic ordering.
fn note_at(text: &str, minutes_ago: i64) -> Note {
    let at = Utc::now() - Duration::minutes(minutes_ago);
    Note::reconstruct(NoteId::new(), &doc(text).to_json_string(), at, at)
        .expect("reconstruct")
}

/// 45 notes, page size 20: pages hold 20, 20, 5, 0, with total 45 on each.
#[tokio::test]
async fn test_pagination_windows() {
    let db = Database::connect_memory().await.expect("connect");

    for i in 0..45 {
        db.notes
            .insert(&note_at(&format!("note {i}"), i))
            .await
            .expect("insert");
    }

    let page = |n: u32| SearchNotesRequest {
        page: n,
        page_size: 20,
        ..Default::default()
    };

    let first = db.search.search(page(1)).await.expect("page 1");
    assert_eq!(first.items.len(), 20);
    assert_eq!(first.total, 45);

    let second = db.search.search(page(2)).await.expect("page 2");
    assert_eq!(second.items.len(), 20);
    assert_eq!(second.total, 45);

    let third = db.search.search(page(3)).await.expect("page 3");
    assert_eq!(third.items.len(), 5);
    assert_eq!(third.total, 45);

    let fourth = db.search.search(page(4)).await.expect("page 4");
    assert!(fourth.items.is_empty());
    assert_eq!(fourth.total, 45);
}

/// Free-text filter matches substrings of the plain-text projection.
#[tokio::test]
async fn test_text_filter_matches_substring() {
    let db = Database::connect_memory().await.expect("connect");

    db.notes
        .insert(&note_at("groceries: milk and eggs", 2))
        .await
        .expect("insert");
    db.notes
        .insert(&note_at("meeting agenda", 1))
        .await
        .expect("insert");

    let result = db
        .search
        .search(SearchNotesRequest {
            query: "milk".to_string(),
            ..Default::default()
        })
        .await
        .expect("search");

    assert_eq!(result.total, 1);
    assert_eq!(result.items.len(), 1);
    assert!(result.items[0].content.to_plain_text().contains("milk"));
}

/// LIKE wildcards in the query are treated literally.
#[tokio::test]
async fn test_text_filter_escapes_wildcards() {
    let db = Database::connect_memory().await.expect("connect");

    db.notes
        .insert(&note_at("progress: 100% done", 2))
        .await
        .expect("insert");
    db.notes
        .insert(&note_at("progress: 100 tasks done", 1))
        .await
        .expect("insert");

    let result = db
        .search
        .search(SearchNotesRequest {
            query: "100%".to_string(),
            ..Default::default()
        })
        .await
        .expect("search");

    assert_eq!(result.total, 1);
}

/// Tag filter is an intersection: a note must carry every listed tag.
#[tokio::test]
async fn test_tag_filter_requires_all_tags() {
    let db = Database::connect_memory().await.expect("connect");

    let n1 = note_at("both", 3);
    let n2 = note_at("only a", 2);
    let n3 = note_at("only b", 1);
    for n in [&n1, &n2, &n3] {
        db.notes.insert(n).await.expect("insert");
    }

    let a = db
        .tags
        .find_or_create(&TagName::new("a").expect("name"))
        .await
        .expect("tag a");
    let b = db
        .tags
        .find_or_create(&TagName::new("b").expect("name"))
        .await
        .expect("tag b");

    db.tags.link(n1.id, a.id).await.expect("link");
    db.tags.link(n1.id, b.id).await.expect("link");
    db.tags.link(n2.id, a.id).await.expect("link");
    db.tags.link(n3.id, b.id).await.expect("link");

    let result = db
        .search
        .search(SearchNotesRequest {
            tag_ids: vec![a.id, b.id],
            ..Default::default()
        })
        .await
        .expect("search");

    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].id, n1.id);
}

/// Text and tag filters combine with AND.
#[tokio::test]
async fn test_combined_text_and_tag_filter() {
    let db = Database::connect_memory().await.expect("connect");

    let tagged_match = note_at("project kickoff", 2);
    let tagged_miss = note_at("weekly review", 1);
    db.notes.insert(&tagged_match).await.expect("insert");
    db.notes.insert(&tagged_miss).await.expect("insert");

    let work = db
        .tags
        .find_or_create(&TagName::new("work").expect("name"))
        .await
        .expect("tag");
    db.tags.link(tagged_match.id, work.id).await.expect("link");
    db.tags.link(tagged_miss.id, work.id).await.expect("link");

    let result = db
        .search
        .search(SearchNotesRequest {
            query: "kickoff".to_string(),
            tag_ids: vec![work.id],
            ..Default::default()
        })
        .await
        .expect("search");

    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].id, tagged_match.id);
}

/// Sort field and direction are honored.
#[tokio::test]
async fn test_sort_by_created_ascending() {
    let db = Database::connect_memory().await.expect("connect");

    let oldest = note_at("oldest", 30);
    let middle = note_at("middle", 20);
    let newest = note_at("newest", 10);
    for n in [&middle, &newest, &oldest] {
        db.notes.insert(n).await.expect("insert");
    }

    let result = db
        .search
        .search(SearchNotesRequest {
            order_by: OrderBy::Created,
            order: SortOrder::Asc,
            ..Default::default()
        })
        .await
        .expect("search");

    let ids: Vec<_> = result.items.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![oldest.id, middle.id, newest.id]);
}

#[tokio::test]
async fn test_default_sort_is_created_descending() {
    let db = Database::connect_memory().await.expect("connect");

    let older = note_at("older", 20);
    let newer = note_at("newer", 10);
    db.notes.insert(&older).await.expect("insert");
    db.notes.insert(&newer).await.expect("insert");

    let result = db
        .search
        .search(SearchNotesRequest::default())
        .await
        .expect("search");

    let ids: Vec<_> = result.items.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

#[tokio::test]
async fn test_invalid_page_is_rejected_before_touching_storage() {
    let db = Database::connect_memory().await.expect("connect");

    let err = db
        .search
        .search(SearchNotesRequest {
            page: 0,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(
        err.code(),
        Some(quill_core::ErrorCode::InvalidPage)
    );
}
