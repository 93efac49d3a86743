use quill_core::{Error, Note, NoteContent, NoteId, NoteRepository};
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

/// Insert then fetch returns an equal note.
#[tokio::test]
async fn test_insert_and_fetch_round_trip() {
    let db = Database::connect_memory().await.expect("connect");

    let note = Note::create(doc("hello #world"));
    db.notes.insert(&note).await.expect("insert");

    let fetched = db.notes.fetch(note.id).await.expect("fetch");
    assert_eq!(fetched.id, note.id);
    assert_eq!(fetched.content, note.content);
}

#[tokio::test]
async fn test_fetch_missing_note_fails_with_not_found() {
    let db = Database::connect_memory().await.expect("connect");

    let missing = NoteId::new();
    let err = db.notes.fetch(missing).await.unwrap_err();
    assert!(matches!(err, Error::NoteNotFound(id) if id == missing));
}

/// Updating content replaces the document and bumps `updated_at`.
#[tokio::test]
async fn test_update_content_bumps_updated_at() {
    let db = Database::connect_memory().await.expect("connect");

    let note = Note::create(doc("first draft"));
    db.notes.insert(&note).await.expect("insert");

    let revised = doc("second draft");
    db.notes
        .update_content(note.id, &revised)
        .await
        .expect("update");

    let fetched = db.notes.fetch(note.id).await.expect("fetch");
    assert_eq!(fetched.content, revised);
    assert!(fetched.updated_at >= note.updated_at);
}

#[tokio::test]
async fn test_update_missing_note_fails_with_not_found() {
    let db = Database::connect_memory().await.expect("connect");

    let err = db
        .notes
        .update_content(NoteId::new(), &doc("ghost"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoteNotFound(_)));
}

#[tokio::test]
async fn test_delete_note_removes_it() {
    let db = Database::connect_memory().await.expect("connect");

    let note = Note::create(doc("short lived"));
    db.notes.insert(&note).await.expect("insert");
    assert!(db.notes.exists(note.id).await.expect("exists"));

    db.notes.delete(note.id).await.expect("delete");
    assert!(!db.notes.exists(note.id).await.expect("exists"));

    let err = db.notes.delete(note.id).await.unwrap_err();
    assert!(matches!(err, Error::NoteNotFound(_)));
}

#[tokio::test]
async fn test_list_ids_returns_all_notes() {
    let db = Database::connect_memory().await.expect("connect");

    for i in 0..3 {
        let note = Note::create(doc(&format!("note {i}")));
        db.notes.insert(&note).await.expect("insert");
    }

    let ids = db.notes.list_ids().await.expect("list");
    assert_eq!(ids.len(), 3);
}
