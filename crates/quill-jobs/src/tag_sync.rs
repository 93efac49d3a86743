//! Note persistence with tag synchronization.
//!
//! Saving a note and reconciling its tag links must land together: a
//! half-applied save would leave the stored tags disagreeing with the
//! stored text. Every save here runs inside one unit of work, touching
//! only tags whose membership actually changed, then requests a debounced
//! orphan sweep when links were removed.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use quill_core::{
    Note, NoteContent, NoteId, NoteRepository, Result, Revision, RevisionRepository, TagExtractor,
    TagName,
};
use quill_db::{Database, SqliteNoteRepository, SqliteTagRepository};

use crate::cleanup::CleanupScheduler;

/// What a save changed about a note's tag links. Names are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSyncOutcome {
    /// Tag names newly linked to the note.
    pub linked: Vec<String>,
    /// Tag names unlinked from the note.
    pub unlinked: Vec<String>,
}

impl TagSyncOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.linked.is_empty() && self.unlinked.is_empty()
    }
}

/// Service coordinating note writes, tag reconciliation, revisions, and
/// cleanup scheduling.
#[derive(Clone)]
pub struct NoteSyncService {
    db: Database,
    extractor: Arc<dyn TagExtractor>,
    scheduler: CleanupScheduler,
}

impl NoteSyncService {
    pub fn new(db: Database, extractor: Arc<dyn TagExtractor>, scheduler: CleanupScheduler) -> Self {
        Self {
            db,
            extractor,
            scheduler,
        }
    }

    /// Tag names present in the content, validated. An extracted token
    /// that fails name validation (over-long, in practice) is skipped
    /// rather than failing the save.
    fn extract_tag_names(&self, content: &NoteContent) -> Result<Vec<TagName>> {
        let raw = self.extractor.extract(&content.to_plain_text())?;
        let mut names = Vec::with_capacity(raw.len());
        for candidate in raw {
            match TagName::new(&candidate) {
                Ok(name) => names.push(name),
                Err(err) => {
                    warn!(
                        subsystem = "jobs",
                        component = "tag_sync",
                        op = "extract",
                        error = %err,
                        "Skipping extracted tag that failed validation"
                    );
                }
            }
        }
        Ok(names)
    }

    /// Create a note, linking every tag its content mentions, atomically.
    pub async fn create(&self, content: NoteContent) -> Result<Note> {
        let note = Note::create(content);
        let tag_names = self.extract_tag_names(&note.content)?;

        let stored = note.clone();
        self.db
            .unit_of_work()
            .run(|tx| {
                Box::pin(async move {
                    SqliteNoteRepository::insert_tx(&stored, tx).await?;
                    for name in &tag_names {
                        let tag = SqliteTagRepository::find_or_create_tx(name, tx).await?;
                        SqliteTagRepository::link_tx(stored.id, tag.id, tx).await?;
                    }
                    Ok(())
                })
            })
            .await?;

        Ok(note)
    }

    /// Save new content for a note and reconcile its tag links.
    ///
    /// Links are diffed against the extracted names: tags present in both
    /// old and new content keep their existing link rows untouched. When
    /// any link was removed, a debounced orphan sweep is requested.
    pub async fn save_content(
        &self,
        note_id: NoteId,
        content: NoteContent,
    ) -> Result<TagSyncOutcome> {
        let desired = self.extract_tag_names(&content)?;

        let outcome = self
            .db
            .unit_of_work()
            .run(|tx| {
                Box::pin(async move {
                    SqliteNoteRepository::update_content_tx(note_id, &content, tx).await?;

                    let current = SqliteTagRepository::tags_for_note_tx(note_id, tx).await?;
                    let current_names: HashSet<&str> =
                        current.iter().map(|t| t.name.as_str()).collect();
                    let desired_names: HashSet<&str> =
                        desired.iter().map(|n| n.as_str()).collect();

                    let mut outcome = TagSyncOutcome::default();

                    for name in &desired {
                        if !current_names.contains(name.as_str()) {
                            let tag = SqliteTagRepository::find_or_create_tx(name, tx).await?;
                            SqliteTagRepository::link_tx(note_id, tag.id, tx).await?;
                            outcome.linked.push(name.as_str().to_string());
                        }
                    }

                    for tag in &current {
                        if !desired_names.contains(tag.name.as_str()) {
                            SqliteTagRepository::unlink_tx(note_id, tag.id, tx).await?;
                            outcome.unlinked.push(tag.name.as_str().to_string());
                        }
                    }

                    outcome.linked.sort();
                    outcome.unlinked.sort();
                    Ok(outcome)
                })
            })
            .await?;

        if !outcome.is_unchanged() {
            debug!(
                subsystem = "jobs",
                component = "tag_sync",
                op = "save",
                linked = outcome.linked.len(),
                unlinked = outcome.unlinked.len(),
                "Tag links reconciled"
            );
        }
        if !outcome.unlinked.is_empty() {
            self.scheduler.schedule().await;
        }

        Ok(outcome)
    }

    /// Snapshot a note's current content as a revision.
    pub async fn checkpoint(&self, note_id: NoteId) -> Result<Revision> {
        let note = self.db.notes.fetch(note_id).await?;
        let revision = Revision::create(note.id, note.content);
        self.db.revisions.insert(&revision).await?;
        Ok(revision)
    }

    /// Delete a note. Child rows go with it via cascade; the tags it
    /// referenced may now be orphaned, so a sweep is requested.
    pub async fn delete_note(&self, note_id: NoteId) -> Result<()> {
        self.db.notes.delete(note_id).await?;
        self.scheduler.schedule().await;
        Ok(())
    }
}
