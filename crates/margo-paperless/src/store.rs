//! Notes-backed annotation storage.
//!
//! Stores each annotation as one encoded note on its document. Paperless has
//! no in-place note edit, so updates are delete-then-recreate; a failure
//! between the two steps leaves the annotation deleted. That window is part
//! of this backend's contract, not something it papers over.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use margo_core::{Annotation, AnnotationStore, Error, NoteCodec, Result};

use crate::client::PaperlessClient;

/// [`AnnotationStore`] over Paperless document notes.
pub struct NotesAnnotationStore {
    client: Arc<PaperlessClient>,
    codec: NoteCodec,
}

impl NotesAnnotationStore {
    /// Build a store writing through `codec` on `client`.
    pub fn new(client: Arc<PaperlessClient>, codec: NoteCodec) -> Self {
        Self { client, codec }
    }
}

#[async_trait]
impl AnnotationStore for NotesAnnotationStore {
    async fn get_annotations(&self, doc_id: i64, page: Option<i32>) -> Result<Vec<Annotation>> {
        let notes = self.client.document_notes(doc_id).await?;
        let mut annotations = Vec::new();
        for note in notes {
            match NoteCodec::decode(&note.note) {
                Ok(Some(mut annotation)) => {
                    annotation.db_id = Some(note.id);
                    if page.is_none() || page == Some(annotation.page_index) {
                        annotations.push(annotation);
                    }
                }
                // A human-authored note, not ours.
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        doc_id,
                        note_id = note.id,
                        error = %e,
                        "Skipping undecodable note during listing"
                    );
                }
            }
        }
        debug!(doc_id, count = annotations.len(), "Listed annotations");
        Ok(annotations)
    }

    async fn create_annotation(&self, doc_id: i64, annotation: Annotation) -> Result<Annotation> {
        annotation.validate()?;
        let content = self.codec.encode(&annotation)?;
        let note = self.client.add_note(doc_id, &content).await?;
        let mut created = annotation;
        created.db_id = Some(note.id);
        Ok(created)
    }

    async fn update_annotation(&self, doc_id: i64, annotation: Annotation) -> Result<Annotation> {
        annotation.validate()?;
        let old_id = annotation.db_id.ok_or(Error::MissingIdentifier)?;
        // Encode before touching the old note so a codec failure cannot
        // destroy the only stored copy.
        let content = self.codec.encode(&annotation)?;

        if !self.client.delete_note(doc_id, old_id).await? {
            return Err(Error::NotFound(format!(
                "annotation with db_id {old_id} on document {doc_id}"
            )));
        }

        let note = self.client.add_note(doc_id, &content).await?;
        let mut updated = annotation;
        updated.db_id = Some(note.id);
        Ok(updated)
    }

    async fn delete_annotation_by_id(&self, doc_id: i64, db_id: i64) -> Result<bool> {
        self.client.delete_note(doc_id, db_id).await
    }
}
