//! Annotation orchestration.
//!
//! The annotator owns cross-cutting behavior the storage backends stay out
//! of: cascading reply deletion and bulk operations across the whole
//! document corpus.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use margo_core::{Annotation, AnnotationStore, Result};
use margo_paperless::{Document, PaperlessClient};

/// Orchestrates annotation operations for one Paperless client.
pub struct Annotator {
    client: Arc<PaperlessClient>,
    store: Arc<dyn AnnotationStore>,
}

impl Annotator {
    /// Build an annotator over a client and a configured storage backend.
    pub fn new(client: Arc<PaperlessClient>, store: Arc<dyn AnnotationStore>) -> Self {
        Self { client, store }
    }

    /// Raw content bytes for a document.
    pub async fn download_document(&self, doc_id: i64) -> Result<Vec<u8>> {
        debug!(doc_id, "Downloading document");
        self.client.download_document(doc_id).await
    }

    /// List annotations for a document, optionally only one page.
    pub async fn page_annotations(
        &self,
        doc_id: i64,
        page: Option<i32>,
    ) -> Result<Vec<Annotation>> {
        debug!(doc_id, ?page, "Getting annotations");
        self.store.get_annotations(doc_id, page).await
    }

    /// Create a new annotation for a document.
    pub async fn create_annotation(&self, doc_id: i64, annotation: Annotation) -> Result<Annotation> {
        info!(doc_id, page_index = annotation.page_index, "Creating annotation");
        self.store.create_annotation(doc_id, annotation).await
    }

    /// Update an existing annotation.
    pub async fn update_annotation(&self, doc_id: i64, annotation: Annotation) -> Result<Annotation> {
        info!(doc_id, db_id = ?annotation.db_id, "Updating annotation");
        self.store.update_annotation(doc_id, annotation).await
    }

    /// Delete an annotation and the replies directly under it.
    ///
    /// The cascade is one level deep: replies are matched by `inReplyToId`
    /// on the target's page and deleted independently; replies to those
    /// replies are orphaned, not followed.
    pub async fn delete_annotation(&self, doc_id: i64, annotation: &Annotation) -> Result<bool> {
        info!(doc_id, db_id = ?annotation.db_id, "Deleting annotation");
        let same_page = self
            .store
            .get_annotations(doc_id, Some(annotation.page_index))
            .await?;
        for other in same_page {
            let is_reply = other.db_id != annotation.db_id && other.replies_to(annotation);
            if !is_reply {
                continue;
            }
            if let Some(reply_id) = other.db_id {
                debug!(doc_id, reply_db_id = reply_id, "Deleting reply annotation");
                self.store.delete_annotation_by_id(doc_id, reply_id).await?;
            }
        }

        match annotation.db_id {
            Some(db_id) => self.store.delete_annotation_by_id(doc_id, db_id).await,
            None => Ok(false),
        }
    }

    /// Documents carrying at least one annotation, skipping ids in `skip`.
    ///
    /// This is an O(n) probe per document, stopping at the first annotation
    /// found: the storage layer keeps no reverse index from annotations to
    /// documents.
    pub async fn documents_with_annotations(
        &self,
        skip: &HashSet<i64>,
    ) -> Result<Vec<Document>> {
        info!("Scanning for documents with annotations");
        let mut found = Vec::new();
        let mut pages = self.client.documents();
        while let Some(batch) = pages.next_page().await? {
            for doc in batch {
                if skip.contains(&doc.id) {
                    debug!(doc_id = doc.id, "Skipping document");
                    continue;
                }
                if self.store.has_annotations(doc.id).await? {
                    found.push(doc);
                }
            }
        }
        Ok(found)
    }

    /// Delete every annotation on every document not in `skip`.
    ///
    /// Returns the ids of documents whose annotations were deleted. A
    /// failure on one document leaves its remaining annotations intact and
    /// does not stop the documents after it; nothing is retried.
    pub async fn delete_all_annotations(&self, skip: &HashSet<i64>) -> Result<HashSet<i64>> {
        info!("Starting deletion of all annotations");
        let mut processed = HashSet::new();
        for doc in self.documents_with_annotations(skip).await? {
            if let Err(e) = self.delete_annotations_on(doc.id, &mut processed).await {
                warn!(doc_id = doc.id, error = %e, "Leaving document partially processed");
            }
        }
        info!(count = processed.len(), "Deleted annotations");
        Ok(processed)
    }

    async fn delete_annotations_on(
        &self,
        doc_id: i64,
        processed: &mut HashSet<i64>,
    ) -> Result<()> {
        for annotation in self.store.get_annotations(doc_id, None).await? {
            if let Some(db_id) = annotation.db_id {
                self.store.delete_annotation_by_id(doc_id, db_id).await?;
                processed.insert(doc_id);
            }
        }
        Ok(())
    }
}
