//! Storage abstraction for annotations.
//!
//! The trait defines the contract both persistence backends satisfy, so
//! callers stay backend-agnostic. Selection between backends happens once at
//! startup, not at call time.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Annotation;

/// Persistence backend for annotations.
///
/// Contract, identical for every implementation:
/// - `get_annotations` is a full restart-from-scratch listing. Records that
///   fail to decode are skipped, never aborting the listing.
/// - `create_annotation` assigns `db_id` and returns the stored entity.
/// - `update_annotation` requires `db_id` ([`crate::Error::MissingIdentifier`]
///   otherwise) and fails with [`crate::Error::NotFound`] when the target no
///   longer exists.
/// - `delete_annotation_by_id` reports a missing target as `Ok(false)`.
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    /// List annotations on a document, optionally restricted to one page.
    async fn get_annotations(&self, doc_id: i64, page: Option<i32>) -> Result<Vec<Annotation>>;

    /// True when the document carries at least one annotation.
    ///
    /// The default probes `get_annotations`; backends with an index on the
    /// document id can answer without materializing every record.
    async fn has_annotations(&self, doc_id: i64) -> Result<bool> {
        Ok(!self.get_annotations(doc_id, None).await?.is_empty())
    }

    /// Persist a new annotation, assigning its `db_id`.
    async fn create_annotation(&self, doc_id: i64, annotation: Annotation) -> Result<Annotation>;

    /// Replace a previously stored annotation, addressed by its `db_id`.
    async fn update_annotation(&self, doc_id: i64, annotation: Annotation) -> Result<Annotation>;

    /// Remove one annotation. `Ok(false)` when no such record exists.
    async fn delete_annotation_by_id(&self, doc_id: i64, db_id: i64) -> Result<bool>;
}
