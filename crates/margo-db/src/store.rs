//! Relational annotation storage.
//!
//! Each annotation is one JSONB row. Unlike the notes backend, updates
//! mutate the row in place, so there is no window where an annotation
//! exists in neither form.

use async_trait::async_trait;
use sqlx::Row;
use tracing::{debug, warn};

use margo_core::{Annotation, AnnotationStore, Error, Result};

use crate::pool::Database;

/// [`AnnotationStore`] over the local `annotations` table.
pub struct PgAnnotationStore {
    db: Database,
}

impl PgAnnotationStore {
    /// Create a store over an existing database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn domain_id_column(annotation: &Annotation) -> Option<String> {
        annotation.domain_id().map(|v| match v.as_str() {
            Some(s) => s.to_string(),
            None => v.to_string(),
        })
    }
}

#[async_trait]
impl AnnotationStore for PgAnnotationStore {
    async fn get_annotations(&self, doc_id: i64, page: Option<i32>) -> Result<Vec<Annotation>> {
        let rows = match page {
            Some(page) => {
                sqlx::query(
                    "SELECT id, anno FROM annotations \
                     WHERE doc_id = $1 AND page_index = $2 ORDER BY id",
                )
                .bind(doc_id)
                .bind(page)
                .fetch_all(self.db.pool())
                .await
                .map_err(Error::Database)?
            }
            None => {
                sqlx::query("SELECT id, anno FROM annotations WHERE doc_id = $1 ORDER BY id")
                    .bind(doc_id)
                    .fetch_all(self.db.pool())
                    .await
                    .map_err(Error::Database)?
            }
        };

        let mut annotations = Vec::new();
        for row in rows {
            let id: i64 = row.get("id");
            let payload: serde_json::Value = row.get("anno");
            match Annotation::from_value(payload) {
                Ok(mut annotation) => {
                    annotation.db_id = Some(id);
                    annotations.push(annotation);
                }
                Err(e) => {
                    warn!(doc_id, row_id = id, error = %e, "Skipping undecodable annotation row");
                }
            }
        }
        debug!(doc_id, count = annotations.len(), "Listed annotations");
        Ok(annotations)
    }

    async fn has_annotations(&self, doc_id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM annotations WHERE doc_id = $1) AS present")
            .bind(doc_id)
            .fetch_one(self.db.pool())
            .await
            .map_err(Error::Database)?;
        Ok(row.get("present"))
    }

    async fn create_annotation(&self, doc_id: i64, annotation: Annotation) -> Result<Annotation> {
        annotation.validate()?;
        let payload = annotation.to_value()?;
        let row = sqlx::query(
            "INSERT INTO annotations (doc_id, domain_id, page_index, anno) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(doc_id)
        .bind(Self::domain_id_column(&annotation))
        .bind(annotation.page_index)
        .bind(&payload)
        .fetch_one(self.db.pool())
        .await
        .map_err(Error::Database)?;

        let mut created = annotation;
        created.db_id = Some(row.get("id"));
        Ok(created)
    }

    async fn update_annotation(&self, doc_id: i64, annotation: Annotation) -> Result<Annotation> {
        annotation.validate()?;
        let db_id = annotation.db_id.ok_or(Error::MissingIdentifier)?;
        let payload = annotation.to_value()?;

        let result = sqlx::query(
            "UPDATE annotations SET domain_id = $1, page_index = $2, anno = $3 \
             WHERE id = $4 AND doc_id = $5",
        )
        .bind(Self::domain_id_column(&annotation))
        .bind(annotation.page_index)
        .bind(&payload)
        .bind(db_id)
        .bind(doc_id)
        .execute(self.db.pool())
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!(
                "annotation with db_id {db_id} on document {doc_id}"
            )));
        }
        Ok(annotation)
    }

    async fn delete_annotation_by_id(&self, doc_id: i64, db_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM annotations WHERE id = $1 AND doc_id = $2")
            .bind(db_id)
            .bind(doc_id)
            .execute(self.db.pool())
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
