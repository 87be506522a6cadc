//! Document link synchronization.
//!
//! Every document gets a custom field whose value is the canonical URL of
//! its annotation view. The corpus drifts (documents added, fields edited,
//! the external index eventually consistent), so synchronization is an
//! idempotent scan-and-repair pass rather than a one-shot write.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info};

use margo_core::{defaults, MargoConfig, Result};
use margo_paperless::{CustomField, CustomFieldQuery, PaperlessClient};

/// Process-wide cache of the resolved link custom field.
///
/// One deployment uses one field name, so a single cell is enough. The cell
/// serializes racing first resolvers: the field is looked up or created at
/// most once per process, even when several scans start simultaneously.
#[derive(Default)]
pub struct FieldCache {
    cell: OnceCell<CustomField>,
}

impl FieldCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the field through `client`, creating it when absent. The
    /// first successful resolution is cached for the process lifetime.
    pub async fn get_or_resolve(
        &self,
        client: &PaperlessClient,
        name: &str,
    ) -> Result<CustomField> {
        let field = self
            .cell
            .get_or_try_init(|| async {
                match client.custom_field_by_name(name).await? {
                    Some(cf) => {
                        debug!(name, id = cf.id, "Found existing custom field");
                        Ok(cf)
                    }
                    None => {
                        client
                            .create_custom_field(name, defaults::CUSTOM_FIELD_DATA_TYPE)
                            .await
                    }
                }
            })
            .await?;
        Ok(field.clone())
    }
}

/// Maintains the link custom field for one client/token.
pub struct LinkSync {
    client: Arc<PaperlessClient>,
    field_name: String,
    base_url: String,
    cache: Arc<FieldCache>,
    stale_predicate: Option<CustomFieldQuery>,
}

impl LinkSync {
    /// Build a synchronizer with its own field cache.
    pub fn new(client: Arc<PaperlessClient>, config: &MargoConfig) -> Self {
        Self::with_cache(client, config, Arc::new(FieldCache::new()))
    }

    /// Build a synchronizer sharing `cache` with other synchronizers, so a
    /// multi-user scan resolves the field once.
    pub fn with_cache(
        client: Arc<PaperlessClient>,
        config: &MargoConfig,
        cache: Arc<FieldCache>,
    ) -> Self {
        Self {
            client,
            field_name: config.custom_field_name.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache,
            stale_predicate: None,
        }
    }

    /// Replace the staleness predicate used to find outdated links.
    ///
    /// The default is a case-insensitive prefix check against the viewer
    /// URL: an approximation of "link is current", not an exact match.
    pub fn with_stale_predicate(mut self, query: CustomFieldQuery) -> Self {
        self.stale_predicate = Some(query);
        self
    }

    /// Canonical viewer URL stored on a document.
    pub fn viewer_url(&self, doc_id: i64) -> String {
        format!("{}{}{doc_id}", self.base_url, defaults::VIEWER_PATH)
    }

    fn viewer_prefix(&self) -> String {
        format!("{}{}", self.base_url, defaults::VIEWER_PATH)
    }

    fn missing_query(&self) -> CustomFieldQuery {
        CustomFieldQuery::not_exists(&self.field_name)
    }

    fn stale_query(&self) -> CustomFieldQuery {
        self.stale_predicate.clone().unwrap_or_else(|| {
            CustomFieldQuery::istartswith(&self.field_name, self.viewer_prefix()).negate()
        })
    }

    /// One scan: attach missing links, then repair outdated ones.
    ///
    /// `docs_to_skip` holds ids already handled earlier in the same broader
    /// cycle (other users' scans). The returned set holds ids touched by
    /// this invocation. The external index is eventually consistent, so a
    /// document can match both queries in one scan; the local skip
    /// accounting makes sure it is written once, not twice.
    pub async fn update_document_links(
        &self,
        docs_to_skip: &HashSet<i64>,
    ) -> Result<HashSet<i64>> {
        let field = self
            .cache
            .get_or_resolve(&self.client, &self.field_name)
            .await?;
        let mut touched = HashSet::new();

        let mut pages = self.client.documents_filtered(&self.missing_query());
        while let Some(batch) = pages.next_page().await? {
            for doc in batch {
                if docs_to_skip.contains(&doc.id) || touched.contains(&doc.id) {
                    continue;
                }
                info!(doc_id = doc.id, "Adding missing link");
                self.client
                    .set_custom_field(&doc, field.id, self.viewer_url(doc.id))
                    .await?;
                touched.insert(doc.id);
            }
        }

        let mut pages = self.client.documents_filtered(&self.stale_query());
        while let Some(batch) = pages.next_page().await? {
            for doc in batch {
                if docs_to_skip.contains(&doc.id) || touched.contains(&doc.id) {
                    continue;
                }
                info!(doc_id = doc.id, "Repairing outdated link");
                self.client
                    .set_custom_field(&doc, field.id, self.viewer_url(doc.id))
                    .await?;
                touched.insert(doc.id);
            }
        }

        Ok(touched)
    }

    /// Remove the link field instance from every document carrying it.
    /// Returns how many documents were stripped.
    pub async fn delete_all_document_links(&self) -> Result<u64> {
        let field = self
            .cache
            .get_or_resolve(&self.client, &self.field_name)
            .await?;
        let mut removed = 0;
        let mut pages = self
            .client
            .documents_filtered(&CustomFieldQuery::exists(&self.field_name));
        while let Some(batch) = pages.next_page().await? {
            for doc in batch {
                self.client.remove_custom_field(&doc, field.id).await?;
                removed += 1;
            }
        }
        info!(removed, "Removed document links");
        Ok(removed)
    }
}
