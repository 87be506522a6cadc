//! Paperless-ngx REST client.
//!
//! One client per (server, API token) pair. All calls are sequential and
//! blocking on the wire; the only timeout is the per-request HTTP timeout.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};

use margo_core::{defaults, Error, Result};

use crate::models::{CustomField, CustomFieldInstance, Document, Note, Paginated};
use crate::query::CustomFieldQuery;

/// Client for the Paperless-ngx REST API.
pub struct PaperlessClient {
    http: Client,
    base_url: String,
}

impl PaperlessClient {
    /// Create a client authenticating with `Token <api_token>`.
    pub fn new(base_url: impl Into<String>, api_token: &str) -> Result<Self> {
        Self::with_timeout(
            base_url,
            api_token,
            Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
        )
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_token: &str,
        timeout: Duration,
    ) -> Result<Self> {
        if api_token.is_empty() {
            return Err(Error::Config("paperless api token is required".to_string()));
        }

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Token {api_token}"))
            .map_err(|_| Error::Config("paperless api token is not a valid header value".to_string()))?;
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(Error::from)?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(%base_url, "Initialized Paperless client");

        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .query(params)
            .send()
            .await
            .map_err(|e| Error::Request(format!("GET {path} failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Request(format!(
                "Paperless returned {status} for GET {path}: {body}"
            )));
        }
        response.json::<T>().await.map_err(Error::from)
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    /// All documents, one page at a time.
    pub fn documents(&self) -> DocumentPages<'_> {
        DocumentPages {
            client: self,
            query: None,
            page: 1,
            done: false,
        }
    }

    /// Documents matching a custom-field predicate, one page at a time.
    pub fn documents_filtered(&self, query: &CustomFieldQuery) -> DocumentPages<'_> {
        DocumentPages {
            client: self,
            query: Some(query.to_query_param()),
            page: 1,
            done: false,
        }
    }

    /// Metadata for one document.
    pub async fn document(&self, doc_id: i64) -> Result<Document> {
        self.get_json(&format!("api/documents/{doc_id}/"), &[]).await
    }

    /// Raw content bytes of one document.
    pub async fn download_document(&self, doc_id: i64) -> Result<Vec<u8>> {
        let path = format!("api/documents/{doc_id}/download/");
        let response = self
            .http
            .get(self.url(&path))
            .send()
            .await
            .map_err(|e| Error::Request(format!("GET {path} failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Request(format!(
                "Paperless returned {status} for GET {path}"
            )));
        }
        Ok(response.bytes().await.map_err(Error::from)?.to_vec())
    }

    // ------------------------------------------------------------------
    // Notes
    // ------------------------------------------------------------------

    /// All notes on a document.
    pub async fn document_notes(&self, doc_id: i64) -> Result<Vec<Note>> {
        self.get_json(&format!("api/documents/{doc_id}/notes/"), &[])
            .await
    }

    /// Append a note, returning the created record.
    ///
    /// Paperless answers with the full note list; the highest id is the one
    /// this call appended.
    pub async fn add_note(&self, doc_id: i64, note: &str) -> Result<Note> {
        let path = format!("api/documents/{doc_id}/notes/");
        let response = self
            .http
            .post(self.url(&path))
            .json(&json!({ "note": note }))
            .send()
            .await
            .map_err(|e| Error::Request(format!("POST {path} failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Request(format!(
                "Paperless returned {status} for POST {path}: {body}"
            )));
        }
        let notes: Vec<Note> = response.json().await.map_err(Error::from)?;
        notes
            .into_iter()
            .max_by_key(|n| n.id)
            .ok_or_else(|| Error::Request(format!("POST {path} returned no notes")))
    }

    /// Delete a note. `Ok(false)` when the note does not exist.
    pub async fn delete_note(&self, doc_id: i64, note_id: i64) -> Result<bool> {
        let path = format!("api/documents/{doc_id}/notes/");
        let response = self
            .http
            .delete(self.url(&path))
            .query(&[("id", note_id.to_string())])
            .send()
            .await
            .map_err(|e| Error::Request(format!("DELETE {path} failed: {e}")))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Request(format!(
                "Paperless returned {status} for DELETE {path}: {body}"
            )));
        }
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Custom fields
    // ------------------------------------------------------------------

    /// One page of global custom field definitions.
    pub async fn custom_fields(&self, page: u32) -> Result<Paginated<CustomField>> {
        self.get_json("api/custom_fields/", &[("page", page.to_string())])
            .await
    }

    /// Find a custom field definition by name, first match wins.
    pub async fn custom_field_by_name(&self, name: &str) -> Result<Option<CustomField>> {
        let mut page = 1;
        loop {
            let payload = self.custom_fields(page).await?;
            if let Some(cf) = payload.results.into_iter().find(|cf| cf.name == name) {
                return Ok(Some(cf));
            }
            if payload.next.is_none() {
                return Ok(None);
            }
            page += 1;
        }
    }

    /// Create a global custom field definition.
    pub async fn create_custom_field(&self, name: &str, data_type: &str) -> Result<CustomField> {
        let path = "api/custom_fields/";
        info!(name, data_type, "Creating custom field");
        let response = self
            .http
            .post(self.url(path))
            .json(&json!({ "name": name, "data_type": data_type }))
            .send()
            .await
            .map_err(|e| Error::Request(format!("POST {path} failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Request(format!(
                "Paperless returned {status} for POST {path}: {body}"
            )));
        }
        response.json::<CustomField>().await.map_err(Error::from)
    }

    /// Delete a global custom field definition.
    pub async fn delete_custom_field(&self, field_id: i64) -> Result<()> {
        let path = format!("api/custom_fields/{field_id}/");
        let response = self
            .http
            .delete(self.url(&path))
            .send()
            .await
            .map_err(|e| Error::Request(format!("DELETE {path} failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Request(format!(
                "Paperless returned {status} for DELETE {path}: {body}"
            )));
        }
        Ok(())
    }

    /// Set a custom field value on a document.
    ///
    /// Upserts into the instance array, then PATCHes the full replacement,
    /// keeping at most one instance per (document, field) pair.
    pub async fn set_custom_field(
        &self,
        doc: &Document,
        field_id: i64,
        value: impl Into<serde_json::Value>,
    ) -> Result<Document> {
        let value = value.into();
        let mut instances = doc.custom_fields.clone();
        match instances.iter_mut().find(|inst| inst.field == field_id) {
            Some(inst) => inst.value = Some(value),
            None => instances.push(CustomFieldInstance {
                field: field_id,
                value: Some(value),
            }),
        }
        self.patch_custom_fields(doc.id, &instances).await
    }

    /// Remove a custom field instance from a document. No request is made
    /// when the document has no such instance.
    pub async fn remove_custom_field(&self, doc: &Document, field_id: i64) -> Result<Document> {
        let instances: Vec<CustomFieldInstance> = doc
            .custom_fields
            .iter()
            .filter(|inst| inst.field != field_id)
            .cloned()
            .collect();
        if instances.len() == doc.custom_fields.len() {
            return Ok(doc.clone());
        }
        self.patch_custom_fields(doc.id, &instances).await
    }

    async fn patch_custom_fields(
        &self,
        doc_id: i64,
        instances: &[CustomFieldInstance],
    ) -> Result<Document> {
        let path = format!("api/documents/{doc_id}/");
        let response = self
            .http
            .patch(self.url(&path))
            .json(&json!({ "custom_fields": instances }))
            .send()
            .await
            .map_err(|e| Error::Request(format!("PATCH {path} failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Request(format!(
                "Paperless returned {status} for PATCH {path}: {body}"
            )));
        }
        response.json::<Document>().await.map_err(Error::from)
    }
}

/// Sequential cursor over a paginated document listing.
///
/// Lazy and single-pass: each call fetches exactly one page, following the
/// `next` link until exhausted. Not resumable; build a new cursor to restart.
pub struct DocumentPages<'a> {
    client: &'a PaperlessClient,
    query: Option<String>,
    page: u32,
    done: bool,
}

impl DocumentPages<'_> {
    /// Fetch the next page of matching documents, `Ok(None)` once exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Document>>> {
        if self.done {
            return Ok(None);
        }
        let mut params = vec![("page", self.page.to_string())];
        if let Some(query) = &self.query {
            params.push(("custom_field_query", query.clone()));
        }
        let payload: Paginated<Document> =
            self.client.get_json("api/documents/", &params).await?;
        if payload.next.is_none() {
            self.done = true;
        } else {
            self.page += 1;
        }
        Ok(Some(payload.results))
    }

    /// Collect every remaining document. Convenience for small corpora and
    /// tests; production scans consume page by page.
    pub async fn collect_all(mut self) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        while let Some(batch) = self.next_page().await? {
            docs.extend(batch);
        }
        Ok(docs)
    }
}
