//! Wire models of the Paperless-ngx REST API.
//!
//! Only the fields this system consumes are modeled strictly; everything
//! else is optional so the client keeps working as the upstream API grows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Paperless user reference attached to notes.
#[derive(Debug, Clone, Deserialize)]
pub struct BasicUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// A free-text note attached to a document.
///
/// Margo reuses notes as opaque storage for encoded annotations; plain
/// human-authored notes pass through this same type.
#[derive(Debug, Clone, Deserialize)]
pub struct Note {
    pub id: i64,
    pub note: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: Option<BasicUser>,
}

/// Global custom field definition.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomField {
    pub id: i64,
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub extra_data: Option<Value>,
    #[serde(default)]
    pub document_count: Option<i64>,
}

/// Per-document value of a custom field.
///
/// At most one instance exists per (document, field) pair; writes go through
/// an upsert that searches the instance array before appending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldInstance {
    pub field: i64,
    #[serde(default)]
    pub value: Option<Value>,
}

/// A Paperless document. Read-only from margo's perspective except for
/// custom field instance mutation.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub correspondent: Option<i64>,
    #[serde(default)]
    pub document_type: Option<i64>,
    #[serde(default)]
    pub storage_path: Option<i64>,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub created: Option<NaiveDate>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub added: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archive_serial_number: Option<i64>,
    #[serde(default)]
    pub original_file_name: Option<String>,
    #[serde(default)]
    pub owner: Option<i64>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldInstance>,
    #[serde(default)]
    pub page_count: Option<i32>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}
