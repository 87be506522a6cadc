//! Annotation entity.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::defaults;
use crate::error::{Error, Result};

/// A page-scoped, structured comment or highlight on one document.
///
/// Annotation shapes evolve with the viewer, so fields beyond the fixed set
/// land in `extra` and round-trip through storage untouched. Two identifiers
/// coexist: `db_id` is assigned by the storage backend, while the domain id
/// (the `id` extension field) is what the viewer uses to wire up replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Creation timestamp. ISO-8601 accepted; kept verbatim if it is not.
    pub created: String,
    /// Free-text author identity.
    #[serde(default)]
    pub author: String,
    /// Kind discriminator (highlight, note, ...). Opaque to this crate.
    #[serde(rename = "type")]
    pub kind: i32,
    /// Zero-based page number. Never negative once stored.
    #[serde(rename = "pageIndex")]
    pub page_index: i32,
    /// Storage-assigned identifier: note id or database row id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_id: Option<i64>,
    /// Optional free-text body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
    /// Extension fields the viewer attaches beyond the fixed set.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Annotation {
    /// The client-visible identifier referenced by `inReplyToId` on replies.
    pub fn domain_id(&self) -> Option<&Value> {
        self.extra.get("id")
    }

    /// Domain id of the annotation this one replies to, if any.
    pub fn in_reply_to(&self) -> Option<&Value> {
        self.extra.get("inReplyToId")
    }

    /// Selected text for highlight-style annotations (`custom.text`).
    pub fn selected_text(&self) -> Option<&str> {
        self.extra.get("custom")?.get("text")?.as_str()
    }

    /// True when this annotation replies to `parent`.
    ///
    /// Reply wiring uses domain ids, not `db_id`; an annotation without a
    /// domain id can never be a reply target.
    pub fn replies_to(&self, parent: &Annotation) -> bool {
        match (self.in_reply_to(), parent.domain_id()) {
            (Some(reply_to), Some(id)) => reply_to == id,
            _ => false,
        }
    }

    /// `created` formatted as `YYYY.MM.DD HH:MM` when it parses as
    /// ISO-8601, the raw string otherwise.
    pub fn created_display(&self) -> String {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.created) {
            return dt.format(defaults::CREATED_DISPLAY_FORMAT).to_string();
        }
        if let Ok(dt) = self.created.parse::<NaiveDateTime>() {
            return dt.format(defaults::CREATED_DISPLAY_FORMAT).to_string();
        }
        self.created.clone()
    }

    /// Check invariants a backend must hold before persisting.
    pub fn validate(&self) -> Result<()> {
        if self.page_index < 0 {
            return Err(Error::InvalidInput(format!(
                "pageIndex must be >= 0, got {}",
                self.page_index
            )));
        }
        Ok(())
    }

    /// Full JSON representation, extension fields included.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Error::from)
    }

    /// Rebuild from a JSON representation, preserving unknown fields.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Annotation {
        Annotation {
            created: "2024-03-01T10:00:00Z".to_string(),
            author: "alice".to_string(),
            kind: 1,
            page_index: 2,
            db_id: None,
            contents: Some("see note".to_string()),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_created_display_iso() {
        assert_eq!(sample().created_display(), "2024.03.01 10:00");
    }

    #[test]
    fn test_created_display_naive_iso() {
        let mut anno = sample();
        anno.created = "2024-03-01T10:30:00".to_string();
        assert_eq!(anno.created_display(), "2024.03.01 10:30");
    }

    #[test]
    fn test_created_display_unparseable_kept_verbatim() {
        let mut anno = sample();
        anno.created = "last tuesday".to_string();
        assert_eq!(anno.created_display(), "last tuesday");
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let value = json!({
            "created": "2024-03-01T10:00:00Z",
            "author": "alice",
            "type": 1,
            "pageIndex": 2,
            "id": "anno-7",
            "inReplyToId": "anno-3",
            "color": "#ffcc00",
            "custom": {"text": "quoted passage"}
        });
        let anno = Annotation::from_value(value.clone()).unwrap();
        assert_eq!(anno.domain_id(), Some(&json!("anno-7")));
        assert_eq!(anno.in_reply_to(), Some(&json!("anno-3")));
        assert_eq!(anno.selected_text(), Some("quoted passage"));
        assert_eq!(anno.extra.get("color"), Some(&json!("#ffcc00")));

        let back = anno.to_value().unwrap();
        assert_eq!(back.get("color"), Some(&json!("#ffcc00")));
        assert_eq!(back.get("pageIndex"), Some(&json!(2)));
    }

    #[test]
    fn test_replies_to_matches_domain_id() {
        let mut parent = sample();
        parent.extra.insert("id".to_string(), json!("anno-1"));

        let mut reply = sample();
        reply
            .extra
            .insert("inReplyToId".to_string(), json!("anno-1"));
        assert!(reply.replies_to(&parent));

        let mut other = sample();
        other
            .extra
            .insert("inReplyToId".to_string(), json!("anno-2"));
        assert!(!other.replies_to(&parent));
    }

    #[test]
    fn test_replies_to_without_domain_id() {
        let parent = sample();
        let mut reply = sample();
        reply
            .extra
            .insert("inReplyToId".to_string(), json!("anno-1"));
        assert!(!reply.replies_to(&parent));
    }

    #[test]
    fn test_validate_rejects_negative_page() {
        let mut anno = sample();
        anno.page_index = -1;
        match anno.validate() {
            Err(Error::InvalidInput(msg)) => assert!(msg.contains("pageIndex")),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_author_defaults_to_empty() {
        let value = json!({
            "created": "2024-03-01T10:00:00Z",
            "type": 0,
            "pageIndex": 0
        });
        let anno = Annotation::from_value(value).unwrap();
        assert_eq!(anno.author, "");
        assert!(anno.db_id.is_none());
        assert!(anno.contents.is_none());
    }
}
