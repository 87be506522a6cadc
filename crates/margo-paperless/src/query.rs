//! Custom-field predicate queries.
//!
//! Paperless filters documents by custom fields through a JSON array
//! expression language (`custom_field_query`). This module models the
//! subset margo composes and serializes it to that syntax.

use serde_json::{json, Value};

/// Composable predicate tree over document custom fields.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomFieldQuery {
    /// `["<field>", "exists", <bool>]`
    Exists(String, bool),
    /// `["<field>", "istartswith", "<prefix>"]`
    IStartsWith(String, String),
    /// `["NOT", <expr>]`
    Not(Box<CustomFieldQuery>),
    /// `["AND", [<exprs>]]`
    And(Vec<CustomFieldQuery>),
    /// `["OR", [<exprs>]]`
    Or(Vec<CustomFieldQuery>),
}

impl CustomFieldQuery {
    /// Documents where `field` has an instance.
    pub fn exists(field: impl Into<String>) -> Self {
        Self::Exists(field.into(), true)
    }

    /// Documents where `field` has no instance.
    pub fn not_exists(field: impl Into<String>) -> Self {
        Self::Exists(field.into(), false)
    }

    /// Documents where `field`'s value starts with `prefix`, case-insensitive.
    pub fn istartswith(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::IStartsWith(field.into(), prefix.into())
    }

    /// Negate this predicate.
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// The Paperless array expression for this predicate.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Exists(field, present) => json!([field, "exists", present]),
            Self::IStartsWith(field, prefix) => json!([field, "istartswith", prefix]),
            Self::Not(inner) => json!(["NOT", inner.to_value()]),
            Self::And(parts) => json!([
                "AND",
                parts.iter().map(Self::to_value).collect::<Vec<_>>()
            ]),
            Self::Or(parts) => json!([
                "OR",
                parts.iter().map(Self::to_value).collect::<Vec<_>>()
            ]),
        }
    }

    /// The serialized form sent as the `custom_field_query` parameter.
    pub fn to_query_param(&self) -> String {
        self.to_value().to_string()
    }
}
