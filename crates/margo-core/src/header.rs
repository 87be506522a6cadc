//! Note header rendering.
//!
//! The header is the human-readable part of a note-encoded annotation, shown
//! to anyone browsing document notes in Paperless itself. Its template is an
//! external resource: deployments point at their own file, and a built-in
//! default is compiled in.

use std::path::Path;

use minijinja::Environment;
use serde::Serialize;

use crate::error::Result;
use crate::models::Annotation;

/// Template used when no override is configured.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/note_header.txt");

const TEMPLATE_NAME: &str = "note_header";

/// Context handed to the template.
///
/// Field names are part of the template contract; renaming one breaks every
/// deployed override file.
#[derive(Serialize)]
struct HeaderContext<'a> {
    author: &'a str,
    /// 1-based page number, the one humans use.
    page: i32,
    /// 0-based page index, the one the viewer uses.
    page_index: i32,
    created: String,
    comment: &'a str,
    text: Option<&'a str>,
    #[serde(rename = "type")]
    kind: i32,
    annotation: &'a Annotation,
}

/// Compiled note-header template.
pub struct HeaderTemplate {
    env: Environment<'static>,
}

impl HeaderTemplate {
    /// Compile a template from source.
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let mut env = Environment::new();
        env.add_template_owned(TEMPLATE_NAME.to_string(), source.into())?;
        Ok(Self { env })
    }

    /// Compile a template from a file, for deployment overrides.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::new(source)
    }

    /// Render the header for one annotation.
    ///
    /// Doubled newlines are collapsed so optional template blocks do not
    /// leave blank lines in the note.
    pub fn render(&self, annotation: &Annotation) -> Result<String> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        let rendered = template.render(HeaderContext {
            author: &annotation.author,
            page: annotation.page_index + 1,
            page_index: annotation.page_index,
            created: annotation.created_display(),
            comment: annotation.contents.as_deref().unwrap_or(""),
            text: annotation.selected_text(),
            kind: annotation.kind,
            annotation,
        })?;
        Ok(rendered.replace("\n\n", "\n"))
    }
}

impl Default for HeaderTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE).expect("built-in header template must compile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

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
    fn test_render_default_template() {
        let header = HeaderTemplate::default().render(&sample()).unwrap();
        assert!(header.contains("alice"));
        assert!(header.contains("p. 3"));
        assert!(header.contains("2024.03.01 10:00"));
        assert!(header.contains("see note"));
    }

    #[test]
    fn test_render_custom_template_context() {
        let template =
            HeaderTemplate::new("{{ author }}|{{ page }}|{{ page_index }}|{{ type }}").unwrap();
        let header = template.render(&sample()).unwrap();
        assert_eq!(header, "alice|3|2|1");
    }

    #[test]
    fn test_render_selected_text_extension() {
        let mut anno = sample();
        anno.extra
            .insert("custom".to_string(), json!({"text": "quoted passage"}));
        let template = HeaderTemplate::new("{% if text %}{{ text }}{% endif %}").unwrap();
        assert_eq!(template.render(&anno).unwrap(), "quoted passage");
    }

    #[test]
    fn test_render_full_annotation_reachable() {
        let template = HeaderTemplate::new("{{ annotation.pageIndex }}").unwrap();
        assert_eq!(template.render(&sample()).unwrap(), "2");
    }

    #[test]
    fn test_render_unparseable_created_kept_verbatim() {
        let mut anno = sample();
        anno.created = "sometime in March".to_string();
        let template = HeaderTemplate::new("{{ created }}").unwrap();
        assert_eq!(template.render(&anno).unwrap(), "sometime in March");
    }

    #[test]
    fn test_render_collapses_blank_lines() {
        let template = HeaderTemplate::new("a\n\nb").unwrap();
        assert_eq!(template.render(&sample()).unwrap(), "a\nb");
    }

    #[test]
    fn test_invalid_template_rejected() {
        assert!(HeaderTemplate::new("{% if %}").is_err());
    }
}
