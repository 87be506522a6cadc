//! Note-content codec.
//!
//! Embeds a serialized annotation plus a rendered header into a single
//! free-text note, delimited so it can be recovered from among arbitrary
//! human-authored notes on the same document.
//!
//! Decoding distinguishes two outcomes on purpose: a note without the
//! delimiters is simply not an annotation (`Ok(None)`, expected and
//! frequent), while a delimited note that fails to decode is corruption and
//! surfaces as an error. Collapsing the two would silently lose data.

use crate::error::{Error, Result};
use crate::header::HeaderTemplate;
use crate::models::Annotation;
use crate::serializer::{serializer_by_name, AnnoSerializer};

/// Marks the start of machine-readable data inside a note.
pub const CONTENT_BEGIN: &str = "------------ DATA BEGIN ------------";

/// Marks the end of machine-readable data inside a note.
pub const CONTENT_END: &str = "------------ DATA END ------------";

/// Encoder/decoder between annotations and note text.
pub struct NoteCodec {
    serializer: &'static dyn AnnoSerializer,
    header: HeaderTemplate,
}

impl NoteCodec {
    /// Build a codec writing with the given serializer.
    pub fn new(serializer: &'static dyn AnnoSerializer, header: HeaderTemplate) -> Self {
        Self { serializer, header }
    }

    /// Build a codec writing with the serializer registered under `name`.
    pub fn for_serializer(name: &str, header: HeaderTemplate) -> Result<Self> {
        Ok(Self::new(serializer_by_name(name)?, header))
    }

    /// Tag of the serializer used for new writes.
    pub fn serializer_name(&self) -> &'static str {
        self.serializer.name()
    }

    /// Encode an annotation into note text.
    ///
    /// Fails with [`Error::ReservedDelimiter`] before anything is written if
    /// the rendered header or the serialized payload contains a delimiter
    /// literal.
    pub fn encode(&self, annotation: &Annotation) -> Result<String> {
        let serialized = format!("{}\n", self.serializer.serialize(&annotation.to_value()?)?);
        let header = self.header.render(annotation)?;

        if header.contains(CONTENT_BEGIN) || header.contains(CONTENT_END) {
            return Err(Error::ReservedDelimiter("rendered note header".to_string()));
        }
        if serialized.contains(CONTENT_BEGIN) || serialized.contains(CONTENT_END) {
            return Err(Error::ReservedDelimiter(
                "serialized annotation payload".to_string(),
            ));
        }

        Ok(format!(
            "{header}\n{CONTENT_BEGIN}\n{}\n{serialized}{CONTENT_END}",
            self.serializer.name()
        ))
    }

    /// Decode note text into an annotation.
    ///
    /// `Ok(None)` means the note is not an annotation record. An unknown
    /// serializer name or an undecodable payload inside the delimiters is an
    /// error, never a skip.
    pub fn decode(note: &str) -> Result<Option<Annotation>> {
        let Some(begin) = note.find(CONTENT_BEGIN) else {
            return Ok(None);
        };
        let Some(end) = note.find(CONTENT_END) else {
            return Ok(None);
        };
        let Some(data_area) = note.get(begin + CONTENT_BEGIN.len()..end) else {
            // END before BEGIN: delimiter fragments, not a record.
            return Ok(None);
        };
        let data_area = data_area.trim();

        let mut lines = data_area.lines();
        let serializer_name = lines.next().unwrap_or("").trim();
        if serializer_name.is_empty() {
            return Ok(None);
        }
        let serializer = serializer_by_name(serializer_name)?;

        let payload = lines.collect::<Vec<_>>().join("\n");
        let value = serializer.deserialize(&payload)?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(Annotation::from_value(value)?))
    }
}
