//! Serializer registry: named payload codecs.
//!
//! Every note-encoded record self-declares the codec it was written with,
//! so codecs registered here must stay readable indefinitely. New codecs
//! are added to [`SERIALIZERS`]; existing entries never change meaning.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;

use crate::error::{Error, Result};

/// A named, stateless, bidirectional payload codec.
pub trait AnnoSerializer: Send + Sync {
    /// Short symbolic tag written into every record.
    fn name(&self) -> &'static str;

    /// Serialize a JSON value to an opaque string.
    fn serialize(&self, value: &Value) -> Result<String>;

    /// Deserialize a string produced by [`AnnoSerializer::serialize`].
    fn deserialize(&self, s: &str) -> Result<Value>;
}

/// Indented JSON. Human-inspectable, larger.
pub struct IndentedJson;

impl AnnoSerializer for IndentedJson {
    fn name(&self) -> &'static str {
        "ji2"
    }

    fn serialize(&self, value: &Value) -> Result<String> {
        serde_json::to_string_pretty(value).map_err(Error::from)
    }

    fn deserialize(&self, s: &str) -> Result<Value> {
        serde_json::from_str(s).map_err(Error::from)
    }
}

/// base85(gzip(JSON)). Compact enough for length-constrained note fields.
pub struct Base85GzipJson;

impl AnnoSerializer for Base85GzipJson {
    fn name(&self) -> &'static str {
        "85gj"
    }

    fn serialize(&self, value: &Value) -> Result<String> {
        let json = serde_json::to_string(value)?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(json.as_bytes())?;
        let compressed = encoder.finish()?;
        Ok(base85::encode(&compressed))
    }

    fn deserialize(&self, s: &str) -> Result<Value> {
        let compressed = base85::decode(s.trim())
            .map_err(|e| Error::Serialization(format!("base85 decode failed: {e}")))?;
        let mut decoder = GzDecoder::new(compressed.as_slice());
        let mut json = String::new();
        decoder
            .read_to_string(&mut json)
            .map_err(|e| Error::Serialization(format!("gzip decode failed: {e}")))?;
        serde_json::from_str(&json).map_err(Error::from)
    }
}

/// Every codec this build can read, default-for-writes first.
pub static SERIALIZERS: &[&dyn AnnoSerializer] = &[&Base85GzipJson, &IndentedJson];

/// Look up a codec by its record tag.
///
/// The error lists the known tags so a corrupt or future record is easy to
/// diagnose from logs alone.
pub fn serializer_by_name(name: &str) -> Result<&'static dyn AnnoSerializer> {
    SERIALIZERS
        .iter()
        .copied()
        .find(|s| s.name() == name)
        .ok_or_else(|| Error::UnknownSerializer {
            name: name.to_string(),
            known: SERIALIZERS
                .iter()
                .map(|s| s.name())
                .collect::<Vec<_>>()
                .join(", "),
        })
}
