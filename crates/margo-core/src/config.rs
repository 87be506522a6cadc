//! Environment-driven runtime configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::defaults;
use crate::error::{Error, Result};
use crate::serializer::serializer_by_name;

/// Which persistence backend holds annotations.
///
/// Chosen once per deployment; both backends satisfy the same
/// [`crate::traits::AnnotationStore`] contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Encode annotations into Paperless document notes.
    PaperlessNotes,
    /// Store annotations in the local Postgres table.
    Database,
}

impl FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "paperless_notes" => Ok(Self::PaperlessNotes),
            "database" => Ok(Self::Database),
            other => Err(Error::Config(format!(
                "unknown annotation storage type: {other}"
            ))),
        }
    }
}

/// Runtime configuration, one per deployment.
#[derive(Debug, Clone)]
pub struct MargoConfig {
    /// Paperless-ngx base URL, e.g. `http://paperless:8000`.
    pub paperless_url: String,
    /// Public base URL of the annotation viewer.
    pub base_url: String,
    /// Name of the link custom field maintained on documents.
    pub custom_field_name: String,
    /// Serializer tag used for new note-encoded writes.
    pub serializer: String,
    /// Backend selection, made once at startup.
    pub storage: StorageBackend,
    /// Delay between link synchronization scans.
    pub sync_interval: Duration,
    /// Optional note-header template file overriding the built-in.
    pub header_template_path: Option<PathBuf>,
}

impl MargoConfig {
    /// Build a configuration from environment variables.
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `MARGO_PAPERLESS_URL` | (required) | Paperless-ngx base URL |
    /// | `MARGO_BASE_URL` | (required) | Annotation viewer base URL |
    /// | `MARGO_CUSTOM_FIELD_NAME` | `Annotations` | Link custom field name |
    /// | `MARGO_SERIALIZER` | `85gj` | Serializer for new writes |
    /// | `MARGO_STORAGE` | `paperless_notes` | `paperless_notes` or `database` |
    /// | `MARGO_SYNC_INTERVAL_MINS` | `60` | Minutes between link scans |
    /// | `MARGO_HEADER_TEMPLATE` | (built-in) | Note header template file |
    pub fn from_env() -> Result<Self> {
        let paperless_url = std::env::var("MARGO_PAPERLESS_URL")
            .map_err(|_| Error::Config("MARGO_PAPERLESS_URL is required".to_string()))?;
        let base_url = std::env::var("MARGO_BASE_URL")
            .map_err(|_| Error::Config("MARGO_BASE_URL is required".to_string()))?;

        let custom_field_name = std::env::var("MARGO_CUSTOM_FIELD_NAME")
            .unwrap_or_else(|_| defaults::CUSTOM_FIELD_NAME.to_string());

        let serializer = std::env::var("MARGO_SERIALIZER")
            .unwrap_or_else(|_| defaults::SERIALIZER.to_string());
        // Fail at startup, not on the first write.
        serializer_by_name(&serializer)?;

        let storage = std::env::var("MARGO_STORAGE")
            .unwrap_or_else(|_| "paperless_notes".to_string())
            .parse()?;

        let interval_mins = match std::env::var("MARGO_SYNC_INTERVAL_MINS") {
            Ok(v) => v.parse::<u64>().map_err(|_| {
                Error::Config(format!("MARGO_SYNC_INTERVAL_MINS must be an integer: {v}"))
            })?,
            Err(_) => defaults::SYNC_INTERVAL_MINS,
        };

        let header_template_path = std::env::var("MARGO_HEADER_TEMPLATE")
            .ok()
            .map(PathBuf::from);

        Ok(Self {
            paperless_url,
            base_url,
            custom_field_name,
            serializer,
            storage,
            sync_interval: Duration::from_secs(interval_mins * 60),
            header_template_path,
        })
    }

    /// Build a configuration with explicit URLs and defaults elsewhere.
    pub fn new(paperless_url: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            paperless_url: paperless_url.into(),
            base_url: base_url.into(),
            custom_field_name: defaults::CUSTOM_FIELD_NAME.to_string(),
            serializer: defaults::SERIALIZER.to_string(),
            storage: StorageBackend::PaperlessNotes,
            sync_interval: Duration::from_secs(defaults::SYNC_INTERVAL_MINS * 60),
            header_template_path: None,
        }
    }

    /// Set the storage backend.
    pub fn with_storage(mut self, storage: StorageBackend) -> Self {
        self.storage = storage;
        self
    }

    /// Set the serializer used for new writes.
    pub fn with_serializer(mut self, name: impl Into<String>) -> Self {
        self.serializer = name.into();
        self
    }

    /// Set the link custom field name.
    pub fn with_custom_field_name(mut self, name: impl Into<String>) -> Self {
        self.custom_field_name = name.into();
        self
    }

    /// Set the delay between link synchronization scans.
    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!(
            "paperless_notes".parse::<StorageBackend>().unwrap(),
            StorageBackend::PaperlessNotes
        );
        assert_eq!(
            "database".parse::<StorageBackend>().unwrap(),
            StorageBackend::Database
        );
        assert!("flat_files".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_new_uses_defaults() {
        let cfg = MargoConfig::new("http://paperless:8000", "https://margo.example.org");
        assert_eq!(cfg.custom_field_name, defaults::CUSTOM_FIELD_NAME);
        assert_eq!(cfg.serializer, defaults::SERIALIZER);
        assert_eq!(cfg.storage, StorageBackend::PaperlessNotes);
        assert_eq!(
            cfg.sync_interval,
            Duration::from_secs(defaults::SYNC_INTERVAL_MINS * 60)
        );
    }

    #[test]
    fn test_builder_setters() {
        let cfg = MargoConfig::new("http://paperless:8000", "https://margo.example.org")
            .with_storage(StorageBackend::Database)
            .with_serializer("ji2")
            .with_custom_field_name("Margin Notes")
            .with_sync_interval(Duration::from_secs(30));
        assert_eq!(cfg.storage, StorageBackend::Database);
        assert_eq!(cfg.serializer, "ji2");
        assert_eq!(cfg.custom_field_name, "Margin Notes");
        assert_eq!(cfg.sync_interval, Duration::from_secs(30));
    }
}
