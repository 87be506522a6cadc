//! Storage backend selection.

use std::sync::Arc;

use tracing::info;

use margo_core::{
    AnnotationStore, Error, HeaderTemplate, MargoConfig, NoteCodec, Result, StorageBackend,
};
use margo_db::{Database, PgAnnotationStore};
use margo_paperless::{NotesAnnotationStore, PaperlessClient};

/// Build the configured annotation storage backend.
///
/// Called once at startup; callers hold the returned trait object and never
/// re-select at call time. `db` is only consulted for
/// [`StorageBackend::Database`].
pub fn configured_store(
    config: &MargoConfig,
    client: Arc<PaperlessClient>,
    db: Option<Database>,
) -> Result<Arc<dyn AnnotationStore>> {
    match config.storage {
        StorageBackend::PaperlessNotes => {
            info!("Using Paperless notes for annotation storage");
            let header = match &config.header_template_path {
                Some(path) => HeaderTemplate::from_path(path)?,
                None => HeaderTemplate::default(),
            };
            let codec = NoteCodec::for_serializer(&config.serializer, header)?;
            Ok(Arc::new(NotesAnnotationStore::new(client, codec)))
        }
        StorageBackend::Database => {
            info!("Using the local database for annotation storage");
            let db = db.ok_or_else(|| {
                Error::Config(
                    "database storage selected but no database handle provided".to_string(),
                )
            })?;
            Ok(Arc::new(PgAnnotationStore::new(db)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Arc<PaperlessClient> {
        Arc::new(PaperlessClient::new("http://paperless:8000", "token").unwrap())
    }

    #[test]
    fn test_notes_backend_builds_without_database() {
        let config = MargoConfig::new("http://paperless:8000", "https://margo.example.org");
        assert!(configured_store(&config, client(), None).is_ok());
    }

    #[test]
    fn test_database_backend_requires_database_handle() {
        let config = MargoConfig::new("http://paperless:8000", "https://margo.example.org")
            .with_storage(StorageBackend::Database);
        match configured_store(&config, client(), None) {
            Err(Error::Config(msg)) => assert!(msg.contains("database")),
            other => panic!("Expected Config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unknown_serializer_rejected_at_startup() {
        let config = MargoConfig::new("http://paperless:8000", "https://margo.example.org")
            .with_serializer("zz9");
        assert!(configured_store(&config, client(), None).is_err());
    }
}
