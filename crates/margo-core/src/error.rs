//! Error types for margo.

use thiserror::Error;

/// Result type alias using margo's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for margo operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A stored record names a serializer this build does not know.
    /// Corruption or version skew, never skipped silently.
    #[error("Unknown serializer '{name}'. Known serializers: {known}")]
    UnknownSerializer { name: String, known: String },

    /// Rendered header or serialized payload contains a reserved content
    /// delimiter. Encoding is aborted before anything is written.
    #[error("Reserved content delimiter found in {0}")]
    ReservedDelimiter(String),

    /// Update attempted on an annotation that was never persisted.
    #[error("Annotation has no db_id; create it before updating")]
    MissingIdentifier,

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Note header rendering failed
    #[error("Template error: {0}")]
    Template(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

impl From<minijinja::Error> for Error {
    fn from(e: minijinja::Error) -> Self {
        Error::Template(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unknown_serializer() {
        let err = Error::UnknownSerializer {
            name: "zz9".to_string(),
            known: "85gj, ji2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown serializer 'zz9'. Known serializers: 85gj, ji2"
        );
    }

    #[test]
    fn test_error_display_reserved_delimiter() {
        let err = Error::ReservedDelimiter("rendered note header".to_string());
        assert_eq!(
            err.to_string(),
            "Reserved content delimiter found in rendered note header"
        );
    }

    #[test]
    fn test_error_display_missing_identifier() {
        let err = Error::MissingIdentifier;
        assert!(err.to_string().contains("db_id"));
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("note 42".to_string());
        assert_eq!(err.to_string(), "Not found: note 42");
    }

    #[test]
    fn test_error_display_request() {
        let err = Error::Request("network unreachable".to_string());
        assert_eq!(err.to_string(), "Request error: network unreachable");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }
}
