//! # margo-core
//!
//! Core types, codecs, and storage abstractions for margo.
//!
//! This crate provides the annotation entity, the serializer registry, the
//! note-content codec, the storage trait, and shared configuration that the
//! other margo crates depend on.

pub mod codec;
pub mod config;
pub mod defaults;
pub mod error;
pub mod header;
pub mod models;
pub mod serializer;
pub mod traits;

// Re-export commonly used types at crate root
pub use codec::{NoteCodec, CONTENT_BEGIN, CONTENT_END};
pub use config::{MargoConfig, StorageBackend};
pub use error::{Error, Result};
pub use header::{HeaderTemplate, DEFAULT_TEMPLATE};
pub use models::Annotation;
pub use serializer::{
    serializer_by_name, AnnoSerializer, Base85GzipJson, IndentedJson, SERIALIZERS,
};
pub use traits::AnnotationStore;
