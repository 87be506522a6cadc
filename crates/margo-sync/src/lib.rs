//! # margo-sync
//!
//! Orchestration for margo: the annotator (cascading deletion, corpus-wide
//! bulk operations), storage backend selection, and the document link
//! synchronization engine with its periodic worker.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use margo_core::MargoConfig;
//! use margo_paperless::PaperlessClient;
//! use margo_sync::{configured_store, Annotator, LinkSyncWorker, WorkerConfig};
//!
//! let config = MargoConfig::from_env()?;
//! let client = Arc::new(PaperlessClient::new(&config.paperless_url, &token)?);
//!
//! // Annotation operations
//! let store = configured_store(&config, client.clone(), None)?;
//! let annotator = Annotator::new(client, store);
//!
//! // Background link synchronization
//! let worker = LinkSyncWorker::new(config, tokens);
//! let handle = worker.start();
//! // ... on shutdown:
//! handle.shutdown().await?;
//! ```

pub mod annotator;
pub mod links;
pub mod store;
pub mod worker;

pub use annotator::Annotator;
pub use links::{FieldCache, LinkSync};
pub use store::configured_store;
pub use worker::{LinkSyncWorker, SyncHandle, WorkerConfig};
