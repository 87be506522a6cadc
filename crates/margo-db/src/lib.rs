//! # margo-db
//!
//! PostgreSQL annotation storage backend for margo.
//!
//! The relational backend is the alternative to storing annotations inside
//! Paperless notes: annotations live in a local `annotations` table and
//! Paperless is only consulted for documents themselves.

pub mod pool;
pub mod store;

pub use pool::{Database, PoolConfig};
pub use store::PgAnnotationStore;
