//! Centralized default constants for margo.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// ENCODING
// =============================================================================

/// Serializer tag used for new note-encoded writes.
///
/// base85(gzip(JSON)) keeps records well under the note-field length limits
/// Paperless applies. Older records written with any registered serializer
/// stay readable.
pub const SERIALIZER: &str = "85gj";

// =============================================================================
// LINK SYNCHRONIZATION
// =============================================================================

/// Name of the custom field holding the annotation-view link on documents.
pub const CUSTOM_FIELD_NAME: &str = "Annotations";

/// Paperless data type of the link custom field.
pub const CUSTOM_FIELD_DATA_TYPE: &str = "url";

/// Minutes between link synchronization scans.
pub const SYNC_INTERVAL_MINS: u64 = 60;

/// Path under the viewer base URL that renders a document.
pub const VIEWER_PATH: &str = "/view/";

// =============================================================================
// HTTP
// =============================================================================

/// Request timeout for Paperless API calls (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// DISPLAY
// =============================================================================

/// Display format for annotation timestamps that parse as ISO-8601.
pub const CREATED_DISPLAY_FORMAT: &str = "%Y.%m.%d %H:%M";
