//! Shared configuration constants for the database adaptor
//!
//! Default values and reserved names used throughout the codebase.

/// Default `feed.maxUrls`: 5000 doc ids per pushed batch
///
/// Also used as the fetch hint for the full-scan cursor, so it bounds the
/// number of rows the engine buffers per round trip.
pub const DEFAULT_MAX_IDS_PER_FEED_FILE: usize = 5000;

/// Default separator for multi-valued principal columns
pub const DEFAULT_ACL_PRINCIPAL_DELIMITER: &str = ",";

/// Default period between incremental passes: 15 minutes
pub const DEFAULT_INCREMENTAL_POLL_PERIOD_SECS: u64 = 900;

/// Longest SQL text echoed into log lines
pub const SQL_LOG_PREVIEW_CHARS: usize = 200;
