//! Doc id feed: records, the pusher they are delivered to, and batching
//!
//! - `types` - `DocId` and `Record`
//! - `buffering` - bounded batch accumulation in front of a pusher
//! - `json_lines` - a pusher writing one JSON record per line

pub mod buffering;
pub mod json_lines;
pub mod types;

pub use buffering::{BufferingPusher, CancellationToken};
pub use json_lines::JsonLinesPusher;
pub use types::{DocId, Record};

use std::future::Future;
use thiserror::Error;

/// Errors reported by a [`DocIdPusher`]
#[derive(Debug, Error)]
pub enum PushError {
    /// The feed rejected the batch
    #[error("Feed rejected {count} record(s): {message}")]
    Rejected { count: usize, message: String },

    /// The push was interrupted before it was confirmed
    #[error("Push interrupted")]
    Interrupted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for batches of doc id records.
///
/// Retry and acknowledgement policy belong to the implementation; callers
/// treat an `Err` as "nothing from this batch is known to be delivered".
pub trait DocIdPusher: Send + Sync {
    fn push_records(&self, records: &[Record]) -> impl Future<Output = Result<(), PushError>> + Send;
}
