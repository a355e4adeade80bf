//! Document identity: row key columns ⇄ reversible identifier string
//!
//! The adaptor only depends on the [`IdentityCodec`] trait. [`PrimaryKey`] is
//! the codec configured by `db.primaryKey`.

pub mod primary_key;

pub use primary_key::{KeyColumn, KeyType, PrimaryKey};

use thiserror::Error;

use crate::database::{Row, Value};

/// Result type alias for identity operations
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Errors produced while encoding or decoding identifiers
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The row does not expose a key column
    #[error("Key column '{0}' missing from result row")]
    MissingColumn(String),

    /// A key column is NULL
    #[error("Key column '{0}' is null")]
    NullKey(String),

    /// A key column holds a value its declared type cannot represent
    #[error("Key column '{column}' is not a valid {expected}: {value}")]
    InvalidKey {
        column: String,
        expected: String,
        value: String,
    },

    /// An identifier could not be turned back into bind parameters
    #[error("Malformed document id '{id}': {reason}")]
    MalformedId { id: String, reason: String },
}

/// Converts rows to identifiers and identifiers back to bind parameters.
///
/// Invariant: for any row `r`, re-running the content query with
/// `bind_parameters(encode(r))` selects `r` again.
pub trait IdentityCodec: Send + Sync {
    /// Build the identifier for the positioned row
    fn encode(&self, row: &Row) -> IdentityResult<String>;

    /// Positional parameters for the content and ACL queries
    fn bind_parameters(&self, id: &str) -> IdentityResult<Vec<Value>>;
}
