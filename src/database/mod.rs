//! Relational engine abstraction
//!
//! The adaptor never talks to a database driver directly. It opens a
//! [`Connection`] from a [`RelationalSource`], runs either a streaming query
//! (full scan) or a parameterized query (content, ACL, incremental scan), and
//! consumes the resulting forward-only [`RowStream`].
//!
//! Every connection is scoped to the operation that opened it. Callers release
//! it with [`close_quietly`] on every exit path; close failures are logged and
//! never replace the outcome of the operation itself.

pub mod engine;
pub mod postgres;
pub mod row;
pub mod sqlite;
pub mod value;

pub use engine::{EngineConnection, EngineKind, EngineSource};
pub use postgres::PostgresSource;
pub use row::Row;
pub use sqlite::SqliteSource;
pub use value::Value;

use futures::stream::BoxStream;
use std::future::Future;
use thiserror::Error;

/// Result type alias for relational operations
pub type DbResult<T> = Result<T, DbError>;

/// Forward-only stream of result rows
pub type RowStream<'a> = BoxStream<'a, DbResult<Row>>;

/// Errors raised by the relational engine
#[derive(Debug, Error)]
pub enum DbError {
    /// Driver-level failure (connect, prepare, execute, fetch)
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    /// A column value could not be converted to a [`Value`]
    #[error("Failed to decode column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Any other engine failure
    #[error("{0}")]
    Other(String),
}

/// Something that hands out database connections
pub trait RelationalSource: Send + Sync {
    type Connection: Connection;

    /// Open a connection scoped to a single operation
    fn connect(&self) -> impl Future<Output = DbResult<Self::Connection>> + Send;
}

/// An open connection able to run read-only queries
pub trait Connection: Send {
    /// Run `query` as a read-only, forward-only stream.
    ///
    /// `fetch_hint` is the number of rows the engine should buffer per round
    /// trip; engines that always stream may ignore it.
    fn execute_streaming<'a>(&'a mut self, query: &'a str, fetch_hint: usize) -> RowStream<'a>;

    /// Run `query` with positional bind parameters
    fn execute_parameterized<'a>(&'a mut self, query: &'a str, params: &'a [Value]) -> RowStream<'a>;

    /// Release the connection
    fn close(self) -> impl Future<Output = DbResult<()>> + Send;
}

/// Close a connection, logging instead of propagating any failure
pub async fn close_quietly<C: Connection>(conn: C) {
    if let Err(e) = conn.close().await {
        log::warn!("connection close failed: {e}");
    }
}
