//! SQLite relational source backed by a `sqlx` connection pool.
//!
//! Rows are converted eagerly into [`Row`] values as the stream is polled, so
//! no driver type leaks past this module. SQLite always streams row by row,
//! which makes the fetch hint advisory only.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row as _, Sqlite, SqlitePool, TypeInfo, ValueRef};

use super::{Connection, DbError, DbResult, RelationalSource, Row, RowStream, Value};
use crate::utils::sql_preview;

/// Pooled SQLite database
#[derive(Clone)]
pub struct SqliteSource {
    pool: SqlitePool,
}

impl std::fmt::Debug for SqliteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSource")
            .field("connections", &self.pool.size())
            .finish()
    }
}

impl SqliteSource {
    /// Open a pool for a `sqlite:` URL such as `sqlite://corpus.db`
    pub async fn open(url: &str, max_connections: u32) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        log::debug!("opened sqlite pool for {url}");
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl RelationalSource for SqliteSource {
    type Connection = SqliteConnection;

    async fn connect(&self) -> DbResult<SqliteConnection> {
        log::trace!("about to connect");
        let conn = self.pool.acquire().await?;
        log::trace!("connected");
        Ok(SqliteConnection { conn })
    }
}

/// A pooled connection checked out for one operation
pub struct SqliteConnection {
    conn: PoolConnection<Sqlite>,
}

impl Connection for SqliteConnection {
    fn execute_streaming<'a>(&'a mut self, query: &'a str, fetch_hint: usize) -> RowStream<'a> {
        log::debug!(
            "about to query for stream (fetch hint {fetch_hint}): {}",
            sql_preview(query)
        );
        sqlx::query(query)
            .fetch(&mut *self.conn)
            .map(|result| result.map_err(DbError::from).and_then(|row| convert_row(&row)))
            .boxed()
    }

    fn execute_parameterized<'a>(&'a mut self, query: &'a str, params: &'a [Value]) -> RowStream<'a> {
        log::debug!(
            "about to query with {} parameter(s): {}",
            params.len(),
            sql_preview(query)
        );
        let query = params.iter().fold(sqlx::query(query), bind_value);
        query
            .fetch(&mut *self.conn)
            .map(|result| result.map_err(DbError::from).and_then(|row| convert_row(&row)))
            .boxed()
    }

    /// Returns the connection to the pool; this cannot fail.
    async fn close(self) -> DbResult<()> {
        drop(self.conn);
        Ok(())
    }
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Int(n) => query.bind(*n),
        Value::Real(r) => query.bind(*r),
        Value::Text(s) => query.bind(s.clone()),
        Value::Blob(bytes) => query.bind(bytes.clone()),
        Value::Timestamp(ts) => query.bind(*ts),
    }
}

fn convert_row(row: &SqliteRow) -> DbResult<Row> {
    let columns: Arc<[String]> = row
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let values = columns
        .iter()
        .enumerate()
        .map(|(idx, name)| decode_column(row, idx, name))
        .collect::<DbResult<Vec<_>>>()?;

    Ok(Row::new(columns, values))
}

// SQLite is dynamically typed, so dispatch on the storage class of the value
// itself rather than the declared column type.
fn decode_column(row: &SqliteRow, idx: usize, name: &str) -> DbResult<Value> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let storage_class = raw.type_info().name().to_ascii_uppercase();

    let decoded = match storage_class.as_str() {
        "INTEGER" | "INT" | "BIGINT" | "BOOLEAN" => {
            row.try_get_unchecked::<i64, _>(idx).map(Value::Int)
        }
        "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => {
            row.try_get_unchecked::<f64, _>(idx).map(Value::Real)
        }
        "BLOB" => row.try_get_unchecked::<Vec<u8>, _>(idx).map(Value::Blob),
        _ => row.try_get_unchecked::<String, _>(idx).map(Value::Text),
    };

    decoded.map_err(|e| DbError::Decode {
        column: name.to_string(),
        message: e.to_string(),
    })
}
