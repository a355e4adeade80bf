//! PostgreSQL relational source backed by a `sqlx` connection pool.
//!
//! Queries use Postgres placeholders (`$1`, `$2`, ...). Credentials from
//! `db.user` / `db.password` override whatever the URL carries.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures::StreamExt;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column, PgPool, Postgres, Row as _, TypeInfo, ValueRef};

use super::{Connection, DbError, DbResult, RelationalSource, Row, RowStream, Value};
use crate::utils::sql_preview;

/// Pooled PostgreSQL database
#[derive(Clone)]
pub struct PostgresSource {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresSource")
            .field("connections", &self.pool.size())
            .finish()
    }
}

impl PostgresSource {
    /// Connection options for `url` with explicit credentials applied on top
    pub fn connect_options(
        url: &str,
        user: Option<&str>,
        password: Option<&str>,
    ) -> DbResult<PgConnectOptions> {
        let mut options = PgConnectOptions::from_str(url)?;
        if let Some(user) = user {
            options = options.username(user);
        }
        if let Some(password) = password {
            options = options.password(password);
        }
        Ok(options)
    }

    /// Open a pool for a `postgres://` URL
    pub async fn open(
        url: &str,
        user: Option<&str>,
        password: Option<&str>,
        max_connections: u32,
    ) -> DbResult<Self> {
        let options = Self::connect_options(url, user, password)?;
        let target = format!("{}:{}", options.get_host(), options.get_port());
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        log::debug!("opened postgres pool for {target}");
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl RelationalSource for PostgresSource {
    type Connection = PostgresConnection;

    async fn connect(&self) -> DbResult<PostgresConnection> {
        log::trace!("about to connect");
        let conn = self.pool.acquire().await?;
        log::trace!("connected");
        Ok(PostgresConnection { conn })
    }
}

/// A pooled connection checked out for one operation
pub struct PostgresConnection {
    conn: PoolConnection<Postgres>,
}

impl Connection for PostgresConnection {
    /// Rows arrive as the server sends them; the hint is not forwarded.
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

    async fn close(self) -> DbResult<()> {
        drop(self.conn);
        Ok(())
    }
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &Value,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Int(n) => query.bind(*n),
        Value::Real(r) => query.bind(*r),
        Value::Text(s) => query.bind(s.clone()),
        Value::Blob(bytes) => query.bind(bytes.clone()),
        Value::Timestamp(ts) => query.bind(*ts),
    }
}

fn convert_row(row: &PgRow) -> DbResult<Row> {
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

// Postgres is statically typed, so dispatch on the declared column type.
// Types without a mapping (NUMERIC, UUID, JSON...) must be cast to text in SQL.
fn decode_column(row: &PgRow, idx: usize, name: &str) -> DbResult<Value> {
    let type_name = {
        let raw = row.try_get_raw(idx)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        raw.type_info().name().to_ascii_uppercase()
    };

    let decoded = match type_name.as_str() {
        "BOOL" => row.try_get::<bool, _>(idx).map(|b| Value::Int(i64::from(b))),
        "INT2" => row.try_get::<i16, _>(idx).map(|n| Value::Int(i64::from(n))),
        "INT4" => row.try_get::<i32, _>(idx).map(|n| Value::Int(i64::from(n))),
        "INT8" => row.try_get::<i64, _>(idx).map(Value::Int),
        "FLOAT4" => row.try_get::<f32, _>(idx).map(|r| Value::Real(f64::from(r))),
        "FLOAT8" => row.try_get::<f64, _>(idx).map(Value::Real),
        "BYTEA" => row.try_get::<Vec<u8>, _>(idx).map(Value::Blob),
        "TIMESTAMPTZ" => row.try_get::<DateTime<Utc>, _>(idx).map(Value::Timestamp),
        "TIMESTAMP" => row
            .try_get::<NaiveDateTime, _>(idx)
            .map(|ts| Value::Timestamp(ts.and_utc())),
        "DATE" => row
            .try_get::<NaiveDate, _>(idx)
            .map(|d| Value::Text(d.to_string())),
        _ => row.try_get::<String, _>(idx).map(Value::Text),
    };

    decoded.map_err(|e| DbError::Decode {
        column: name.to_string(),
        message: format!("{type_name}: {e}"),
    })
}
