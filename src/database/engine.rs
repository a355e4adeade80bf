//! Engine selected at runtime from the `db.url` scheme

use super::postgres::{PostgresConnection, PostgresSource};
use super::sqlite::{SqliteConnection, SqliteSource};
use super::{Connection, DbResult, RelationalSource, RowStream, Value};

/// Engines reachable through `db.url`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Sqlite,
    Postgres,
}

impl EngineKind {
    /// Detect the engine from a connection URL's scheme
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let (scheme, _) = url.trim().split_once(':')?;
        match scheme.to_ascii_lowercase().as_str() {
            "sqlite" => Some(Self::Sqlite),
            "postgres" | "postgresql" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Any supported pooled database
#[derive(Debug, Clone)]
pub enum EngineSource {
    Sqlite(SqliteSource),
    Postgres(PostgresSource),
}

impl EngineSource {
    /// Open a pool for `kind`. SQLite has no login, so credentials are ignored there.
    pub async fn open(
        kind: EngineKind,
        url: &str,
        user: Option<&str>,
        password: Option<&str>,
        max_connections: u32,
    ) -> DbResult<Self> {
        match kind {
            EngineKind::Sqlite => {
                if user.is_some() || password.is_some() {
                    log::warn!("db.user/db.password have no effect on sqlite databases");
                }
                Ok(Self::Sqlite(SqliteSource::open(url, max_connections).await?))
            }
            EngineKind::Postgres => Ok(Self::Postgres(
                PostgresSource::open(url, user, password, max_connections).await?,
            )),
        }
    }

    #[must_use]
    pub fn kind(&self) -> EngineKind {
        match self {
            Self::Sqlite(_) => EngineKind::Sqlite,
            Self::Postgres(_) => EngineKind::Postgres,
        }
    }
}

impl RelationalSource for EngineSource {
    type Connection = EngineConnection;

    async fn connect(&self) -> DbResult<EngineConnection> {
        match self {
            Self::Sqlite(source) => source.connect().await.map(EngineConnection::Sqlite),
            Self::Postgres(source) => source.connect().await.map(EngineConnection::Postgres),
        }
    }
}

pub enum EngineConnection {
    Sqlite(SqliteConnection),
    Postgres(PostgresConnection),
}

impl Connection for EngineConnection {
    fn execute_streaming<'a>(&'a mut self, query: &'a str, fetch_hint: usize) -> RowStream<'a> {
        match self {
            Self::Sqlite(conn) => conn.execute_streaming(query, fetch_hint),
            Self::Postgres(conn) => conn.execute_streaming(query, fetch_hint),
        }
    }

    fn execute_parameterized<'a>(&'a mut self, query: &'a str, params: &'a [Value]) -> RowStream<'a> {
        match self {
            Self::Sqlite(conn) => conn.execute_parameterized(query, params),
            Self::Postgres(conn) => conn.execute_parameterized(query, params),
        }
    }

    async fn close(self) -> DbResult<()> {
        match self {
            Self::Sqlite(conn) => conn.close().await,
            Self::Postgres(conn) => conn.close().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    #[test]
    fn scheme_selects_engine() {
        assert_eq!(EngineKind::from_url("sqlite://corpus.db"), Some(EngineKind::Sqlite));
        assert_eq!(EngineKind::from_url("sqlite::memory:"), Some(EngineKind::Sqlite));
        assert_eq!(EngineKind::from_url("postgres://u@h/db"), Some(EngineKind::Postgres));
        assert_eq!(EngineKind::from_url("PostgreSQL://h/db"), Some(EngineKind::Postgres));
        assert_eq!(EngineKind::from_url("mysql://h/db"), None);
        assert_eq!(EngineKind::from_url("corpus.db"), None);
    }

    #[tokio::test]
    async fn sqlite_ignores_credentials() {
        let source = EngineSource::open(EngineKind::Sqlite, "sqlite::memory:", Some("u"), Some("p"), 1)
            .await
            .unwrap();
        assert_eq!(source.kind(), EngineKind::Sqlite);

        let mut conn = source.connect().await.unwrap();
        let rows: Vec<_> = conn.execute_streaming("SELECT 1 AS one", 10).collect().await;
        assert_eq!(rows.len(), 1);
        conn.close().await.unwrap();
    }
}
