pub mod acl;
pub mod adaptor;
pub mod config;
pub mod database;
pub mod error;
pub mod feed;
pub mod identity;
pub mod response;
pub mod strategy;
pub mod utils;

pub use acl::{Acl, AclEmptyPolicy, Principal};
pub use adaptor::{DatabaseAdaptor, Watermark};
pub use config::{AdaptorConfig, ConfigError, ConfigMap};
pub use database::{
    Connection, DbError, EngineKind, EngineSource, PostgresSource, RelationalSource, Row, SqliteSource,
    Value,
};
pub use error::{AdaptorError, AdaptorResult};
pub use feed::{
    BufferingPusher, CancellationToken, DocId, DocIdPusher, JsonLinesPusher, PushError, Record,
};
pub use identity::{IdentityCodec, IdentityError, PrimaryKey};
pub use response::{RenderedDocument, Response};
pub use strategy::{
    RenderError, ResponseGenerator, StrategyFactory, StrategyProvider, StrategyRegistry,
};

/// Connections kept per adaptor pool
const POOL_SIZE: u32 = 4;

/// Build an adaptor from a flat configuration map.
///
/// Requires `db.url` and `db.primaryKey`. The URL scheme picks the engine
/// (`sqlite:` or `postgres:`); `db.user` and `db.password` are applied to
/// engines with a login.
pub async fn open_adaptor(
    map: &ConfigMap,
    registry: &StrategyRegistry,
) -> AdaptorResult<DatabaseAdaptor<EngineSource, PrimaryKey>> {
    use crate::config::types::{KEY_DB_URL, KEY_PRIMARY_KEY};

    let config = AdaptorConfig::from_map(map)?;
    let url = config
        .db_url()
        .ok_or_else(|| ConfigError::Missing(KEY_DB_URL.to_string()))?;
    let kind = EngineKind::from_url(url).ok_or_else(|| {
        ConfigError::invalid(KEY_DB_URL, "expected a sqlite: or postgres: connection URL")
    })?;
    let primary_key = config
        .primary_key()
        .ok_or_else(|| ConfigError::Missing(KEY_PRIMARY_KEY.to_string()))?;
    let codec = PrimaryKey::parse(primary_key, config.single_doc_content_columns())?;

    let source = EngineSource::open(
        kind,
        url,
        config.db_user(),
        config.db_password().map(crate::config::Password::expose),
        POOL_SIZE,
    )
    .await?;
    Ok(DatabaseAdaptor::new(config, source, codec, registry)?)
}
