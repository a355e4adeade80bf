//! The database adaptor: doc id listing and per-document content
//!
//! - `scan` - full listing of every document id
//! - `incremental` - listing of documents changed since a watermark
//! - `content` - metadata, ACL and body of one document

pub mod content;
pub mod incremental;
pub mod scan;

pub use incremental::Watermark;

use futures::TryStreamExt;

use crate::acl::AclResolver;
use crate::config::{AdaptorConfig, ConfigError};
use crate::database::{RelationalSource, RowStream};
use crate::error::AdaptorResult;
use crate::feed::{BufferingPusher, CancellationToken, DocId, DocIdPusher, Record};
use crate::identity::IdentityCodec;
use crate::strategy::{ResponseGenerator, StrategyRegistry};

/// Adapts a relational source to a doc id feed plus document content.
///
/// Everything configurable is resolved in [`DatabaseAdaptor::new`]: the
/// response strategy is bound once and a configuration that cannot be fully
/// resolved never produces an adaptor.
pub struct DatabaseAdaptor<S: RelationalSource, C: IdentityCodec> {
    config: AdaptorConfig,
    source: S,
    codec: C,
    strategy: Box<dyn ResponseGenerator>,
    acl_resolver: Option<AclResolver>,
    /// Taken when the adaptor is built; `None` without `db.updateSql`
    initial_watermark: Option<Watermark>,
    cancellation_token: Option<CancellationToken>,
}

impl<S: RelationalSource, C: IdentityCodec> DatabaseAdaptor<S, C> {
    pub fn new(
        config: AdaptorConfig,
        source: S,
        codec: C,
        registry: &StrategyRegistry,
    ) -> Result<Self, ConfigError> {
        let strategy = registry.load(config.mode_of_operation(), config.mode_settings())?;
        let acl_resolver = config
            .acl_sql()
            .map(|sql| AclResolver::new(sql, config.acl_principal_delimiter()));
        let initial_watermark = config.update_sql().map(|_| Watermark::now());

        Ok(Self {
            config,
            source,
            codec,
            strategy,
            acl_resolver,
            initial_watermark,
            cancellation_token: None,
        })
    }

    /// Check `token` before every batch push
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    #[must_use]
    pub fn config(&self) -> &AdaptorConfig {
        &self.config
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    fn buffer<'p, P: DocIdPusher>(&self, pusher: &'p P) -> BufferingPusher<'p, P> {
        BufferingPusher::new(pusher, self.config.max_ids_per_feed_file())
            .with_cancellation(self.cancellation_token.clone())
    }

    /// Encode every row of `rows` and add it to `buffer`; returns the row count
    async fn feed_rows<P: DocIdPusher>(
        &self,
        mut rows: RowStream<'_>,
        buffer: &mut BufferingPusher<'_, P>,
        crawl_immediately: bool,
    ) -> AdaptorResult<usize> {
        let mut count = 0usize;
        while let Some(row) = rows.try_next().await? {
            let id = DocId::new(self.codec.encode(&row)?);
            log::trace!("doc id: {id}");
            buffer
                .add(Record::new(id).crawl_immediately(crawl_immediately))
                .await?;
            count += 1;
        }
        Ok(count)
    }
}
