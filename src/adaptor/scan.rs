use crate::database::{Connection, RelationalSource, close_quietly};
use crate::error::AdaptorResult;
use crate::feed::DocIdPusher;
use crate::identity::IdentityCodec;
use crate::utils::sql_preview;

use super::DatabaseAdaptor;

impl<S: RelationalSource, C: IdentityCodec> DatabaseAdaptor<S, C> {
    /// Push the id of every document returned by the full-scan query.
    ///
    /// Batches already pushed when a failure occurs stay pushed. The
    /// connection is released before the final partial batch is flushed.
    pub async fn get_doc_ids<P: DocIdPusher>(&self, pusher: &P) -> AdaptorResult<()> {
        let sql = self.config.every_doc_id_sql();
        log::debug!("full scan: {}", sql_preview(sql));

        let mut conn = self.source.connect().await?;
        let mut buffer = self.buffer(pusher);

        let scanned = {
            let rows = conn.execute_streaming(sql, self.config.max_ids_per_feed_file());
            self.feed_rows(rows, &mut buffer, false).await
        };
        close_quietly(conn).await;

        let rows = match scanned {
            Ok(rows) => rows,
            Err(e) => {
                buffer.abandon();
                return Err(e);
            }
        };
        let batches = buffer.finish().await?;

        tracing::info!(rows, batches, "full scan pushed doc ids");
        Ok(())
    }
}
