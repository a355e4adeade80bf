use futures::TryStreamExt;

use crate::acl::is_reserved_column;
use crate::database::{Connection, RelationalSource, Value, close_quietly};
use crate::error::AdaptorResult;
use crate::feed::DocId;
use crate::identity::IdentityCodec;
use crate::response::Response;

use super::DatabaseAdaptor;

impl<S: RelationalSource, C: IdentityCodec> DatabaseAdaptor<S, C> {
    /// Render one document into `response`.
    ///
    /// A content query returning no rows yields `respond_not_found` and
    /// nothing else. Otherwise only the first row is used.
    pub async fn get_doc_content(&self, id: &DocId, response: &mut dyn Response) -> AdaptorResult<()> {
        let params = self.codec.bind_parameters(id.unique_id())?;

        let mut conn = self.source.connect().await?;
        let result = self.render(&mut conn, id, &params, response).await;
        close_quietly(conn).await;
        result
    }

    async fn render(
        &self,
        conn: &mut S::Connection,
        id: &DocId,
        params: &[Value],
        response: &mut dyn Response,
    ) -> AdaptorResult<()> {
        let first = {
            let mut rows = conn.execute_parameterized(self.config.single_doc_content_sql(), params);
            rows.try_next().await?
        };
        let Some(row) = first else {
            log::debug!("no content row for doc id {id}");
            response.respond_not_found();
            return Ok(());
        };

        let metadata = self.config.metadata_columns();
        for (column, value) in row.iter() {
            if is_reserved_column(column) {
                continue;
            }
            if let Some(key) = metadata.metadata_name(column) {
                response.add_metadata(key, &value.to_string());
            }
        }

        if let Some(resolver) = &self.acl_resolver {
            let lookup = resolver.resolve(conn, params).await?;
            if let Some(acl) = lookup.into_acl(self.config.acl_empty_policy()) {
                response.set_acl(acl);
            }
        }

        self.strategy.generate_response(&row, response)?;
        Ok(())
    }
}
