//! Incremental listing driven by a caller-owned watermark

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, types::KEY_UPDATE_SQL};
use crate::database::{Connection, RelationalSource, Value, close_quietly};
use crate::error::AdaptorResult;
use crate::feed::DocIdPusher;
use crate::identity::IdentityCodec;

use super::DatabaseAdaptor;

/// Point in time the next incremental query asks for changes since.
///
/// Only moves forward, and only after a pass has completed successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Watermark {
    last_update: DateTime<Utc>,
}

impl Watermark {
    #[must_use]
    pub fn now() -> Self {
        Self::starting_at(Utc::now())
    }

    #[must_use]
    pub fn starting_at(last_update: DateTime<Utc>) -> Self {
        Self { last_update }
    }

    #[must_use]
    pub fn get(&self) -> DateTime<Utc> {
        self.last_update
    }

    /// Move to `now`, or one microsecond past the current value if the clock
    /// has not moved forward
    pub(crate) fn advance_to(&mut self, now: DateTime<Utc>) {
        let floor = self.last_update + TimeDelta::microseconds(1);
        self.last_update = now.max(floor);
    }
}

impl<S: RelationalSource, C: IdentityCodec> DatabaseAdaptor<S, C> {
    /// The watermark taken when the adaptor was built, or `None` when no
    /// incremental query is configured. Every call returns the same instant.
    #[must_use]
    pub fn watermark(&self) -> Option<Watermark> {
        self.initial_watermark
    }

    /// Push ids of documents changed since `watermark`, flagged for immediate
    /// crawl.
    ///
    /// On success the watermark advances to the current time; on any error it
    /// is left untouched.
    pub async fn get_modified_doc_ids<P: DocIdPusher>(
        &self,
        watermark: &mut Watermark,
        pusher: &P,
    ) -> AdaptorResult<()> {
        let sql = self
            .config
            .update_sql()
            .ok_or_else(|| ConfigError::Missing(KEY_UPDATE_SQL.to_string()))?;
        let params = [Value::Timestamp(watermark.get())];
        log::debug!("incremental scan since {}", watermark.get().to_rfc3339());

        let mut conn = self.source.connect().await?;
        let mut buffer = self.buffer(pusher);

        let scanned = {
            let rows = conn.execute_parameterized(sql, &params);
            self.feed_rows(rows, &mut buffer, true).await
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

        watermark.advance_to(Utc::now());
        log::debug!("last pushing timestamp set to: {}", watermark.get().to_rfc3339());
        tracing::info!(rows, batches, "incremental scan pushed doc ids");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_is_strictly_increasing() {
        let start = Utc::now();
        let mut watermark = Watermark::starting_at(start);

        watermark.advance_to(start);
        assert!(watermark.get() > start);

        let earlier = start - TimeDelta::seconds(10);
        let before = watermark.get();
        watermark.advance_to(earlier);
        assert_eq!(watermark.get(), before + TimeDelta::microseconds(1));

        let later = start + TimeDelta::seconds(60);
        watermark.advance_to(later);
        assert_eq!(watermark.get(), later);
    }
}
