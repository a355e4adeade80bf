//! A pusher that writes each record as one JSON object per line
//!
//! Used by the CLI to hand doc ids to whatever ingests stdout.

use std::io::Write;
use std::sync::Mutex;

use super::{DocIdPusher, PushError, Record};

pub struct JsonLinesPusher<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesPusher<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    /// Recover the writer, e.g. to inspect what was written
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_batch(&self, records: &[Record]) -> Result<(), PushError> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| PushError::Rejected {
                count: records.len(),
                message: "output lock poisoned".to_string(),
            })?;
        for record in records {
            serde_json::to_writer(&mut *out, record).map_err(std::io::Error::from)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> DocIdPusher for JsonLinesPusher<W> {
    async fn push_records(&self, records: &[Record]) -> Result<(), PushError> {
        self.write_batch(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::DocId;

    #[tokio::test]
    async fn writes_one_line_per_record() {
        let pusher = JsonLinesPusher::new(Vec::new());
        pusher
            .push_records(&[
                Record::new(DocId::new("1")),
                Record::new(DocId::new("a/b")).crawl_immediately(true),
            ])
            .await
            .unwrap();

        let text = String::from_utf8(pusher.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"doc_id":"1","crawl_immediately":false}"#);
        assert_eq!(lines[1], r#"{"doc_id":"a/b","crawl_immediately":true}"#);
    }
}
