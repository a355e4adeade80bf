//! Doc ids and the records pushed to the feed

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, reversible identifier of one document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self(unique_id.into())
    }

    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DocId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One doc id plus its crawl hint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub doc_id: DocId,
    /// Ask the indexer to re-fetch the document as soon as possible
    #[serde(default)]
    pub crawl_immediately: bool,
}

impl Record {
    #[must_use]
    pub fn new(doc_id: DocId) -> Self {
        Self {
            doc_id,
            crawl_immediately: false,
        }
    }

    #[must_use]
    pub fn crawl_immediately(mut self, crawl_immediately: bool) -> Self {
        self.crawl_immediately = crawl_immediately;
        self
    }
}
