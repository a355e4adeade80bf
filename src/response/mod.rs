//! Rendered-document sink
//!
//! The content resolver writes metadata and the ACL into a [`Response`], and
//! the selected response generator writes the body and content type.

use std::io::Write;

use serde::{Serialize, Serializer};

use crate::acl::Acl;

pub trait Response: Send {
    fn add_metadata(&mut self, key: &str, value: &str);

    fn set_acl(&mut self, acl: Acl);

    /// Mark the document as nonexistent
    fn respond_not_found(&mut self);

    fn set_content_type(&mut self, content_type: &str);

    /// Writer for the document body
    fn body(&mut self) -> &mut dyn Write;
}

/// In-memory [`Response`] capturing everything written to it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
    pub not_found: bool,
    pub metadata: Vec<(String, String)>,
    pub acl: Option<Acl>,
    pub content_type: Option<String>,
    #[serde(serialize_with = "lossy_utf8")]
    pub body: Vec<u8>,
}

impl RenderedDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First metadata value recorded under `key`
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// True when nothing at all has been written
    #[must_use]
    pub fn is_untouched(&self) -> bool {
        self.metadata.is_empty()
            && self.acl.is_none()
            && self.content_type.is_none()
            && self.body.is_empty()
    }
}

impl Response for RenderedDocument {
    fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.push((key.to_string(), value.to_string()));
    }

    fn set_acl(&mut self, acl: Acl) {
        self.acl = Some(acl);
    }

    fn respond_not_found(&mut self) {
        self.not_found = true;
    }

    fn set_content_type(&mut self, content_type: &str) {
        self.content_type = Some(content_type.to_string());
    }

    fn body(&mut self) -> &mut dyn Write {
        &mut self.body
    }
}

fn lossy_utf8<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}
