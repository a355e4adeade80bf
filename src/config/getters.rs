//! Getter methods for `AdaptorConfig`

use std::time::Duration;

use super::metadata_columns::MetadataColumns;
use super::types::{AdaptorConfig, ModeSettings, Password};
use crate::acl::AclEmptyPolicy;

impl AdaptorConfig {
    #[must_use]
    pub fn max_ids_per_feed_file(&self) -> usize {
        self.max_ids_per_feed_file
    }

    #[must_use]
    pub fn db_url(&self) -> Option<&str> {
        self.db_url.as_deref()
    }

    #[must_use]
    pub fn db_user(&self) -> Option<&str> {
        self.db_user.as_deref()
    }

    #[must_use]
    pub fn db_password(&self) -> Option<&Password> {
        self.db_password.as_ref()
    }

    #[must_use]
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    #[must_use]
    pub fn single_doc_content_columns(&self) -> &str {
        &self.single_doc_content_columns
    }

    #[must_use]
    pub fn every_doc_id_sql(&self) -> &str {
        &self.every_doc_id_sql
    }

    #[must_use]
    pub fn single_doc_content_sql(&self) -> &str {
        &self.single_doc_content_sql
    }

    #[must_use]
    pub fn metadata_columns(&self) -> &MetadataColumns {
        &self.metadata_columns
    }

    #[must_use]
    pub fn mode_of_operation(&self) -> &str {
        &self.mode_of_operation
    }

    #[must_use]
    pub fn mode_settings(&self) -> &ModeSettings {
        &self.mode_settings
    }

    #[must_use]
    pub fn update_sql(&self) -> Option<&str> {
        self.update_sql.as_deref()
    }

    #[must_use]
    pub fn acl_sql(&self) -> Option<&str> {
        self.acl_sql.as_deref()
    }

    #[must_use]
    pub fn acl_principal_delimiter(&self) -> &str {
        &self.acl_principal_delimiter
    }

    #[must_use]
    pub fn acl_empty_policy(&self) -> AclEmptyPolicy {
        self.acl_empty_policy
    }

    #[must_use]
    pub fn incremental_poll_period(&self) -> Duration {
        self.incremental_poll_period
    }
}
