//! Type-safe builder for `AdaptorConfig` using the typestate pattern
//!
//! The three queries/settings every adaptor needs (listing query, content
//! query, mode of operation) must be supplied in that order before `build`
//! becomes available. Everything else is optional and can be set in any state.

use std::marker::PhantomData;
use std::time::Duration;

use super::errors::ConfigError;
use super::metadata_columns::MetadataColumns;
use super::types::{AdaptorConfig, ModeSettings, Password, validate_max_urls};
use crate::acl::AclEmptyPolicy;
use crate::utils::{
    DEFAULT_ACL_PRINCIPAL_DELIMITER, DEFAULT_INCREMENTAL_POLL_PERIOD_SECS, DEFAULT_MAX_IDS_PER_FEED_FILE,
};

// Type states for the builder
pub struct WithListingSql;
pub struct WithContentSql;
pub struct Complete;

#[derive(Debug, Clone)]
struct Draft {
    max_ids_per_feed_file: i64,
    db_url: Option<String>,
    db_user: Option<String>,
    db_password: Option<Password>,
    primary_key: Option<String>,
    single_doc_content_columns: String,
    every_doc_id_sql: String,
    single_doc_content_sql: String,
    metadata_columns: String,
    mode_of_operation: String,
    mode_settings: ModeSettings,
    update_sql: Option<String>,
    acl_sql: Option<String>,
    acl_principal_delimiter: String,
    acl_empty_policy: AclEmptyPolicy,
    incremental_poll_period: Duration,
}

pub struct AdaptorConfigBuilder<State = ()> {
    draft: Draft,
    _phantom: PhantomData<State>,
}

impl Default for AdaptorConfigBuilder<()> {
    fn default() -> Self {
        Self {
            draft: Draft {
                max_ids_per_feed_file: DEFAULT_MAX_IDS_PER_FEED_FILE as i64,
                db_url: None,
                db_user: None,
                db_password: None,
                primary_key: None,
                single_doc_content_columns: String::new(),
                every_doc_id_sql: String::new(),
                single_doc_content_sql: String::new(),
                metadata_columns: String::new(),
                mode_of_operation: String::new(),
                mode_settings: ModeSettings::new(),
                update_sql: None,
                acl_sql: None,
                acl_principal_delimiter: DEFAULT_ACL_PRINCIPAL_DELIMITER.to_string(),
                acl_empty_policy: AclEmptyPolicy::default(),
                incremental_poll_period: Duration::from_secs(DEFAULT_INCREMENTAL_POLL_PERIOD_SECS),
            },
            _phantom: PhantomData,
        }
    }
}

impl AdaptorConfig {
    /// Create a builder for configuring an `AdaptorConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> AdaptorConfigBuilder<()> {
        AdaptorConfigBuilder::default()
    }
}

impl<State> AdaptorConfigBuilder<State> {
    fn transition<Next>(self) -> AdaptorConfigBuilder<Next> {
        AdaptorConfigBuilder {
            draft: self.draft,
            _phantom: PhantomData,
        }
    }

    /// Maximum doc ids per pushed batch (`feed.maxUrls`); validated by `build`
    #[must_use]
    pub fn max_ids_per_feed_file(mut self, max: i64) -> Self {
        self.draft.max_ids_per_feed_file = max;
        self
    }

    #[must_use]
    pub fn db_url(mut self, url: impl Into<String>) -> Self {
        self.draft.db_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn db_user(mut self, user: impl Into<String>) -> Self {
        self.draft.db_user = Some(user.into());
        self
    }

    #[must_use]
    pub fn db_password(mut self, password: impl Into<String>) -> Self {
        self.draft.db_password = Some(Password::new(password));
        self
    }

    #[must_use]
    pub fn primary_key(mut self, spec: impl Into<String>) -> Self {
        self.draft.primary_key = Some(spec.into());
        self
    }

    #[must_use]
    pub fn single_doc_content_columns(mut self, columns: impl Into<String>) -> Self {
        self.draft.single_doc_content_columns = columns.into();
        self
    }

    /// `column[:alias],...`; parsed by `build`
    #[must_use]
    pub fn metadata_columns(mut self, spec: impl Into<String>) -> Self {
        self.draft.metadata_columns = spec.into();
        self
    }

    #[must_use]
    pub fn mode_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.draft.mode_settings.insert(key.into(), value.into());
        self
    }

    /// Enable incremental listing with this "changed since ?" query
    #[must_use]
    pub fn update_sql(mut self, sql: impl Into<String>) -> Self {
        self.draft.update_sql = Some(sql.into()).filter(|s| !s.trim().is_empty());
        self
    }

    #[must_use]
    pub fn acl_sql(mut self, sql: impl Into<String>) -> Self {
        self.draft.acl_sql = Some(sql.into()).filter(|s| !s.trim().is_empty());
        self
    }

    #[must_use]
    pub fn acl_principal_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.draft.acl_principal_delimiter = delimiter.into();
        self
    }

    #[must_use]
    pub fn acl_empty_policy(mut self, policy: AclEmptyPolicy) -> Self {
        self.draft.acl_empty_policy = policy;
        self
    }

    #[must_use]
    pub fn incremental_poll_period(mut self, period: Duration) -> Self {
        self.draft.incremental_poll_period = period;
        self
    }
}

impl AdaptorConfigBuilder<()> {
    pub fn every_doc_id_sql(mut self, sql: impl Into<String>) -> AdaptorConfigBuilder<WithListingSql> {
        self.draft.every_doc_id_sql = sql.into();
        self.transition()
    }
}

impl AdaptorConfigBuilder<WithListingSql> {
    pub fn single_doc_content_sql(mut self, sql: impl Into<String>) -> AdaptorConfigBuilder<WithContentSql> {
        self.draft.single_doc_content_sql = sql.into();
        self.transition()
    }
}

impl AdaptorConfigBuilder<WithContentSql> {
    pub fn mode_of_operation(mut self, mode: impl Into<String>) -> AdaptorConfigBuilder<Complete> {
        self.draft.mode_of_operation = mode.into();
        self.transition()
    }
}

impl AdaptorConfigBuilder<Complete> {
    pub fn build(self) -> Result<AdaptorConfig, ConfigError> {
        let draft = self.draft;
        let config = AdaptorConfig {
            max_ids_per_feed_file: validate_max_urls(draft.max_ids_per_feed_file)?,
            db_url: draft.db_url,
            db_user: draft.db_user,
            db_password: draft.db_password,
            primary_key: draft.primary_key,
            single_doc_content_columns: draft.single_doc_content_columns,
            every_doc_id_sql: draft.every_doc_id_sql,
            single_doc_content_sql: draft.single_doc_content_sql,
            metadata_columns: MetadataColumns::parse(&draft.metadata_columns)?,
            mode_of_operation: draft.mode_of_operation,
            mode_settings: draft.mode_settings,
            update_sql: draft.update_sql,
            acl_sql: draft.acl_sql,
            acl_principal_delimiter: draft.acl_principal_delimiter,
            acl_empty_policy: draft.acl_empty_policy,
            incremental_poll_period: draft.incremental_poll_period,
        };
        config.log_summary();
        Ok(config)
    }
}
