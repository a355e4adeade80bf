//! Core configuration type for the database adaptor
//!
//! `AdaptorConfig` is the validated, typed view of the flat configuration map.
//! It is produced once at startup, either from a [`ConfigMap`] or through the
//! typestate builder, and is immutable afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use super::errors::ConfigError;
use super::map::ConfigMap;
use super::metadata_columns::MetadataColumns;
use crate::acl::AclEmptyPolicy;
use crate::utils::{
    DEFAULT_ACL_PRINCIPAL_DELIMITER, DEFAULT_INCREMENTAL_POLL_PERIOD_SECS, DEFAULT_MAX_IDS_PER_FEED_FILE,
};

/// Settings scoped to one mode of operation, prefix stripped
pub type ModeSettings = BTreeMap<String, String>;

pub const KEY_MAX_URLS: &str = "feed.maxUrls";
pub const KEY_DB_URL: &str = "db.url";
pub const KEY_DB_USER: &str = "db.user";
pub const KEY_DB_PASSWORD: &str = "db.password";
pub const KEY_PRIMARY_KEY: &str = "db.primaryKey";
pub const KEY_EVERY_DOC_ID_SQL: &str = "db.everyDocIdSql";
pub const KEY_SINGLE_DOC_CONTENT_SQL: &str = "db.singleDocContentSql";
pub const KEY_SINGLE_DOC_CONTENT_COLUMNS: &str = "db.singleDocContentColumns";
pub const KEY_METADATA_COLUMNS: &str = "db.metadataColumns";
pub const KEY_MODE_OF_OPERATION: &str = "db.modeOfOperation";
pub const KEY_UPDATE_SQL: &str = "db.updateSql";
pub const KEY_ACL_SQL: &str = "db.aclSql";
pub const KEY_ACL_PRINCIPAL_DELIMITER: &str = "db.aclPrincipalDelimiter";
pub const KEY_ACL_EMPTY_POLICY: &str = "db.aclEmptyPolicy";
pub const KEY_POLL_PERIOD_SECS: &str = "adaptor.incrementalPollPeriodSecs";

/// Database password; never printed
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Validated adaptor configuration
#[derive(Debug, Clone, Serialize)]
pub struct AdaptorConfig {
    /// Maximum number of doc ids per pushed batch; always positive
    pub(crate) max_ids_per_feed_file: usize,
    pub(crate) db_url: Option<String>,
    pub(crate) db_user: Option<String>,
    #[serde(skip)]
    pub(crate) db_password: Option<Password>,
    pub(crate) primary_key: Option<String>,
    pub(crate) single_doc_content_columns: String,
    pub(crate) every_doc_id_sql: String,
    pub(crate) single_doc_content_sql: String,
    #[serde(skip)]
    pub(crate) metadata_columns: MetadataColumns,
    pub(crate) mode_of_operation: String,
    pub(crate) mode_settings: ModeSettings,
    pub(crate) update_sql: Option<String>,
    pub(crate) acl_sql: Option<String>,
    pub(crate) acl_principal_delimiter: String,
    pub(crate) acl_empty_policy: AclEmptyPolicy,
    pub(crate) incremental_poll_period: Duration,
}

impl AdaptorConfig {
    /// Validate a flat configuration map
    pub fn from_map(map: &ConfigMap) -> Result<Self, ConfigError> {
        let required = |key: &str| {
            map.get(key)
                .map(str::to_string)
                .ok_or_else(|| ConfigError::Missing(key.to_string()))
        };

        let max_ids_per_feed_file = parse_max_urls(map.get(KEY_MAX_URLS))?;
        let mode_of_operation = required(KEY_MODE_OF_OPERATION)?;
        let mode_settings =
            map.values_with_prefix(&format!("{KEY_MODE_OF_OPERATION}.{}.", mode_of_operation.trim()));

        let config = Self {
            max_ids_per_feed_file,
            db_url: map.get_non_blank(KEY_DB_URL).map(str::to_string),
            db_user: map.get_non_blank(KEY_DB_USER).map(str::to_string),
            db_password: map.get(KEY_DB_PASSWORD).filter(|p| !p.is_empty()).map(Password::new),
            primary_key: map.get_non_blank(KEY_PRIMARY_KEY).map(str::to_string),
            single_doc_content_columns: map
                .get(KEY_SINGLE_DOC_CONTENT_COLUMNS)
                .unwrap_or_default()
                .to_string(),
            every_doc_id_sql: required(KEY_EVERY_DOC_ID_SQL)?,
            single_doc_content_sql: required(KEY_SINGLE_DOC_CONTENT_SQL)?,
            metadata_columns: MetadataColumns::parse(map.get(KEY_METADATA_COLUMNS).unwrap_or_default())?,
            mode_of_operation,
            mode_settings,
            update_sql: map.get_non_blank(KEY_UPDATE_SQL).map(str::to_string),
            acl_sql: map.get_non_blank(KEY_ACL_SQL).map(str::to_string),
            acl_principal_delimiter: map
                .get(KEY_ACL_PRINCIPAL_DELIMITER)
                .unwrap_or(DEFAULT_ACL_PRINCIPAL_DELIMITER)
                .to_string(),
            acl_empty_policy: map
                .get_non_blank(KEY_ACL_EMPTY_POLICY)
                .map(AclEmptyPolicy::parse)
                .transpose()?
                .unwrap_or_default(),
            incremental_poll_period: parse_poll_period(map.get_non_blank(KEY_POLL_PERIOD_SECS))?,
        };

        config.log_summary();
        Ok(config)
    }

    pub(crate) fn log_summary(&self) {
        if let Some(user) = &self.db_user {
            log::info!("db user: {user}");
        }
        log::info!("every doc id sql: {}", self.every_doc_id_sql);
        log::info!("single doc content sql: {}", self.single_doc_content_sql);
        log::info!("metadata columns: {}", self.metadata_columns);
        log::info!("mode of operation: {}", self.mode_of_operation);
        if let Some(update_sql) = &self.update_sql {
            log::info!("update sql: {update_sql}");
        }
        if let Some(acl_sql) = &self.acl_sql {
            log::info!("acl sql: {acl_sql}");
        }
    }
}

pub(crate) fn parse_max_urls(value: Option<&str>) -> Result<usize, ConfigError> {
    let Some(value) = value else {
        return Ok(DEFAULT_MAX_IDS_PER_FEED_FILE);
    };
    let parsed: i64 = value
        .trim()
        .parse()
        .map_err(|e| ConfigError::invalid(KEY_MAX_URLS, format!("'{value}' is not an integer: {e}")))?;
    validate_max_urls(parsed)
}

pub(crate) fn validate_max_urls(value: i64) -> Result<usize, ConfigError> {
    if value <= 0 {
        return Err(ConfigError::invalid(KEY_MAX_URLS, "feed.maxUrls needs to be positive"));
    }
    usize::try_from(value).map_err(|e| ConfigError::invalid(KEY_MAX_URLS, e.to_string()))
}

fn parse_poll_period(value: Option<&str>) -> Result<Duration, ConfigError> {
    let Some(value) = value else {
        return Ok(Duration::from_secs(DEFAULT_INCREMENTAL_POLL_PERIOD_SECS));
    };
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::invalid(
            KEY_POLL_PERIOD_SECS,
            format!("'{value}' is not a positive number of seconds"),
        )),
    }
}
