//! Configuration errors
//!
//! Every variant is fatal at startup: the adaptor refuses to run with a
//! configuration it cannot fully resolve.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required key is absent
    #[error("Missing required configuration key '{0}'")]
    Missing(String),

    /// A key is present but its value is unusable
    #[error("Invalid value for '{key}': {message}")]
    Invalid { key: String, message: String },

    /// `db.modeOfOperation` is blank
    #[error("modeOfOperation can not be an empty string")]
    EmptyMode,

    /// Mode is neither built-in nor of the form `<namespace>.<method>`
    #[error("{0} cannot be parsed as a fully qualified name")]
    NotQualified(String),

    /// No external strategy provider registered under this namespace
    #[error("No strategy namespace {0} found")]
    UnknownNamespace(String),

    /// The namespace exists but has no such factory
    #[error("No method {method} found for namespace {namespace}")]
    UnknownMethod { namespace: String, method: String },

    /// The strategy factory rejected its mode settings
    #[error("Failed to load response generator {mode}: {message}")]
    Strategy { mode: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_string(),
            message: message.into(),
        }
    }
}
