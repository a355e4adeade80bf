//! Configuration module for the database adaptor
//!
//! This module provides the flat `ConfigMap` the adaptor is deployed with,
//! the validated `AdaptorConfig`, and its type-safe builder.

// Sub-modules
pub mod builder;
pub mod errors;
pub mod getters;
pub mod map;
pub mod metadata_columns;
pub mod types;

// Re-exports for public API
pub use builder::{AdaptorConfigBuilder, Complete, WithContentSql, WithListingSql};
pub use errors::ConfigError;
pub use map::ConfigMap;
pub use metadata_columns::MetadataColumns;
pub use types::{AdaptorConfig, ModeSettings, Password};
