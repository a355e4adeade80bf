//! Response strategies: how a single content row becomes a document
//!
//! A strategy is chosen once, by name, when the adaptor is constructed and is
//! reused for every document afterwards. Built-in strategies are looked up by
//! short name; anything else must be registered as `<namespace>.<method>`.
//!
//! - `registry` - name resolution and plugin registration
//! - `builtin` - the strategies shipped with the adaptor

pub mod builtin;
pub mod registry;

pub use registry::{StrategyProvider, StrategyRegistry};

use thiserror::Error;

use crate::config::{ConfigError, ModeSettings};
use crate::database::Row;
use crate::response::Response;

/// Errors raised while rendering a document
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The row lacks a column the strategy needs
    #[error("Column '{0}' is not present in the content row")]
    MissingColumn(String),

    /// The column exists but its value cannot be rendered this way
    #[error("Column '{column}' cannot be rendered: {message}")]
    Unrenderable { column: String, message: String },
}

/// Renders one content row into a [`Response`]
pub trait ResponseGenerator: Send + Sync {
    fn generate_response(&self, row: &Row, response: &mut dyn Response) -> Result<(), RenderError>;
}

/// Builds a generator from the mode settings scoped to it
pub type StrategyFactory = fn(&ModeSettings) -> Result<Box<dyn ResponseGenerator>, ConfigError>;
