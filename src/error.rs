//! Crate-level error type returned by adaptor operations

use thiserror::Error;

use crate::config::ConfigError;
use crate::database::DbError;
use crate::feed::PushError;
use crate::identity::IdentityError;
use crate::strategy::RenderError;

pub type AdaptorResult<T> = Result<T, AdaptorError>;

#[derive(Debug, Error)]
pub enum AdaptorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Feed push failed: {0}")]
    Push(PushError),

    /// Cancelled before the pending batch was confirmed
    #[error("Operation interrupted")]
    Interrupted,

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),
}

impl From<PushError> for AdaptorError {
    fn from(err: PushError) -> Self {
        match err {
            PushError::Interrupted => Self::Interrupted,
            other => Self::Push(other),
        }
    }
}

impl AdaptorError {
    /// Relational and feed failures, as opposed to configuration or data problems
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Push(_) | Self::Render(RenderError::Io(_))
        )
    }
}
