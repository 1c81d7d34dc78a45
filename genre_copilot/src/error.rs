use genre_core::{ActionError, ChainError, ProviderError};
use thiserror::Error;

/// Errors surfaced by the copilot pipeline.
///
/// A malformed action payload in a model reply is not an error here: the
/// extractor drops it and logs a warning.
#[derive(Debug, Error)]
pub enum CopilotError {
    #[error("market or portfolio data unavailable: {0}")]
    DataUnavailable(#[source] ChainError),

    #[error("completion endpoint error: {0}")]
    Upstream(#[from] ProviderError),

    #[error("unknown action kind: {0}")]
    UnknownActionKind(String),

    #[error("invalid action: {0}")]
    InvalidAction(#[source] ActionError),

    #[error("operation failed: {0}")]
    OperationFailed(#[source] ChainError),
}

impl CopilotError {
    /// Whether repeating the same call could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::DataUnavailable(e) | Self::OperationFailed(e) => e.is_transient(),
            Self::Upstream(e) => e.is_transient(),
            Self::UnknownActionKind(_) | Self::InvalidAction(_) => false,
        }
    }
}

impl From<ActionError> for CopilotError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::UnknownKind(kind) => Self::UnknownActionKind(kind),
            other => Self::InvalidAction(other),
        }
    }
}
