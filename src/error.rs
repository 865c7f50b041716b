//! Error types for storage access and progress tracking.

use thiserror::Error;

/// Errors surfaced by storage backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage quota exceeded while writing {key}")]
    QuotaExceeded { key: String },

    #[error("storage error: {0}")]
    Backend(String),
}

/// Errors emitted by the progress store and tracker.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to serialize progress: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("dom error: {0}")]
    Surface(String),
}

pub type ProgressResult<T> = Result<T, ProgressError>;
