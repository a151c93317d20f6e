use thiserror::Error;

use billrun_core::DomainError;

/// Failure reported by a persistence collaborator.
///
/// The generation core does not catch or retry these; they propagate so the
/// triggering context decides what a failed run means.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Error surfaced by a generation run.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Billing configuration does not support the requested operation
    /// (e.g. a subscription's plan references an unknown provider).
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type GenerationResult<T> = Result<T, GenerationError>;
