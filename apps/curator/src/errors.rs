use thiserror::Error;

use crate::ports::CollaboratorError;

/// Pipeline-level error type.
///
/// Per-candidate failures never surface here: they are expressed as
/// [`Rejection`](crate::models::Rejection) verdicts. Only invalid configuration
/// (fatal, checked at construction) and sink failures cross this boundary.
#[derive(Debug, Error)]
pub enum CurationError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),
}

impl CurationError {
    pub fn config(msg: impl Into<String>) -> Self {
        CurationError::Configuration(msg.into())
    }
}

/// Shorthand for `Err(CurationError::Configuration(..))` when `cond` is false.
pub(crate) fn ensure(cond: bool, msg: impl FnOnce() -> String) -> Result<(), CurationError> {
    if cond {
        Ok(())
    } else {
        Err(CurationError::Configuration(msg()))
    }
}
