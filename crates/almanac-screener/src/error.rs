//! Error types for screening.

use almanac_returns::ReturnsError;
use thiserror::Error;

/// Result type for screening.
pub type Result<T> = std::result::Result<T, ScreenerError>;

/// Errors raised while configuring or running the screener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScreenerError {
    /// Configuration rejected before any computation
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The run was cancelled through its cancel flag
    #[error("Screening cancelled")]
    Cancelled,

    /// Return calculation error
    #[error(transparent)]
    Returns(ReturnsError),
}

impl From<ReturnsError> for ScreenerError {
    fn from(err: ReturnsError) -> Self {
        match err {
            ReturnsError::InvalidConfiguration(msg) => Self::InvalidConfiguration(msg),
            other => Self::Returns(other),
        }
    }
}
