//! Error types for return calculations.

use thiserror::Error;

/// Result type for return calculations.
pub type Result<T> = std::result::Result<T, ReturnsError>;

/// Errors raised by the return calculator and aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReturnsError {
    /// An argument violates the operation's contract
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A configuration value is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
