//! Error types for tvb-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid or unsupported action '{0}'")]
    InvalidAction(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
