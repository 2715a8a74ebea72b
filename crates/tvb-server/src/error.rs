//! Server error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;
