//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Executor error: {0}")]
    Executor(#[from] tvb_executor::ExecutorError),

    #[error("Server error: {0}")]
    Server(#[from] tvb_server::ServerError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] tvb_telemetry::TelemetryError),
}

pub type AppResult<T> = Result<T, AppError>;
