//! Authentication error types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    /// Bridge secret is not configured. Server-side fault, not the caller's.
    #[error("Bridge secret not configured")]
    MissingConfig,

    #[error("Unauthorized (secret mismatch)")]
    Unauthorized,

    #[error("Stale or future signal: now={now_secs} ts={ts_secs:?} max_lag={max_lag_secs}")]
    StaleOrFutureSignal {
        now_secs: i64,
        ts_secs: Option<i64>,
        max_lag_secs: f64,
    },
}

pub type AuthResult<T> = Result<T, AuthError>;
