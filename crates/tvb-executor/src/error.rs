//! Executor error types.

use thiserror::Error;
use tvb_auth::AuthError;
use tvb_core::{CoreError, NormalizedOrder};

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Failure of a single relay attempt.
///
/// Everything except `Upstream` and `Transport` is detected locally before
/// any network call.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Exchange credentials not configured: missing {}", missing.join(", "))]
    ExchangeNotConfigured { missing: Vec<&'static str> },

    /// The exchange answered with a non-success status. Relayed verbatim.
    #[error("Exchange returned HTTP {status}")]
    Upstream {
        status: u16,
        body: String,
        order: Box<NormalizedOrder>,
    },

    /// The request never produced an exchange response.
    #[error("Exchange request failed: {message}")]
    Transport {
        message: String,
        order: Box<NormalizedOrder>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Machine-readable error code for the webhook response.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Auth(AuthError::MissingConfig) => "bridge_secret_not_set",
            Self::Auth(AuthError::Unauthorized) => "unauthorized",
            Self::Auth(AuthError::StaleOrFutureSignal { .. }) => "stale_or_future_signal",
            Self::Core(CoreError::InvalidAction(_)) => "invalid_action",
            Self::Core(CoreError::InvalidAmount(_)) => "invalid_amount",
            Self::Core(_) => "server_error",
            Self::ExchangeNotConfigured { .. } => "exchange_env_not_set",
            Self::Upstream { .. } | Self::Transport { .. } => "upstream_error",
            Self::Internal(_) => "server_error",
        }
    }

    /// HTTP status for the webhook response.
    ///
    /// Upstream failures keep the exchange's status so callers can tell a
    /// bridge-side rejection from an exchange-side one.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Auth(AuthError::MissingConfig) => 500,
            Self::Auth(AuthError::Unauthorized) => 403,
            Self::Auth(AuthError::StaleOrFutureSignal { .. }) => 400,
            Self::Core(CoreError::InvalidAction(_) | CoreError::InvalidAmount(_)) => 400,
            Self::Core(_) => 500,
            Self::ExchangeNotConfigured { .. } => 500,
            Self::Upstream { status, .. } => *status,
            Self::Transport { .. } => 502,
            Self::Internal(_) => 500,
        }
    }

    /// The order that was built before the failure, if any.
    pub fn order(&self) -> Option<&NormalizedOrder> {
        match self {
            Self::Upstream { order, .. } | Self::Transport { order, .. } => Some(&**order),
            _ => None,
        }
    }
}

impl From<ExecutorError> for RelayError {
    fn from(e: ExecutorError) -> Self {
        match e {
            ExecutorError::Core(core) => Self::Core(core),
            other => Self::Internal(other.to_string()),
        }
    }
}
