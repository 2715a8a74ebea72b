//! Authentication gate configuration.

use serde::{Deserialize, Serialize};

/// Freshness window settings.
///
/// The shared secret itself is never part of this struct; it is loaded from
/// the environment and handed to `SignalAuthenticator::new` separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Freshness window (seconds) when the signal carries no `max_lag`.
    #[serde(default = "default_max_lag_secs")]
    pub default_max_lag_secs: f64,
    /// Treat a signal without a usable timestamp as fresh.
    ///
    /// Keeps cooperating senders that omit `{{timenow}}` working, at the cost
    /// of replay protection for those signals.
    #[serde(default = "default_allow_missing_timestamp")]
    pub allow_missing_timestamp: bool,
}

fn default_max_lag_secs() -> f64 {
    600.0
}

fn default_allow_missing_timestamp() -> bool {
    true
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_max_lag_secs: default_max_lag_secs(),
            allow_missing_timestamp: default_allow_missing_timestamp(),
        }
    }
}
