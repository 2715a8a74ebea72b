//! Shared-secret and freshness checks.
//!
//! Runs before any mapping, signing or network I/O. Pure: server time is
//! passed in, nothing is cached between calls.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;
use tvb_core::Signal;
use zeroize::Zeroizing;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Timestamps above this magnitude are milliseconds.
const MILLIS_THRESHOLD: f64 = 1e12;

/// Fixed key for secret comparison tags.
const SECRET_CHECK_KEY: &[u8] = b"tvb-bridge-secret-check";

/// Outcome of a passed freshness check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Freshness {
    /// Signal time in epoch milliseconds (server time if the signal had none).
    pub ts_ms: i64,
    /// `|now - ts|` in milliseconds.
    pub lag_ms: u64,
    /// Effective window used for the check.
    pub max_lag_secs: f64,
    /// True when the signal carried no usable timestamp.
    pub timestamp_defaulted: bool,
}

/// Signal authenticator holding the expected shared secret.
pub struct SignalAuthenticator {
    secret: Option<Zeroizing<String>>,
    config: AuthConfig,
}

impl SignalAuthenticator {
    /// Create an authenticator. A blank secret counts as not configured.
    pub fn new(secret: Option<&str>, config: AuthConfig) -> Self {
        let secret = secret
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Zeroizing::new(s.to_string()));
        Self { secret, config }
    }

    /// Whether a bridge secret is configured.
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Validate the shared secret, then the freshness window.
    ///
    /// `now_ms` is server time in epoch milliseconds.
    ///
    /// # Errors
    /// - `MissingConfig` when no bridge secret is configured
    /// - `Unauthorized` when the signal secret is absent or differs
    /// - `StaleOrFutureSignal` when `|now - ts| > max_lag`
    pub fn authenticate(&self, signal: &Signal, now_ms: i64) -> AuthResult<Freshness> {
        let expected = self.secret.as_ref().ok_or(AuthError::MissingConfig)?;

        let provided = signal.secret.as_deref().map(str::trim).unwrap_or_default();
        if provided.is_empty() || !secrets_match(provided, expected.as_str()) {
            return Err(AuthError::Unauthorized);
        }

        self.check_freshness(signal, now_ms)
    }

    /// Freshness check alone.
    ///
    /// The lag is measured in milliseconds so the window edge is exact.
    /// Errors report whole seconds.
    pub fn check_freshness(&self, signal: &Signal, now_ms: i64) -> AuthResult<Freshness> {
        let max_lag_secs = signal
            .max_lag
            .as_ref()
            .and_then(|lag| lag.as_f64())
            .unwrap_or(self.config.default_max_lag_secs)
            .max(0.0);

        let ts_ms = signal
            .timestamp
            .as_ref()
            .and_then(|ts| ts.as_f64())
            .map(normalize_epoch_millis);

        let (ts_ms, timestamp_defaulted) = match ts_ms {
            Some(ts) => (ts, false),
            None if self.config.allow_missing_timestamp => (now_ms, true),
            None => {
                return Err(AuthError::StaleOrFutureSignal {
                    now_secs: now_ms.div_euclid(1000),
                    ts_secs: None,
                    max_lag_secs,
                })
            }
        };

        let lag_ms = (i128::from(now_ms) - i128::from(ts_ms)).unsigned_abs();
        if lag_ms as f64 > max_lag_secs * 1000.0 {
            return Err(AuthError::StaleOrFutureSignal {
                now_secs: now_ms.div_euclid(1000),
                ts_secs: Some(ts_ms.div_euclid(1000)),
                max_lag_secs,
            });
        }

        if timestamp_defaulted {
            debug!("Signal has no usable timestamp, treating as fresh");
        }

        Ok(Freshness {
            ts_ms,
            lag_ms: u64::try_from(lag_ms).unwrap_or(u64::MAX),
            max_lag_secs,
            timestamp_defaulted,
        })
    }
}

/// Convert a seconds-or-milliseconds epoch value to whole milliseconds.
pub fn normalize_epoch_millis(ts: f64) -> i64 {
    let millis = if ts.abs() > MILLIS_THRESHOLD {
        ts
    } else {
        ts * 1000.0
    };
    // `as` saturates on out-of-range floats
    millis.floor() as i64
}

/// Constant-time secret comparison.
///
/// Each secret is the message of an HMAC under a fixed key, so any two
/// distinct secrets yield distinct 32-byte tags. The tags are compared with
/// `verify_slice`, which does not short-circuit on the first differing byte.
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    bytes_match(provided.as_bytes(), expected.as_bytes())
}

fn bytes_match(provided: &[u8], expected: &[u8]) -> bool {
    let (Ok(mut expected_mac), Ok(mut provided_mac)) = (
        HmacSha256::new_from_slice(SECRET_CHECK_KEY),
        HmacSha256::new_from_slice(SECRET_CHECK_KEY),
    ) else {
        return false;
    };
    expected_mac.update(expected);
    provided_mac.update(provided);

    let expected_tag = expected_mac.finalize().into_bytes();
    provided_mac.verify_slice(&expected_tag).is_ok()
}
