//! Inbound signal authentication for the bridge.
//!
//! Two gates run before anything else touches a signal:
//! - Shared secret: trimmed, compared in constant time
//! - Freshness: signal timestamp within `max_lag` seconds of server time

pub mod authenticator;
pub mod config;
pub mod error;

pub use authenticator::{normalize_epoch_millis, secrets_match, Freshness, SignalAuthenticator};
pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
