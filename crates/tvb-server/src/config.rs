//! Server configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Webhook server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on (all interfaces).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on handling one webhook, exchange round-trip included.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
