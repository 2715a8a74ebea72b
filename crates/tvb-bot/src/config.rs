//! Application configuration.
//!
//! Layering, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. TOML file (`--config` > `TVB_CONFIG` > `config/default.toml`)
//! 3. Environment overlay (`DEFAULT_SIZE`, `PORT`, ...)
//!
//! Secrets are read from the environment only; the TOML file never holds them.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tvb_auth::AuthConfig;
use tvb_core::Size;
use tvb_executor::{ExchangeConfig, ExchangeCredentials, OperatingMode, OrderProfile, RelayConfig};
use tvb_server::ServerConfig;
use zeroize::Zeroizing;

use crate::error::{AppError, AppResult};

/// Config file used when neither `--config` nor `TVB_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "TVB_CONFIG";

/// Non-secret application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// `live` sends orders, `dry_run` only builds and signs them.
    #[serde(default)]
    pub mode: OperatingMode,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub order: OrderProfile,
}

impl AppConfig {
    /// Resolve the config file, apply the process environment and validate.
    ///
    /// An explicitly requested file must exist. A missing default file falls
    /// back to built-in defaults.
    pub fn load(explicit_path: Option<&str>) -> AppResult<Self> {
        let requested = explicit_path
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_ENV).ok());

        let mut config = match requested {
            Some(path) => {
                tracing::info!(config_path = %path, "Loading configuration");
                Self::from_file(&path)?
            }
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                tracing::info!(config_path = DEFAULT_CONFIG_PATH, "Loading configuration");
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            None => {
                tracing::warn!(path = DEFAULT_CONFIG_PATH, "Config file not found, using defaults");
                Self::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Overlay environment variables on top of the file values.
    ///
    /// Blank variables are ignored. Malformed values are errors rather than
    /// silently falling back.
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(raw) = get("DEFAULT_SIZE") {
            self.order.default_size = match Size::parse(&raw) {
                Some(size) if size.is_positive() => size,
                _ => {
                    return Err(AppError::Config(format!(
                        "DEFAULT_SIZE must be a positive number, got '{raw}'"
                    )))
                }
            };
        }
        if let Some(symbol) = get("DEFAULT_SYMBOL") {
            self.order.default_symbol = symbol.to_ascii_uppercase();
        }
        if let Some(product_type) = get("PRODUCT_TYPE") {
            self.order.product_type = product_type;
        }
        if let Some(raw) = get("CLOSE_ON_EXIT") {
            self.order.close_on_exit = parse_bool(&raw).ok_or_else(|| {
                AppError::Config(format!("CLOSE_ON_EXIT must be true or false, got '{raw}'"))
            })?;
        }
        if let Some(raw) = get("PORT") {
            self.server.port = raw
                .parse()
                .map_err(|_| AppError::Config(format!("PORT must be a port number, got '{raw}'")))?;
        }

        Ok(())
    }

    /// Reject settings that could never produce a valid order.
    pub fn validate(&self) -> AppResult<()> {
        self.order
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;

        if !self.auth.default_max_lag_secs.is_finite() || self.auth.default_max_lag_secs < 0.0 {
            return Err(AppError::Config(format!(
                "auth.default_max_lag_secs must be a non-negative number, got {}",
                self.auth.default_max_lag_secs
            )));
        }
        if self.exchange.timeout_ms == 0 {
            return Err(AppError::Config("exchange.timeout_ms must be > 0".to_string()));
        }
        if !self.exchange.order_path.starts_with('/') {
            return Err(AppError::Config(format!(
                "exchange.order_path must start with '/', got '{}'",
                self.exchange.order_path
            )));
        }
        Ok(())
    }

    /// Settings for the signal relay.
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            mode: self.mode,
            auth: self.auth.clone(),
            order: self.order.clone(),
            exchange: self.exchange.clone(),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Secrets loaded from the environment.
#[derive(Default, Clone)]
pub struct Secrets {
    /// Shared secret TradingView alerts must carry.
    pub bridge_secret: Option<Zeroizing<String>>,
    pub exchange: ExchangeCredentials,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read `BRIDGE_SECRET` and the `BITGET_API_*` variables.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let bridge_secret = lookup("BRIDGE_SECRET")
            .map(Zeroizing::new)
            .filter(|s| !s.trim().is_empty());

        Self {
            bridge_secret,
            exchange: ExchangeCredentials::new(
                lookup("BITGET_API_KEY"),
                lookup("BITGET_API_SECRET"),
                lookup("BITGET_API_PASSPHRASE"),
            ),
        }
    }

    pub fn bridge_secret(&self) -> Option<&str> {
        self.bridge_secret.as_ref().map(|s| s.as_str())
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("bridge_secret_set", &self.bridge_secret.is_some())
            .field("exchange", &self.exchange)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio_test::{assert_err, assert_ok};

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.mode, OperatingMode::Live);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.default_max_lag_secs, 600.0);
        assert!(config.auth.allow_missing_timestamp);
        assert_eq!(config.order.default_symbol, "BTCUSDT");
        assert_eq!(config.order.default_size.to_string(), "0.01");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            mode = "dry_run"

            [server]
            port = 8080

            [exchange]
            signature_encoding = "hex"

            [order]
            margin_mode = "isolated"
            default_size = "0.5"
            "#,
        )
        .unwrap();

        assert_eq!(config.mode, OperatingMode::DryRun);
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.exchange.signature_encoding,
            tvb_executor::SignatureEncoding::Hex
        );
        assert_eq!(config.exchange.base_url, "https://api.bitget.com");
        assert_eq!(config.order.margin_mode, "isolated");
        assert_eq!(config.order.default_size.to_string(), "0.5");
        assert_eq!(config.order.product_type, "USDT-FUTURES");
    }

    #[test]
    fn test_shipped_config_parses() {
        let config = assert_ok!(AppConfig::from_toml(include_str!(
            "../../../config/default.toml"
        )));
        assert_ok!(config.validate());
        assert_eq!(
            config.exchange.order_url(),
            "https://api.bitget.com/api/v2/mix/order/place-order"
        );
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert_err!(AppConfig::from_toml(r#"mode = "paper""#));
    }

    #[test]
    fn test_env_overlay_wins() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                ("DEFAULT_SIZE", "0.25"),
                ("DEFAULT_SYMBOL", "ethusdt"),
                ("PRODUCT_TYPE", "USDC-FUTURES"),
                ("CLOSE_ON_EXIT", "false"),
                ("PORT", "8443"),
            ]))
            .unwrap();

        assert_eq!(config.order.default_size.to_string(), "0.25");
        assert_eq!(config.order.default_symbol, "ETHUSDT");
        assert_eq!(config.order.product_type, "USDC-FUTURES");
        assert!(!config.order.close_on_exit);
        assert_eq!(config.server.port, 8443);
    }

    #[test]
    fn test_blank_env_ignored() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[("DEFAULT_SIZE", "  "), ("PORT", "")]))
            .unwrap();
        assert_eq!(config.order.default_size.to_string(), "0.01");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_invalid_env_values_are_errors() {
        for (key, value) in [
            ("DEFAULT_SIZE", "abc"),
            ("DEFAULT_SIZE", "-1"),
            ("DEFAULT_SIZE", "0"),
            ("CLOSE_ON_EXIT", "maybe"),
            ("PORT", "99999"),
        ] {
            let mut config = AppConfig::default();
            let result = config.apply_env(env(&[(key, value)]));
            assert!(
                matches!(result, Err(AppError::Config(_))),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.auth.default_max_lag_secs = -1.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.exchange.order_path = "api/v2/mix/order/place-order".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_secrets_from_lookup() {
        let secrets = Secrets::from_lookup(env(&[
            ("BRIDGE_SECRET", "bridge"),
            ("BITGET_API_KEY", "key"),
            ("BITGET_API_SECRET", "secret"),
        ]));
        assert_eq!(secrets.bridge_secret(), Some("bridge"));
        assert_eq!(secrets.exchange.missing(), vec!["passphrase"]);

        let debug = format!("{secrets:?}");
        assert!(!debug.contains("bridge\""));
        assert!(!debug.contains("secret\""));
        assert!(debug.contains("bridge_secret_set: true"));
    }

    #[test]
    fn test_blank_bridge_secret_is_missing() {
        let secrets = Secrets::from_lookup(env(&[("BRIDGE_SECRET", "   ")]));
        assert!(secrets.bridge_secret().is_none());
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = toml::to_string(&AppConfig::default()).unwrap();
        assert!(toml_str.contains("mode"));
        assert!(toml_str.contains("order_path"));
        assert!(!toml_str.to_lowercase().contains("passphrase"));
    }
}
