//! Execution configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tvb_core::{CoreError, CoreResult, Size};

use crate::signer::SignatureEncoding;

/// Operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    /// Orders are signed and sent to the exchange.
    #[default]
    Live,
    /// Orders are built and signed but never sent.
    DryRun,
}

/// Bitget REST endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// REST host (e.g., "https://api.bitget.com").
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Order placement path, part of the signed prehash.
    #[serde(default = "default_order_path")]
    pub order_path: String,
    /// Signature encoding. Must match the exchange's documented contract.
    #[serde(default)]
    pub signature_encoding: SignatureEncoding,
    /// Outbound request timeout (ms). Default: 10,000.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Value of the `locale` header.
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_base_url() -> String {
    "https://api.bitget.com".to_string()
}

fn default_order_path() -> String {
    "/api/v2/mix/order/place-order".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_locale() -> String {
    "en-US".to_string()
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            order_path: default_order_path(),
            signature_encoding: SignatureEncoding::default(),
            timeout_ms: default_timeout_ms(),
            locale: default_locale(),
        }
    }
}

impl ExchangeConfig {
    /// Full order placement URL.
    pub fn order_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.order_path)
    }
}

/// Deployment-wide order constants and defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderProfile {
    /// Bitget product line. Default: "USDT-FUTURES".
    #[serde(default = "default_product_type")]
    pub product_type: String,
    /// "crossed" or "isolated". Default: "crossed".
    #[serde(default = "default_margin_mode")]
    pub margin_mode: String,
    #[serde(default = "default_margin_coin")]
    pub margin_coin: String,
    /// Size used when the signal carries no amount.
    #[serde(default = "default_size")]
    pub default_size: Size,
    /// Symbol used when the instrument cannot be mapped.
    #[serde(default = "default_symbol")]
    pub default_symbol: String,
    /// Send exit signals (fills that leave the strategy flat) as close orders.
    /// When false they are acknowledged and skipped.
    #[serde(default = "default_close_on_exit")]
    pub close_on_exit: bool,
}

fn default_product_type() -> String {
    "USDT-FUTURES".to_string()
}

fn default_margin_mode() -> String {
    "crossed".to_string()
}

fn default_margin_coin() -> String {
    "USDT".to_string()
}

fn default_size() -> Size {
    Size::new(Decimal::new(1, 2))
}

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}

fn default_close_on_exit() -> bool {
    true
}

impl Default for OrderProfile {
    fn default() -> Self {
        Self {
            product_type: default_product_type(),
            margin_mode: default_margin_mode(),
            margin_coin: default_margin_coin(),
            default_size: default_size(),
            default_symbol: default_symbol(),
            close_on_exit: default_close_on_exit(),
        }
    }
}

impl OrderProfile {
    /// Reject profiles that could only ever produce invalid orders.
    pub fn validate(&self) -> CoreResult<()> {
        for (name, value) in [
            ("product_type", &self.product_type),
            ("margin_mode", &self.margin_mode),
            ("margin_coin", &self.margin_coin),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::InvalidConfig(format!("{name} must not be empty")));
            }
        }
        if !self.default_size.is_positive() {
            return Err(CoreError::InvalidConfig(format!(
                "default_size must be positive, got {}",
                self.default_size
            )));
        }
        Ok(())
    }
}
