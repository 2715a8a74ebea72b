//! Order-related types and identifiers.
//!
//! Provides order side, trade side, order type, client order ID and the
//! complete Bitget mix order body (`NormalizedOrder`).

use serde::{Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

use crate::decimal::Size;
use crate::error::{CoreError, CoreResult};

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the order opens a new position or closes an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Open,
    Close,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order type. The bridge only ever places market orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Market,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "market"),
        }
    }
}

/// Upper bound (exclusive) of the random suffix in a client order ID.
const CLIENT_OID_SUFFIX_RANGE: u128 = 1_000_000;

/// Client order ID for idempotency.
///
/// Bitget deduplicates retried sends on `clientOid`, so every relayed
/// signal gets a fresh one. Uniqueness is per-call, nothing is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ClientOrderId(String);

impl ClientOrderId {
    /// Create a client order ID for a given epoch-millis timestamp.
    ///
    /// Format: `tv-{timestamp_ms}-{n}` with `n` in `[0, 1_000_000)`.
    pub fn at(timestamp_ms: i64) -> Self {
        let suffix = Uuid::new_v4().as_u128() % CLIENT_OID_SUFFIX_RANGE;
        Self(format!("tv-{timestamp_ms}-{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ClientOrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Bitget mix `place-order` body.
///
/// Field declaration order is the serialization order. The serialized bytes
/// are what gets signed, so the order must not change between signing and
/// sending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedOrder {
    /// Canonical trading pair (e.g. "BTCUSDT").
    pub symbol: String,
    /// Deployment-wide product line (e.g. "USDT-FUTURES").
    pub product_type: String,
    /// "crossed" or "isolated".
    pub margin_mode: String,
    pub margin_coin: String,
    pub size: Size,
    pub side: OrderSide,
    pub trade_side: TradeSide,
    pub order_type: OrderType,
    pub client_oid: ClientOrderId,
    /// Sent as `"reduceOnly": "YES"` only for close orders.
    #[serde(skip_serializing_if = "is_false", serialize_with = "yes_no")]
    pub reduce_only: bool,
}

impl NormalizedOrder {
    /// Check that every field the exchange requires is present.
    pub fn validate(&self) -> CoreResult<()> {
        let required = [
            ("symbol", self.symbol.as_str()),
            ("productType", self.product_type.as_str()),
            ("marginMode", self.margin_mode.as_str()),
            ("marginCoin", self.margin_coin.as_str()),
            ("clientOid", self.client_oid.as_str()),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(CoreError::InvalidOrder(format!("{name} is empty")));
            }
        }

        if !self.size.is_positive() {
            return Err(CoreError::InvalidAmount(format!(
                "size must be positive, got {}",
                self.size
            )));
        }

        Ok(())
    }

    /// Serialize to the exact JSON body that will be signed and sent.
    pub fn to_body(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(|e| CoreError::InvalidOrder(e.to_string()))
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn yes_no<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "YES" } else { "NO" })
}
