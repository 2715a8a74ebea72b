//! Inbound webhook signal.
//!
//! TradingView alert templates are hand-written by users, so the payload is
//! read leniently: numbers may arrive as strings and vice versa, and fields
//! with the wrong JSON type are treated as absent instead of failing the
//! whole request.

use serde_json::{Map, Number, Value};
use std::fmt;

/// A JSON value that may be either a number or a numeric string.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(Number),
    Text(String),
}

impl Scalar {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::String(s) if !s.trim().is_empty() => Some(Self::Text(s.trim().to_string())),
            _ => None,
        }
    }

    /// Numeric value, if it is finite.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => s.parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }

    /// Textual form, suitable for exact decimal parsing.
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// Inbound trading signal. Untrusted and immutable once parsed.
#[derive(Clone, Default, PartialEq)]
pub struct Signal {
    /// Shared webhook secret.
    pub secret: Option<String>,
    /// Signal creation time, seconds or milliseconds since epoch.
    pub timestamp: Option<Scalar>,
    /// Per-signal freshness window override (seconds).
    pub max_lag: Option<Scalar>,
    /// Raw action (`action`, falling back to `side`).
    pub action: Option<String>,
    /// Raw quantity (`order.amount`, falling back to `qty`).
    pub amount: Option<Scalar>,
    /// Raw instrument (`tv_instrument`, falling back to `symbol`).
    pub instrument: Option<String>,
    /// Strategy position after the fill (`long`/`short`/`flat`).
    pub market_position: Option<String>,
}

impl Signal {
    /// Parse a raw request body.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        Ok(Self::from_value(&value))
    }

    /// Extract a signal from an arbitrary JSON value.
    ///
    /// Anything that is not a JSON object yields an empty signal.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let amount = obj
            .get("order")
            .and_then(|order| order.get("amount"))
            .and_then(Scalar::from_value)
            .or_else(|| obj.get("qty").and_then(Scalar::from_value));

        Self {
            secret: text_field(obj, "secret"),
            timestamp: obj.get("timestamp").and_then(Scalar::from_value),
            max_lag: obj.get("max_lag").and_then(Scalar::from_value),
            action: text_field(obj, "action").or_else(|| text_field(obj, "side")),
            amount,
            instrument: text_field(obj, "tv_instrument").or_else(|| text_field(obj, "symbol")),
            market_position: text_field(obj, "market_position"),
        }
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("timestamp", &self.timestamp)
            .field("max_lag", &self.max_lag)
            .field("action", &self.action)
            .field("amount", &self.amount)
            .field("instrument", &self.instrument)
            .field("market_position", &self.market_position)
            .finish()
    }
}

/// Non-empty string field; numbers are accepted and rendered as text.
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
