//! Precision-safe order quantity.
//!
//! Uses `rust_decimal` so that quantities round-trip exactly and always
//! render as plain decimal strings, the format Bitget expects for `size`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Size/quantity with exact decimal precision.
///
/// Serializes as a JSON string (e.g. `"0.01"`), never in exponential notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(pub Decimal);

impl Size {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value.normalize())
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Parse a loosely formatted quantity.
    ///
    /// Accepts plain decimals (`"0.01"`, `" 5 "`) and scientific notation
    /// (`"1e-3"`, as produced by JSON number formatting). Trailing zeros are
    /// trimmed so `"0.010"` and `"0.01"` yield the same size.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .ok()
            .map(Self::new)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Size {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.trim().parse()?))
    }
}

impl From<Decimal> for Size {
    fn from(d: Decimal) -> Self {
        Self::new(d)
    }
}
