//! Signal action vocabulary.
//!
//! TradingView alerts carry free-form action strings (`{{strategy.order.action}}`
//! or hand-written templates). They are parsed once into `SignalAction` and
//! everything downstream matches on the closed enum.

use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::order::{OrderSide, TradeSide};

/// Rejected actions are echoed back to the caller, truncated to this length.
const MAX_ECHO_CHARS: usize = 64;

/// Parsed trading instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalAction {
    Buy,
    Sell,
    OpenLong,
    OpenShort,
    CloseLong,
    CloseShort,
}

/// Exchange-side view of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionMapping {
    pub side: OrderSide,
    pub trade_side: TradeSide,
    pub reduce_only: bool,
}

impl SignalAction {
    /// Parse a raw action string (case-insensitive, surrounding whitespace ignored).
    ///
    /// `long` and `short` are aliases for `open_long` and `open_short`.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            "long" | "open_long" => Ok(Self::OpenLong),
            "short" | "open_short" => Ok(Self::OpenShort),
            "close_long" => Ok(Self::CloseLong),
            "close_short" => Ok(Self::CloseShort),
            _ => Err(CoreError::InvalidAction(
                normalized.chars().take(MAX_ECHO_CHARS).collect(),
            )),
        }
    }

    /// Map to Bitget `side` / `tradeSide`.
    ///
    /// Closing a position trades against its opening side: a long is closed
    /// by selling, a short by buying.
    pub fn mapping(&self) -> ActionMapping {
        let (side, trade_side) = match self {
            Self::Buy | Self::OpenLong => (OrderSide::Buy, TradeSide::Open),
            Self::Sell | Self::OpenShort => (OrderSide::Sell, TradeSide::Open),
            Self::CloseLong => (OrderSide::Buy.opposite(), TradeSide::Close),
            Self::CloseShort => (OrderSide::Sell.opposite(), TradeSide::Close),
        };
        ActionMapping {
            side,
            trade_side,
            reduce_only: trade_side == TradeSide::Close,
        }
    }

    /// The close order implied by a strategy fill that left the position flat.
    ///
    /// A `sell` that ends flat exits a long, a `buy` that ends flat exits a
    /// short. Explicit open/close actions are not exits.
    pub fn as_exit(&self) -> Option<Self> {
        match self {
            Self::Sell => Some(Self::CloseLong),
            Self::Buy => Some(Self::CloseShort),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::OpenLong => "open_long",
            Self::OpenShort => "open_short",
            Self::CloseLong => "close_long",
            Self::CloseShort => "close_short",
        }
    }
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy position after the alerting fill (`{{strategy.market_position}}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketPosition {
    Long,
    Short,
    Flat,
}

impl MarketPosition {
    /// Lenient parse; unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "long" => Some(Self::Long),
            "short" => Some(Self::Short),
            "flat" => Some(Self::Flat),
            _ => None,
        }
    }
}
