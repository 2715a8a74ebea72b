//! Core domain types for the TradingView to Bitget signal bridge.
//!
//! This crate provides the pure, side-effect free building blocks of the relay:
//! - `Signal`: lenient view over the inbound webhook payload
//! - `SignalAction`: closed action vocabulary and its order-side mapping
//! - `normalize_symbol`: best-effort instrument to trading-pair mapping
//! - `NormalizedOrder`, `Size`, `ClientOrderId`: the exchange order schema

pub mod action;
pub mod decimal;
pub mod error;
pub mod order;
pub mod signal;
pub mod symbol;

pub use action::{ActionMapping, MarketPosition, SignalAction};
pub use decimal::Size;
pub use error::{CoreError, CoreResult};
pub use order::{ClientOrderId, NormalizedOrder, OrderSide, OrderType, TradeSide};
pub use signal::{Scalar, Signal};
pub use symbol::{normalize_symbol, FALLBACK_SYMBOL};
