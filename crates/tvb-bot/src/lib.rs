//! TradingView to Bitget signal bridge.
//!
//! Main application that wires the components together:
//! - Configuration (TOML file + environment overlay, secrets from env only)
//! - Signal relay with the reqwest dispatcher
//! - Webhook HTTP server with graceful shutdown

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::{AppConfig, Secrets};
pub use error::{AppError, AppResult};
