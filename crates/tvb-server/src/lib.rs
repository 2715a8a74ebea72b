//! tvb-server - Webhook endpoint for the signal bridge.
//!
//! ```text
//! TradingView alert ──POST /hook──► SignalRelay ──signed POST──► Bitget
//!                                       │
//!                     JSON response ◄───┘
//! ```
//!
//! Routes:
//! - `POST /hook`    relay a signal (body parsed as JSON regardless of content type)
//! - `GET /`, `/health`  liveness, plain text
//! - `GET /metrics`  Prometheus text exposition
//!
//! # Usage
//!
//! ```ignore
//! use tvb_server::{run_server, AppState, ServerConfig};
//!
//! let state = AppState::new(Arc::new(relay), &config);
//! run_server(state, config, async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! ```

mod config;
mod error;
mod response;
mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use response::{error_response, outcome_response};
pub use server::{create_router, run_server, AppState};
