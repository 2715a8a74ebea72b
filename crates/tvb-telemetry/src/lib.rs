//! Prometheus metrics and structured logging for the signal bridge.
//!
//! - Prometheus counters for signals, rejections and dispatches
//! - Exchange round-trip latency histogram
//! - Structured logging with tracing (JSON in production)

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
