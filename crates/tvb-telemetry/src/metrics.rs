//! Prometheus metrics for the signal bridge.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration failure
//! means a duplicate metric name, which is a programming error that should
//! crash at startup. These panics only occur during static initialization.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram, CounterVec, Encoder, Histogram, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Signals received, by parsed action (or "unknown").
pub static SIGNALS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tvb_signals_total",
        "Total webhook signals received",
        &["action"]
    )
    .unwrap()
});

/// Signals rejected before dispatch.
/// Labels: reason (error code, e.g. unauthorized/invalid_amount)
pub static REJECTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tvb_rejected_total",
        "Total signals rejected by the bridge",
        &["reason"]
    )
    .unwrap()
});

/// Signals accepted but intentionally not acted upon.
pub static SKIPPED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tvb_skipped_total",
        "Total signals acknowledged and skipped",
        &["reason"]
    )
    .unwrap()
});

/// Orders sent to the exchange.
pub static ORDERS_DISPATCHED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tvb_orders_dispatched_total",
        "Total orders dispatched to the exchange",
        &["side", "trade_side"]
    )
    .unwrap()
});

/// Exchange responses by HTTP status ("transport" when none was received).
pub static UPSTREAM_STATUS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tvb_upstream_status_total",
        "Exchange responses by HTTP status",
        &["status"]
    )
    .unwrap()
});

/// Exchange round-trip latency in milliseconds.
pub static DISPATCH_LATENCY_MS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "tvb_dispatch_latency_ms",
        "Exchange order round-trip latency in milliseconds",
        vec![10.0, 25.0, 50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0]
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a received signal.
    pub fn signal_received(action: &str) {
        SIGNALS_TOTAL.with_label_values(&[action]).inc();
    }

    /// Record a rejected signal.
    pub fn signal_rejected(reason: &str) {
        REJECTED_TOTAL.with_label_values(&[reason]).inc();
    }

    pub fn signal_skipped(reason: &str) {
        SKIPPED_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record an order handed to the exchange.
    pub fn order_dispatched(side: &str, trade_side: &str) {
        ORDERS_DISPATCHED_TOTAL
            .with_label_values(&[side, trade_side])
            .inc();
    }

    /// Record the exchange's answer. `None` means no response (transport failure).
    pub fn upstream_status(status: Option<u16>) {
        let label = status.map_or_else(|| "transport".to_string(), |s| s.to_string());
        UPSTREAM_STATUS_TOTAL.with_label_values(&[&label]).inc();
    }

    pub fn dispatch_latency(latency_ms: f64) {
        DISPATCH_LATENCY_MS.observe(latency_ms);
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn gather_text() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment() {
        let before = REJECTED_TOTAL.with_label_values(&["unauthorized"]).get();
        Metrics::signal_rejected("unauthorized");
        let after = REJECTED_TOTAL.with_label_values(&["unauthorized"]).get();
        assert_eq!(after - before, 1.0);
    }

    #[test]
    fn test_transport_failures_labelled() {
        let before = UPSTREAM_STATUS_TOTAL.with_label_values(&["transport"]).get();
        Metrics::upstream_status(None);
        Metrics::upstream_status(Some(200));
        assert_eq!(
            UPSTREAM_STATUS_TOTAL.with_label_values(&["transport"]).get() - before,
            1.0
        );
    }

    #[test]
    fn test_gather_text_contains_metrics() {
        Metrics::signal_received("buy");
        Metrics::dispatch_latency(42.0);
        let text = Metrics::gather_text().unwrap();
        assert!(text.contains("tvb_signals_total"));
        assert!(text.contains("tvb_dispatch_latency_ms_bucket"));
    }
}
