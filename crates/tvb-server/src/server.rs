//! HTTP server implementation using axum.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use tvb_core::{Signal, SignalAction};
use tvb_executor::{RelayError, RelayOutcome, SignalRelay};
use tvb_telemetry::Metrics;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::response::{error_response, outcome_response};

const LIVENESS_TEXT: &str = "tradingview-bitget bridge is running";

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    relay: Arc<SignalRelay>,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(relay: Arc<SignalRelay>, config: &ServerConfig) -> Self {
        Self {
            relay,
            request_timeout: config.request_timeout(),
        }
    }
}

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(liveness))
        .route("/metrics", get(metrics))
        .route("/hook", post(handle_hook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

async fn metrics() -> Response {
    match Metrics::gather_text() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Relay one webhook signal.
///
/// The body is read as raw bytes so the content type does not matter; an
/// unparseable body becomes an empty signal and fails authentication.
async fn handle_hook(State(state): State<AppState>, body: Bytes) -> Response {
    let signal = Signal::from_slice(&body).unwrap_or_else(|e| {
        debug!(error = %e, len = body.len(), "Webhook body is not JSON, treating as empty");
        Signal::default()
    });

    let action_label = signal
        .action
        .as_deref()
        .and_then(|raw| SignalAction::parse(raw).ok())
        .map_or("invalid", |action| action.as_str());
    Metrics::signal_received(action_label);

    let now_ms = chrono::Utc::now().timestamp_millis();
    let started = Instant::now();

    let result = match tokio::time::timeout(
        state.request_timeout,
        state.relay.process(&signal, now_ms),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => {
            warn!(
                timeout_ms = state.request_timeout.as_millis() as u64,
                "Webhook handling timed out"
            );
            Metrics::upstream_status(None);
            Metrics::signal_rejected("upstream_error");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "ok": false,
                    "error": "upstream_error",
                    "details": { "message": "request timed out" },
                })),
            )
                .into_response();
        }
    };

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    record_metrics(&result, elapsed_ms);

    match result {
        Ok(outcome) => outcome_response(&outcome),
        Err(e) => {
            warn!(code = e.code(), status = e.status_code(), error = %e, "Signal rejected");
            error_response(&e)
        }
    }
}

fn record_metrics(result: &Result<RelayOutcome, RelayError>, elapsed_ms: f64) {
    match result {
        Ok(RelayOutcome::Sent { order, response }) => {
            Metrics::order_dispatched(order.side.as_str(), order.trade_side.as_str());
            Metrics::upstream_status(Some(response.status));
            Metrics::dispatch_latency(elapsed_ms);
        }
        Ok(RelayOutcome::DryRun { .. }) => {}
        Ok(RelayOutcome::Skipped { reason, .. }) => Metrics::signal_skipped(reason),
        Err(e) => {
            if let Some(order) = e.order() {
                Metrics::order_dispatched(order.side.as_str(), order.trade_side.as_str());
                Metrics::dispatch_latency(elapsed_ms);
            }
            match e {
                RelayError::Upstream { status, .. } => Metrics::upstream_status(Some(*status)),
                RelayError::Transport { .. } => Metrics::upstream_status(None),
                _ => {}
            }
            Metrics::signal_rejected(e.code());
        }
    }
}

/// Run the webhook HTTP server until `shutdown` resolves.
pub async fn run_server<F>(state: AppState, config: ServerConfig, shutdown: F) -> ServerResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            port: config.port,
            source,
        })?;
    info!(port = config.port, "Webhook server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Webhook server stopped");
    Ok(())
}
