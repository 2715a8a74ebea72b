//! Application wiring and lifecycle.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tvb_executor::{DynDispatcher, HttpDispatcher, OperatingMode, SignalRelay};
use tvb_server::{run_server, AppState};

use crate::config::{AppConfig, Secrets};
use crate::error::AppResult;

/// The running bridge: one relay behind one webhook server.
pub struct Application {
    config: AppConfig,
    relay: Arc<SignalRelay>,
}

impl Application {
    /// Create the application with the reqwest dispatcher.
    pub fn new(config: AppConfig, secrets: Secrets) -> AppResult<Self> {
        let timeout = Duration::from_millis(config.exchange.timeout_ms);
        let dispatcher: DynDispatcher = Arc::new(HttpDispatcher::new(timeout)?);
        Ok(Self::with_dispatcher(config, secrets, dispatcher))
    }

    /// Create the application with a custom dispatcher.
    pub fn with_dispatcher(config: AppConfig, secrets: Secrets, dispatcher: DynDispatcher) -> Self {
        let Secrets {
            bridge_secret,
            exchange,
        } = secrets;
        let relay = SignalRelay::new(
            config.relay_config(),
            bridge_secret.as_ref().map(|s| s.as_str()),
            exchange,
            dispatcher,
        );
        Self {
            config,
            relay: Arc::new(relay),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn relay(&self) -> &Arc<SignalRelay> {
        &self.relay
    }

    /// Log the effective configuration and which credentials are present.
    ///
    /// Only presence is logged, never values.
    pub fn log_startup(&self) {
        let credentials = self.relay.credentials();
        info!(
            version = env!("CARGO_PKG_VERSION"),
            mode = ?self.config.mode,
            port = self.config.server.port,
            order_url = %self.config.exchange.order_url(),
            product_type = %self.config.order.product_type,
            margin_mode = %self.config.order.margin_mode,
            default_symbol = %self.config.order.default_symbol,
            default_size = %self.config.order.default_size,
            close_on_exit = self.config.order.close_on_exit,
            "Bridge configuration"
        );
        info!(
            bridge_secret = self.relay.bridge_secret_configured(),
            exchange_credentials = credentials.is_complete(),
            "Credential audit"
        );

        if !self.relay.bridge_secret_configured() {
            warn!("BRIDGE_SECRET not set, every webhook will be rejected");
        }
        if !credentials.is_complete() {
            warn!(
                missing = ?credentials.missing(),
                "Exchange credentials incomplete, orders will be rejected"
            );
        }
        if self.config.auth.allow_missing_timestamp {
            warn!("Signals without a timestamp are accepted as fresh");
        }
        if self.config.mode == OperatingMode::DryRun {
            warn!("Dry-run mode: orders are signed but never sent");
        }
    }

    /// Serve webhooks until Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        let state = AppState::new(self.relay, &self.config.server);
        run_server(state, self.config.server, shutdown_signal()).await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C, shutting down"),
    }
}
