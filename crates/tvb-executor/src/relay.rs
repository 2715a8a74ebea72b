//! Signal relay pipeline.
//!
//! One-shot per inbound signal:
//!
//! ```text
//! Signal ─► authenticate ─► parse action ─┐
//!                          normalize symbol ┴► build order ─► sign ─► dispatch
//! ```
//!
//! All validation happens before the order is signed, and signing happens
//! before the single network call. The relay holds no mutable state; any
//! number of signals can be processed concurrently.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use tvb_auth::{AuthConfig, SignalAuthenticator};
use tvb_core::{normalize_symbol, MarketPosition, NormalizedOrder, Signal, SignalAction};

use crate::builder::OrderBuilder;
use crate::config::{ExchangeConfig, OperatingMode, OrderProfile};
use crate::credentials::ExchangeCredentials;
use crate::dispatcher::{DispatchRequest, DispatchResponse, DynDispatcher};
use crate::error::RelayError;
use crate::signer::{RequestSigner, SignedRequest};

/// Reason reported when an exit signal is ignored.
pub const SKIP_EXIT_DISABLED: &str = "exit_signal_ignored";

/// Non-secret relay settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub mode: OperatingMode,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub order: OrderProfile,
    #[serde(default)]
    pub exchange: ExchangeConfig,
}

/// Result of a relayed signal.
#[derive(Debug, Clone)]
pub enum RelayOutcome {
    /// Order sent and the exchange answered with a success status.
    Sent {
        order: NormalizedOrder,
        response: DispatchResponse,
    },
    /// Dry-run mode: order built and signed, not sent.
    DryRun {
        order: NormalizedOrder,
        signed: SignedRequest,
    },
    /// Signal accepted but intentionally not acted upon.
    Skipped {
        action: SignalAction,
        reason: &'static str,
    },
}

/// Stateless signal-to-order relay.
pub struct SignalRelay {
    authenticator: SignalAuthenticator,
    builder: OrderBuilder,
    exchange: ExchangeConfig,
    credentials: ExchangeCredentials,
    mode: OperatingMode,
    dispatcher: DynDispatcher,
}

impl SignalRelay {
    pub fn new(
        config: RelayConfig,
        bridge_secret: Option<&str>,
        credentials: ExchangeCredentials,
        dispatcher: DynDispatcher,
    ) -> Self {
        Self {
            authenticator: SignalAuthenticator::new(bridge_secret, config.auth),
            builder: OrderBuilder::new(config.order),
            exchange: config.exchange,
            credentials,
            mode: config.mode,
            dispatcher,
        }
    }

    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// Whether the bridge secret is configured.
    pub fn bridge_secret_configured(&self) -> bool {
        self.authenticator.is_configured()
    }

    pub fn credentials(&self) -> &ExchangeCredentials {
        &self.credentials
    }

    /// Process one signal end to end.
    ///
    /// `now_ms` is server time in epoch milliseconds; it drives the freshness
    /// check, the client order ID and the request timestamp.
    pub async fn process(&self, signal: &Signal, now_ms: i64) -> Result<RelayOutcome, RelayError> {
        // 1) Secret + freshness
        let freshness = self.authenticator.authenticate(signal, now_ms)?;
        debug!(
            lag_ms = freshness.lag_ms,
            max_lag_secs = freshness.max_lag_secs,
            timestamp_defaulted = freshness.timestamp_defaulted,
            "Signal authenticated"
        );

        // 2) Action, with exit resolution
        let action = SignalAction::parse(signal.action.as_deref().unwrap_or_default())?;
        let action = match self.resolve_exit(signal, action) {
            Ok(action) => action,
            Err(reason) => {
                info!(%action, reason, "Exit signal skipped");
                return Ok(RelayOutcome::Skipped { action, reason });
            }
        };

        // 3) Symbol
        let symbol = normalize_symbol(
            signal.instrument.as_deref().unwrap_or_default(),
            &self.builder.profile().default_symbol,
        );

        // 4) Order (amount validated here, before any signing)
        let order = self.builder.build(
            symbol,
            action.mapping(),
            signal.amount.as_ref(),
            now_ms,
        )?;

        // 5) Credentials
        let keys = self
            .credentials
            .keys()
            .map_err(|missing| RelayError::ExchangeNotConfigured { missing })?;

        // 6) Sign the exact body
        let signer = RequestSigner::new(keys.api_secret.clone(), self.exchange.signature_encoding);
        let signed = signer.sign_order(&self.exchange.order_path, &order, now_ms)?;

        info!(
            symbol = %order.symbol,
            side = %order.side,
            trade_side = %order.trade_side,
            size = %order.size,
            client_oid = %order.client_oid,
            %action,
            "Order built and signed"
        );

        if self.mode == OperatingMode::DryRun {
            return Ok(RelayOutcome::DryRun { order, signed });
        }

        // 7) Dispatch, once
        let request = DispatchRequest::new(
            signed,
            self.exchange.order_url(),
            &keys,
            &self.exchange.locale,
        );
        let response = match self.dispatcher.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(client_oid = %order.client_oid, error = %e, "Order dispatch failed");
                return Err(RelayError::Transport {
                    message: e.to_string(),
                    order: Box::new(order),
                });
            }
        };

        if !response.is_success() {
            warn!(
                client_oid = %order.client_oid,
                status = response.status,
                body = %response.body,
                "Exchange rejected order"
            );
            return Err(RelayError::Upstream {
                status: response.status,
                body: response.body,
                order: Box::new(order),
            });
        }

        info!(
            client_oid = %order.client_oid,
            status = response.status,
            "Order accepted by exchange"
        );
        Ok(RelayOutcome::Sent { order, response })
    }

    /// Turn a fill that left the strategy flat into the matching close.
    ///
    /// Returns the action to execute, or the skip reason when exits are
    /// disabled.
    fn resolve_exit(
        &self,
        signal: &Signal,
        action: SignalAction,
    ) -> Result<SignalAction, &'static str> {
        let is_flat = signal
            .market_position
            .as_deref()
            .and_then(MarketPosition::parse)
            == Some(MarketPosition::Flat);

        match action.as_exit() {
            Some(close) if is_flat => {
                if self.builder.profile().close_on_exit {
                    debug!(from = %action, to = %close, "Exit signal mapped to close");
                    Ok(close)
                } else {
                    Err(SKIP_EXIT_DISABLED)
                }
            }
            _ => Ok(action),
        }
    }
}
