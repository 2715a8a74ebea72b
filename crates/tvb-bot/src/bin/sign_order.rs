//! Build and sign a Bitget order offline.
//!
//! Prints the exact method, URL, headers and body the bridge would send, so
//! an "invalid signature" reply can be compared against a known-good request.
//! Nothing is sent.

use anyhow::{anyhow, Result};
use clap::Parser;
use tvb_bot::{AppConfig, Secrets};
use tvb_core::{normalize_symbol, Scalar, SignalAction};
use tvb_executor::{DispatchRequest, OrderBuilder, RequestSigner};

/// Sign an order with the configured credentials and print it
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via TVB_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Signal action (buy, sell, open_long, open_short, close_long, close_short)
    #[arg(short, long, default_value = "buy")]
    action: String,

    /// Instrument as TradingView sends it (e.g. BITGET:BTCUSDT.P)
    #[arg(short, long)]
    symbol: Option<String>,

    /// Order size; the configured default when omitted
    #[arg(long)]
    amount: Option<String>,

    /// Request timestamp in epoch milliseconds; now when omitted
    #[arg(long)]
    timestamp_ms: Option<i64>,
}

fn mask(value: &str) -> String {
    let keep = value.chars().count().min(8) / 2;
    let visible: String = value.chars().take(keep).collect();
    format!("{visible}****")
}

fn main() -> Result<()> {
    let args = Args::parse();
    tvb_telemetry::init_logging()?;

    let config = AppConfig::load(args.config.as_deref())?;
    let secrets = Secrets::from_env();
    let keys = secrets
        .exchange
        .keys()
        .map_err(|missing| anyhow!("exchange credentials missing: {}", missing.join(", ")))?;

    let timestamp_ms = args
        .timestamp_ms
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
    let action = SignalAction::parse(&args.action)?;
    let symbol = normalize_symbol(
        args.symbol.as_deref().unwrap_or_default(),
        &config.order.default_symbol,
    );
    let amount = args.amount.map(Scalar::Text);

    let order = OrderBuilder::new(config.order.clone()).build(
        symbol,
        action.mapping(),
        amount.as_ref(),
        timestamp_ms,
    )?;

    let signer = RequestSigner::new(keys.api_secret.clone(), config.exchange.signature_encoding);
    let signed = signer.sign_order(&config.exchange.order_path, &order, timestamp_ms)?;
    let prehash = format!(
        "{}{}{}{}",
        signed.timestamp_ms, signed.method, signed.path, signed.body
    );

    let request = DispatchRequest::new(
        signed,
        config.exchange.order_url(),
        &keys,
        &config.exchange.locale,
    );

    println!("{} {}", request.method, request.url);
    for (name, value) in request.header_pairs() {
        let shown = match name {
            "ACCESS-KEY" | "ACCESS-PASSPHRASE" => mask(value),
            _ => value.to_string(),
        };
        println!("{name}: {shown}");
    }
    println!();
    println!("{}", request.body);
    println!();
    println!("prehash: {prehash}");

    Ok(())
}
