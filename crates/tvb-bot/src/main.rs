//! TradingView to Bitget signal bridge - Entry Point

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// TradingView to Bitget signal bridge
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via TVB_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tvb_telemetry::init_logging()?;

    info!("Starting tvb-bot v{}", env!("CARGO_PKG_VERSION"));

    let config = tvb_bot::AppConfig::load(args.config.as_deref())?;
    let secrets = tvb_bot::Secrets::from_env();

    let app = tvb_bot::Application::new(config, secrets)?;
    app.log_startup();

    app.run().await?;

    Ok(())
}
