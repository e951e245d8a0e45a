//! Trailing stop-loss alert bot - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Trailing stop-loss brokerage alert bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via TRAILSTOP_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    trailstop_telemetry::init_logging().map_err(trailstop_bot::AppError::Telemetry)?;

    info!("Starting trailstop bot v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > TRAILSTOP_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("TRAILSTOP_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = trailstop_bot::AppConfig::from_file(&config_path)?;
    let secrets = trailstop_bot::Secrets::from_env()?;

    let app = trailstop_bot::Application::new(config, secrets).await?;
    app.run().await?;

    Ok(())
}
