//! Product service entry point.

use std::path::PathBuf;

use clap::Parser;

use product_service::config::resolve_config;
use product_service::lifecycle::startup;
use product_service::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "product-service")]
#[command(about = "Traced product lookup service", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address (e.g. 0.0.0.0:8000).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.bind)?;

    init_logging(&config.logging)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "product-service starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        collector = %config.tracing.collector_endpoint,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if let Err(e) = startup::run(config).await {
        tracing::error!(error = %e, "Service failed, exiting");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
