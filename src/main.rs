//! Customer service: CRUD over customers and their addresses, served as
//! JSON over HTTP.

use clap::Parser;
use std::path::PathBuf;

use customer_service::config::{load_config, ServiceConfig};
use customer_service::lifecycle::{signals, startup, Shutdown};
use customer_service::observability::logging;

#[derive(Parser)]
#[command(name = "customer-service")]
#[command(about = "Customer and address CRUD service", long_about = None)]
struct Cli {
    /// HTTP listen address; `:port` means all interfaces. Defaults to `:8080`.
    #[arg(long)]
    http_addr: Option<String>,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(addr) = cli.http_addr {
        config.listener.bind_address = addr;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!("customer-service v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        trigger.trigger();
    });

    if let Err(e) = startup::run(config, shutdown).await {
        tracing::error!(error = %e, "Fatal error");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
