//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Build the decorated service chain
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::ServiceConfig;
use crate::customer::middleware::{chain, instrumenting_middleware, logging_middleware};
use crate::customer::{InmemService, Service};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::listener::{self, ListenerError};
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("invalid metrics address {address}: {source}")]
    MetricsAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// The in-memory service wrapped in instrumentation and logging.
pub fn build_service() -> Arc<dyn Service> {
    chain(
        InmemService::shared(),
        vec![instrumenting_middleware(), logging_middleware()],
    )
}

/// Start everything and serve until `shutdown` fires.
pub async fn run(config: ServiceConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let address = &config.observability.metrics_address;
        let addr: SocketAddr = address.parse().map_err(|source| StartupError::MetricsAddress {
            address: address.clone(),
            source,
        })?;
        metrics::init_metrics(addr)?;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = listener::bind(&config.listener).await?;
    serve(&config, listener, shutdown.subscribe()).await
}

/// Serve the customer service on an already bound listener.
pub async fn serve(
    config: &ServiceConfig,
    listener: TcpListener,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), StartupError> {
    let server = HttpServer::new(config, build_service());
    server.run(listener, shutdown).await?;
    Ok(())
}
