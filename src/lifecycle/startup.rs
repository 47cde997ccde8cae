//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Bind the listener and serve until shutdown
//! - Flush the tracer on the way out
//!
//! # Design Decisions
//! - Fail fast: a tracer or listener error is fatal and reported to the caller
//! - Listener starts last (traffic only when the tracer exists)
//! - The collector being unreachable is not a startup error; exports fail
//!   in the background and requests are unaffected

use std::net::{AddrParseError, SocketAddr};

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{metrics, Telemetry, TelemetryError};
use crate::operations::SimulatedWorkload;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("could not initialize tracer: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("invalid metrics address `{address}`: {source}")]
    MetricsAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("could not start metrics exporter: {0}")]
    Metrics(#[from] BuildError),

    #[error("could not bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Bring the service up and serve until a shutdown signal arrives.
pub async fn run(config: ServiceConfig) -> Result<(), StartupError> {
    let telemetry = Telemetry::init(&config.tracing)?;

    if config.metrics.enabled {
        let addr: SocketAddr =
            config
                .metrics
                .address
                .parse()
                .map_err(|source| StartupError::MetricsAddress {
                    address: config.metrics.address.clone(),
                    source,
                })?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;
    let local_addr = listener.local_addr().map_err(StartupError::Serve)?;
    tracing::info!(address = %local_addr, port = local_addr.port(), "Starting service");

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_shutdown_signal().await;
        trigger.trigger();
    });

    let server = HttpServer::new(
        &config,
        telemetry.tracer(),
        SimulatedWorkload::shared(config.simulation.clone()),
    );
    let served = server.run(listener, shutdown.subscribe()).await;

    // The batch processor blocks while draining.
    match tokio::task::spawn_blocking(move || telemetry.shutdown()).await {
        Ok(Ok(())) => tracing::info!("Tracer flushed"),
        Ok(Err(e)) => tracing::warn!(error = %e, "Tracer shutdown incomplete"),
        Err(e) => tracing::warn!(error = %e, "Tracer shutdown task failed"),
    }

    served.map_err(StartupError::Serve)
}
