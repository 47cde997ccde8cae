//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the single product route
//! - Wire up middleware (request ID, access log, timeout)
//! - Inject the tracer and workload into handlers
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::http::handler::{self, ROUTE};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::observability::SpanTracer;
use crate::operations::{Operations, Workload};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub operations: Operations,
}

/// HTTP server for the product service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server.
    ///
    /// The tracer is passed in rather than read from a global so tests can
    /// hand over a recording or no-op one.
    pub fn new(config: &ServiceConfig, tracer: SpanTracer, workload: Arc<dyn Workload>) -> Self {
        let state = AppState {
            operations: Operations::new(tracer, workload),
        };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route(ROUTE, get(handler::get_product))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    )))
                    .layer(propagate_request_id_layer()),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
