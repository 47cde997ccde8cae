//! Metrics collection and exposition.
//!
//! # Metrics
//! - `service_requests_total` (counter): requests by route, status
//! - `service_request_duration_seconds` (histogram): request latency by route
//! - `service_operation_duration_seconds` (histogram): per-operation latency by outcome
//! - `service_detached_task_failures_total` (counter): failures nobody awaited
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exposition is opt-in via config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed HTTP request.
pub fn record_request(route: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "service_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("service_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record one operation run.
pub fn record_operation(operation: &'static str, success: bool, start: Instant) {
    let outcome = if success { "ok" } else { "error" };
    metrics::histogram!(
        "service_operation_duration_seconds",
        "operation" => operation,
        "outcome" => outcome
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a failure inside a task whose result nobody awaits.
pub fn record_detached_failure(operation: &'static str) {
    metrics::counter!("service_detached_task_failures_total", "operation" => operation)
        .increment(1);
}
