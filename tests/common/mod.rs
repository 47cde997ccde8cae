//! Shared utilities for integration testing.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
use opentelemetry_sdk::trace::TracerProvider;
use product_service::config::{ServiceConfig, SimulationConfig};
use product_service::lifecycle::Shutdown;
use product_service::operations::SimulatedWorkload;
use product_service::{HttpServer, Telemetry};
use tokio::net::TcpListener;

/// Short delays that keep the same shape: notifications outlast the response.
#[allow(dead_code)]
pub fn fast_delays() -> SimulationConfig {
    SimulationConfig {
        handle_request_ms: 10,
        check_login_ms: 50,
        email_notification_ms: 400,
        sms_notification_ms: 200,
        fetch_product_ms: 50,
    }
}

/// Telemetry that keeps finished spans in memory.
#[allow(dead_code)]
pub fn recording_telemetry() -> (Telemetry, InMemorySpanExporter) {
    let exporter = InMemorySpanExporter::default();
    let provider = TracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    (Telemetry::from_provider(provider, false), exporter)
}

/// Start the service on an ephemeral port.
pub async fn start_service(
    delays: SimulationConfig,
    telemetry: &Telemetry,
) -> (SocketAddr, Shutdown) {
    let config = ServiceConfig {
        simulation: delays.clone(),
        ..ServiceConfig::default()
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, telemetry.tracer(), SimulatedWorkload::shared(delays));
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Trace id from a `traceparent` response header.
#[allow(dead_code)]
pub fn trace_id(response: &reqwest::Response) -> String {
    let traceparent = response
        .headers()
        .get("traceparent")
        .expect("response carries traceparent")
        .to_str()
        .unwrap();
    traceparent.split('-').nth(1).unwrap().to_string()
}

/// Poll the exporter until at least `count` spans have finished.
#[allow(dead_code)]
pub async fn wait_for_spans(
    exporter: &InMemorySpanExporter,
    count: usize,
    timeout: Duration,
) -> Vec<SpanData> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let spans = exporter.get_finished_spans().unwrap();
        if spans.len() >= count || tokio::time::Instant::now() >= deadline {
            return spans;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

/// Group finished spans by trace id.
#[allow(dead_code)]
pub fn by_trace(spans: &[SpanData]) -> HashMap<String, Vec<&SpanData>> {
    let mut traces: HashMap<String, Vec<&SpanData>> = HashMap::new();
    for span in spans {
        traces
            .entry(span.span_context.trace_id().to_string())
            .or_default()
            .push(span);
    }
    traces
}
