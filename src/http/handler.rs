//! `GET /get-product` handler.
//!
//! One trace per request: the root span is started here (continuing an
//! upstream trace when `traceparent` is present) and every operation span
//! is its child.

use std::time::Instant;

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use opentelemetry::trace::SpanKind;
use opentelemetry::{Context, KeyValue};

use crate::http::request::X_REQUEST_ID;
use crate::http::response::{product_body, HandlerError};
use crate::http::server::AppState;
use crate::observability::{metrics, propagation, SpanGuard};
use crate::operations::{Operation, Operations, ProductListing};

pub const ROUTE: &str = "/get-product";
pub const ROOT_SPAN_NAME: &str = "GET /get-product";

pub async fn get_product(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let start = Instant::now();
    let ops = &state.operations;

    let parent = propagation::extract(&headers);
    let (root, cx) = ops
        .tracer()
        .start_with_kind(&parent, ROOT_SPAN_NAME, SpanKind::Server);
    root.set_attribute(KeyValue::new("http.request.method", "GET"));
    root.set_attribute(KeyValue::new("http.route", ROUTE));
    if let Some(request_id) = headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok()) {
        root.set_attribute(KeyValue::new("request.id", request_id.to_string()));
    }

    let mut response = match serve(ops, &root, &cx).await {
        Ok(listing) => product_body(&listing).into_response(),
        Err(e) => {
            // Operation spans already carry their own failure.
            if !matches!(e, HandlerError::Internal(_)) {
                root.record_error(&e);
            }
            e.into_response()
        }
    };

    let status = response.status().as_u16();
    root.set_attribute(KeyValue::new("http.response.status_code", i64::from(status)));
    propagation::inject(&cx, response.headers_mut());
    metrics::record_request(ROUTE, status, start);

    root.finish();
    response
}

async fn serve(
    ops: &Operations,
    root: &SpanGuard,
    cx: &Context,
) -> Result<ProductListing, HandlerError> {
    ops.perform(root, Operation::HandleRequest, cx)
        .await
        .map_err(HandlerError::Internal)?;

    match ops.check_login(cx).await {
        Ok(true) => tracing::info!("User logged in"),
        Ok(false) => return Err(HandlerError::Unauthenticated(None)),
        Err(e) => return Err(HandlerError::Unauthenticated(Some(e))),
    }

    ops.spawn_notifications(cx);

    let product = ops
        .fetch_product(cx)
        .await
        .map_err(HandlerError::ProductUnavailable)?;
    tracing::info!(product = %product, "Product fetched");

    Ok(product)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::to_bytes;
    use axum::http::{HeaderValue, StatusCode};
    use opentelemetry::trace::{SpanId, Status, TraceContextExt};
    use opentelemetry_sdk::export::trace::SpanData;
    use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
    use tokio::time::Instant;

    use crate::config::SimulationConfig;
    use crate::observability::Telemetry;
    use crate::operations::testing::{recording_telemetry, FailingWorkload};
    use crate::operations::{SimulatedWorkload, Workload};

    use super::*;

    fn state(ops: Operations) -> State<AppState> {
        State(AppState { operations: ops })
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn find<'a>(spans: &'a [SpanData], name: &str) -> &'a SpanData {
        spans
            .iter()
            .find(|s| s.name == name)
            .unwrap_or_else(|| panic!("no span named {name}"))
    }

    fn ops_with(workload: Arc<dyn Workload>) -> (Operations, InMemorySpanExporter, Telemetry) {
        let (telemetry, exporter) = recording_telemetry();
        (Operations::new(telemetry.tracer(), workload), exporter, telemetry)
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_trace_with_five_spans() {
        let (ops, exporter, _telemetry) = ops_with(Arc::new(SimulatedWorkload::default()));

        let response = get_product(state(ops), HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("traceparent"));
        assert_eq!(body_text(response).await, "Product: map[P001:Sabun P002:Handuk]");

        // Let the detached notifications finish.
        tokio::time::sleep(Duration::from_secs(3)).await;

        let spans = exporter.get_finished_spans().unwrap();
        assert_eq!(spans.len(), 5);

        let root = find(&spans, ROOT_SPAN_NAME);
        assert_eq!(root.parent_span_id, SpanId::INVALID);
        let trace_id = root.span_context.trace_id();
        for name in [
            "check_login",
            "dispatch_email_notification",
            "dispatch_sms_notification",
            "fetch_product",
        ] {
            let child = find(&spans, name);
            assert_eq!(child.span_context.trace_id(), trace_id);
            assert_eq!(child.parent_span_id, root.span_context.span_id());
        }

        let unique: HashSet<_> = spans.iter().map(|s| s.span_context.span_id()).collect();
        assert_eq!(unique.len(), 5, "every span exported exactly once");
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_excludes_notifications() {
        let delays = SimulationConfig {
            handle_request_ms: 0,
            check_login_ms: 450,
            email_notification_ms: 20_000,
            sms_notification_ms: 10_000,
            fetch_product_ms: 750,
        };
        let (ops, _exporter, _telemetry) = ops_with(SimulatedWorkload::shared(delays));

        let start = Instant::now();
        let response = get_product(state(ops), HeaderMap::new()).await;
        let elapsed = start.elapsed();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(elapsed >= Duration::from_millis(1200), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(1300), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_root_span_ends_before_notifications() {
        let (ops, exporter, _telemetry) = ops_with(Arc::new(SimulatedWorkload::default()));

        let _ = get_product(state(ops), HeaderMap::new()).await;

        // The response is out; notifications are still in flight.
        let spans = exporter.get_finished_spans().unwrap();
        let names: HashSet<_> = spans.iter().map(|s| s.name.to_string()).collect();
        assert!(names.contains(ROOT_SPAN_NAME));
        assert!(names.contains("fetch_product"));
        assert!(!names.contains("dispatch_email_notification"));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(exporter.get_finished_spans().unwrap().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_failure_is_denied() {
        let (ops, exporter, _telemetry) =
            ops_with(Arc::new(FailingWorkload::new(&[Operation::CheckLogin])));

        let response = get_product(state(ops), HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        tokio::time::sleep(Duration::from_secs(3)).await;
        let spans = exporter.get_finished_spans().unwrap();
        // No notifications and no lookup after a denied login.
        assert_eq!(spans.len(), 2);
        assert!(matches!(find(&spans, "check_login").status, Status::Error { .. }));
        assert!(matches!(find(&spans, ROOT_SPAN_NAME).status, Status::Error { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_product_failure_degrades_response() {
        let (ops, exporter, _telemetry) =
            ops_with(Arc::new(FailingWorkload::new(&[Operation::FetchProduct])));

        let response = get_product(state(ops), HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(exporter.get_finished_spans().unwrap().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_failure_is_invisible_to_client() {
        let (ops, exporter, _telemetry) = ops_with(Arc::new(FailingWorkload::new(&[
            Operation::EmailNotification,
            Operation::SmsNotification,
        ])));

        let response = get_product(state(ops), HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::OK);

        tokio::time::sleep(Duration::from_secs(3)).await;
        let spans = exporter.get_finished_spans().unwrap();
        assert_eq!(spans.len(), 5);
        assert_eq!(find(&spans, ROOT_SPAN_NAME).status, Status::Unset);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inbound_traceparent_is_continued() {
        let (ops, exporter, _telemetry) = ops_with(Arc::new(SimulatedWorkload::default()));
        let mut headers = HeaderMap::new();
        headers.insert(
            "traceparent",
            HeaderValue::from_static("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"),
        );
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("req-42"));
        let upstream = propagation::extract(&headers);

        let response = get_product(state(ops), headers).await;
        let traceparent = response.headers()["traceparent"].to_str().unwrap().to_string();
        assert!(traceparent.starts_with("00-4bf92f3577b34da6a3ce929d0e0e4736-"));

        let spans = exporter.get_finished_spans().unwrap();
        let root = find(&spans, ROOT_SPAN_NAME);
        assert_eq!(
            root.span_context.trace_id(),
            upstream.span().span_context().trace_id()
        );
        assert_eq!(root.parent_span_id, upstream.span().span_context().span_id());
        assert!(root
            .attributes
            .iter()
            .any(|kv| kv.key.as_str() == "request.id" && kv.value.as_str() == "req-42"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sampled_out_requests_still_succeed() {
        let telemetry = Telemetry::disabled(false);
        let ops = Operations::new(telemetry.tracer(), Arc::new(SimulatedWorkload::default()));

        let response = get_product(state(ops), HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Product: map[P001:Sabun P002:Handuk]");
    }
}
