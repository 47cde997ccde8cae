//! Notification dispatch.
//!
//! Notifications run as detached tasks: the launcher never sees their
//! completion, result or error. Failures are logged and counted here and go
//! no further. Delivery guarantees would need a durable queue instead of a
//! bare spawn.

use opentelemetry::Context;

use crate::observability::metrics;
use crate::operations::{Operation, OperationError, Operations};

impl Operations {
    pub async fn dispatch_email_notification(&self, cx: &Context) -> Result<(), OperationError> {
        self.dispatch(Operation::EmailNotification, cx).await
    }

    pub async fn dispatch_sms_notification(&self, cx: &Context) -> Result<(), OperationError> {
        self.dispatch(Operation::SmsNotification, cx).await
    }

    async fn dispatch(&self, operation: Operation, cx: &Context) -> Result<(), OperationError> {
        let (span, cx) = self.tracer().start(cx, operation.name());
        self.perform(&span, operation, &cx).await
    }

    /// Launch both notifications without waiting for either.
    ///
    /// Tasks still pending at process exit are abandoned.
    pub fn spawn_notifications(&self, cx: &Context) {
        let email = self.clone();
        let email_cx = cx.clone();
        tokio::spawn(async move {
            let result = email.dispatch_email_notification(&email_cx).await;
            report_detached(Operation::EmailNotification, result);
        });

        let sms = self.clone();
        let sms_cx = cx.clone();
        tokio::spawn(async move {
            let result = sms.dispatch_sms_notification(&sms_cx).await;
            report_detached(Operation::SmsNotification, result);
        });
    }
}

fn report_detached(operation: Operation, result: Result<(), OperationError>) {
    match result {
        Ok(()) => tracing::debug!(operation = %operation, "Notification dispatched"),
        Err(e) => {
            tracing::warn!(operation = %operation, error = %e, "Notification dispatch failed");
            metrics::record_detached_failure(operation.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use opentelemetry::trace::{Status, TraceContextExt};
    use tokio::time::Instant;

    use crate::operations::testing::{recording_telemetry, FailingWorkload};
    use crate::operations::SimulatedWorkload;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_spawn_returns_immediately() {
        let (telemetry, exporter) = recording_telemetry();
        let ops = Operations::new(telemetry.tracer(), Arc::new(SimulatedWorkload::default()));
        let (root, cx) = telemetry.tracer().start(&Context::new(), "root");

        let start = Instant::now();
        ops.spawn_notifications(&cx);
        assert_eq!(start.elapsed(), Duration::ZERO);
        root.finish();

        tokio::time::sleep(Duration::from_secs(3)).await;

        let spans = exporter.get_finished_spans().unwrap();
        let root_id = cx.span().span_context().span_id();
        for name in ["dispatch_email_notification", "dispatch_sms_notification"] {
            let span = spans.iter().find(|s| s.name == name).unwrap();
            assert_eq!(span.parent_span_id, root_id);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_notification_is_absorbed() {
        let (telemetry, exporter) = recording_telemetry();
        let ops = Operations::new(
            telemetry.tracer(),
            Arc::new(FailingWorkload::new(&[Operation::EmailNotification])),
        );

        ops.spawn_notifications(&Context::new());
        tokio::time::sleep(Duration::from_secs(3)).await;

        let spans = exporter.get_finished_spans().unwrap();
        assert_eq!(spans.len(), 2);
        let email = spans
            .iter()
            .find(|s| s.name == "dispatch_email_notification")
            .unwrap();
        assert!(matches!(email.status, Status::Error { .. }));
        let sms = spans
            .iter()
            .find(|s| s.name == "dispatch_sms_notification")
            .unwrap();
        assert_eq!(sms.status, Status::Unset);
    }
}
