//! Traced operations invoked by the request handler.
//!
//! # Data Flow
//! ```text
//! handler context (root span)
//!     → auth.rs      check_login                   (awaited)
//!     → notify.rs    dispatch_*_notification       (detached tasks)
//!     → catalog.rs   fetch_product                 (awaited)
//! ```
//!
//! Each operation starts a child span from the context it is handed, runs
//! its [`Workload`] and lets the span guard close the span on every exit
//! path. Failures are recorded on the span before they are returned.

pub mod auth;
pub mod catalog;
pub mod notify;
pub mod workload;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use opentelemetry::Context;
use thiserror::Error;

use crate::observability::metrics;
use crate::observability::{SpanGuard, SpanTracer};

pub use catalog::ProductListing;
pub use workload::{SimulatedWorkload, Workload};

/// Units of work performed while serving one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    HandleRequest,
    CheckLogin,
    EmailNotification,
    SmsNotification,
    FetchProduct,
}

impl Operation {
    /// Name used for child spans and metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::HandleRequest => "handle_request",
            Operation::CheckLogin => "check_login",
            Operation::EmailNotification => "dispatch_email_notification",
            Operation::SmsNotification => "dispatch_sms_notification",
            Operation::FetchProduct => "fetch_product",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("{operation} failed: {reason}")]
    Failed { operation: Operation, reason: String },
}

/// Operation runner shared by the handler and the tasks it detaches.
#[derive(Clone)]
pub struct Operations {
    tracer: SpanTracer,
    workload: Arc<dyn Workload>,
}

impl Operations {
    pub fn new(tracer: SpanTracer, workload: Arc<dyn Workload>) -> Self {
        Self { tracer, workload }
    }

    pub fn tracer(&self) -> &SpanTracer {
        &self.tracer
    }

    /// Run `operation`'s workload under an already started span.
    pub(crate) async fn perform(
        &self,
        span: &SpanGuard,
        operation: Operation,
        cx: &Context,
    ) -> Result<(), OperationError> {
        let start = Instant::now();
        let result = self.workload.perform(operation, cx).await;
        metrics::record_operation(operation.name(), result.is_ok(), start);
        if let Err(e) = &result {
            span.record_error(e);
        }
        result
    }
}
