//! Login check.

use opentelemetry::{Context, KeyValue};

use crate::operations::{Operation, OperationError, Operations};

impl Operations {
    /// Check whether the caller is logged in.
    ///
    /// No credentials are inspected: a completed workload means
    /// authenticated. Callers must treat `Ok(false)` and `Err` alike and
    /// deny the request.
    pub async fn check_login(&self, cx: &Context) -> Result<bool, OperationError> {
        let operation = Operation::CheckLogin;
        let (span, cx) = self.tracer().start(cx, operation.name());

        self.perform(&span, operation, &cx).await?;

        span.set_attribute(KeyValue::new("auth.authenticated", true));
        Ok(true)
    }
}
