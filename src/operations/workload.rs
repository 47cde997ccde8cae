//! The work each operation performs inside its span.

use std::sync::Arc;

use async_trait::async_trait;
use opentelemetry::Context;

use crate::config::SimulationConfig;
use crate::operations::{Operation, OperationError};

/// Performs the body of an operation.
///
/// `cx` carries the operation's own span, so implementations doing real I/O
/// can open nested spans or propagate it downstream.
#[async_trait]
pub trait Workload: Send + Sync {
    async fn perform(&self, operation: Operation, cx: &Context) -> Result<(), OperationError>;
}

/// Stands in for real I/O with a fixed delay per operation.
///
/// The delay suspends only the calling task.
#[derive(Debug, Clone, Default)]
pub struct SimulatedWorkload {
    delays: SimulationConfig,
}

impl SimulatedWorkload {
    pub fn new(delays: SimulationConfig) -> Self {
        Self { delays }
    }

    pub fn shared(delays: SimulationConfig) -> Arc<dyn Workload> {
        Arc::new(Self::new(delays))
    }
}

#[async_trait]
impl Workload for SimulatedWorkload {
    async fn perform(&self, operation: Operation, _cx: &Context) -> Result<(), OperationError> {
        tokio::time::sleep(self.delays.delay(operation)).await;
        Ok(())
    }
}
