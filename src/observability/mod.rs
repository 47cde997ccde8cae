//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → tracer.rs (one span per operation, one trace per request)
//!
//! Consumers:
//!     → Log output (stdout, text or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//!     → Trace collector (OTLP/gRPC, e.g. Jaeger)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Trace context flows between operations as an immutable `Context` value
//! - Collector failures never reach request handling

pub mod logging;
pub mod metrics;
pub mod propagation;
pub mod tracer;

pub use tracer::{SpanGuard, SpanTracer, Telemetry, TelemetryError};
