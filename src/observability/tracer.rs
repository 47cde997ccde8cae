//! Distributed tracing support.
//!
//! # Responsibilities
//! - Build the process-wide tracer provider (sampler, resource, exporter)
//! - Create spans parented to whatever span a [`Context`] carries
//! - Close every span exactly once, on every exit path
//!
//! # Design Decisions
//! - The provider is owned by [`Telemetry`] and injected into handlers as a
//!   [`SpanTracer`], never looked up through the OpenTelemetry global
//! - Reporting goes through a batch processor on the Tokio runtime, so
//!   ending a span never waits on the collector
//! - [`SpanGuard`] ends its span on drop; explicit [`SpanGuard::finish`] is
//!   optional

use std::time::{Duration, Instant};

use opentelemetry::trace::{
    SpanContext, SpanKind, Status, TraceContextExt, Tracer as _, TracerProvider as _,
};
use opentelemetry::{Context, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{self as sdktrace, Sampler, TracerProvider};
use opentelemetry_sdk::{runtime, Resource};
use thiserror::Error;

use crate::config::{SamplerConfig, SamplerKind, TracingConfig};

const INSTRUMENTATION_SCOPE: &str = env!("CARGO_PKG_NAME");

/// Errors raised while setting up or tearing down the tracer.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("could not build span exporter for {endpoint}: {reason}")]
    Exporter { endpoint: String, reason: String },

    #[error("tracer shutdown failed: {0}")]
    Shutdown(String),
}

/// Owner of the process-wide tracer provider.
pub struct Telemetry {
    provider: TracerProvider,
    tracer: SpanTracer,
}

#[allow(deprecated)]
impl Telemetry {
    /// Initialize tracing from configuration.
    ///
    /// Must be called from within a Tokio runtime: the exporter and the
    /// batch processor both spawn onto it.
    pub fn init(config: &TracingConfig) -> Result<Self, TelemetryError> {
        if !config.enabled {
            tracing::info!("Span export disabled, tracer is a no-op");
            return Ok(Self::disabled(config.log_spans));
        }

        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(config.collector_endpoint.clone())
            .with_timeout(Duration::from_secs(config.export_timeout_secs))
            .build()
            .map_err(|e| TelemetryError::Exporter {
                endpoint: config.collector_endpoint.clone(),
                reason: e.to_string(),
            })?;

        let provider = TracerProvider::builder()
            .with_config(provider_config(config))
            .with_batch_exporter(exporter, runtime::Tokio)
            .build();

        tracing::info!(
            service_name = %config.service_name,
            collector = %config.collector_endpoint,
            sampler = ?config.sampler.kind,
            sampler_param = config.sampler.param,
            "Tracer initialized"
        );

        Ok(Self::from_provider(provider, config.log_spans))
    }

    /// A tracer that records nothing. Spans are still created and closed.
    pub fn disabled(log_spans: bool) -> Self {
        let provider = TracerProvider::builder()
            .with_config(sdktrace::Config::default().with_sampler(Sampler::AlwaysOff))
            .build();
        Self::from_provider(provider, log_spans)
    }

    /// Wrap an already built provider.
    pub fn from_provider(provider: TracerProvider, log_spans: bool) -> Self {
        let tracer = SpanTracer::new(provider.tracer(INSTRUMENTATION_SCOPE), log_spans);
        Self { provider, tracer }
    }

    /// Handle used to start spans.
    pub fn tracer(&self) -> SpanTracer {
        self.tracer.clone()
    }

    /// Flush pending spans and release exporter resources.
    ///
    /// Blocks until the batch processor drains; call from a blocking thread.
    pub fn shutdown(self) -> Result<(), TelemetryError> {
        self.provider
            .shutdown()
            .map_err(|e| TelemetryError::Shutdown(e.to_string()))
    }
}

#[allow(deprecated)]
fn provider_config(config: &TracingConfig) -> sdktrace::Config {
    sdktrace::Config::default()
        .with_sampler(sampler(&config.sampler))
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            config.service_name.clone(),
        )]))
}

/// Map the Jaeger-style sampler settings onto an SDK sampler.
///
/// The root decision is wrapped parent-based so an upstream sampling flag
/// is honoured.
pub fn sampler(config: &SamplerConfig) -> Sampler {
    let root = match config.kind {
        SamplerKind::Const if config.param != 0.0 => Sampler::AlwaysOn,
        SamplerKind::Const => Sampler::AlwaysOff,
        SamplerKind::Probabilistic => Sampler::TraceIdRatioBased(config.param),
    };
    Sampler::ParentBased(Box::new(root))
}

/// Cloneable handle for starting spans.
#[derive(Clone)]
pub struct SpanTracer {
    tracer: sdktrace::Tracer,
    log_spans: bool,
}

impl SpanTracer {
    pub fn new(tracer: sdktrace::Tracer, log_spans: bool) -> Self {
        Self { tracer, log_spans }
    }

    /// Start an internal span as a child of whatever span `parent` carries.
    ///
    /// Returns the guard owning the span and a new context carrying it;
    /// `parent` is left untouched.
    pub fn start(&self, parent: &Context, name: &'static str) -> (SpanGuard, Context) {
        self.start_with_kind(parent, name, SpanKind::Internal)
    }

    pub fn start_with_kind(
        &self,
        parent: &Context,
        name: &'static str,
        kind: SpanKind,
    ) -> (SpanGuard, Context) {
        let span = self
            .tracer
            .span_builder(name)
            .with_kind(kind)
            .start_with_context(&self.tracer, parent);
        let cx = parent.with_span(span);

        if self.log_spans {
            let span_ref = cx.span();
            let sc = span_ref.span_context();
            tracing::info!(
                span = name,
                trace_id = %sc.trace_id(),
                span_id = %sc.span_id(),
                sampled = sc.is_sampled(),
                "Span started"
            );
        }

        let guard = SpanGuard {
            cx: cx.clone(),
            name,
            log_spans: self.log_spans,
            started: Instant::now(),
            finished: false,
        };
        (guard, cx)
    }
}

/// Owns one span's lifecycle; the span ends when the guard is finished or dropped.
#[must_use = "dropping the guard ends the span immediately"]
pub struct SpanGuard {
    cx: Context,
    name: &'static str,
    log_spans: bool,
    started: Instant,
    finished: bool,
}

impl SpanGuard {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn span_context(&self) -> SpanContext {
        self.cx.span().span_context().clone()
    }

    pub fn set_attribute(&self, attribute: KeyValue) {
        self.cx.span().set_attribute(attribute);
    }

    /// Mark the span as failed.
    pub fn record_error(&self, err: &dyn std::error::Error) {
        let span = self.cx.span();
        span.record_error(err);
        span.set_status(Status::error(err.to_string()));
    }

    /// End the span now instead of at drop.
    pub fn finish(mut self) {
        self.end();
    }

    fn end(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.cx.span().end();

        if self.log_spans {
            let span_ref = self.cx.span();
            let sc = span_ref.span_context();
            tracing::info!(
                span = self.name,
                trace_id = %sc.trace_id(),
                span_id = %sc.span_id(),
                elapsed_ms = self.started.elapsed().as_millis() as u64,
                "Span finished"
            );
        }
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        self.end();
    }
}
