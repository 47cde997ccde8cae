//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::operations::Operation;

/// Root configuration for the product service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Distributed tracing settings.
    pub tracing: TracingConfig,

    /// Local log output settings.
    pub logging: LoggingConfig,

    /// Prometheus metrics settings.
    pub metrics: MetricsConfig,

    /// Simulated work durations for each operation.
    pub simulation: SimulationConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Tracer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Export spans to the collector. When false every span is a no-op.
    pub enabled: bool,

    /// Reported as the `service.name` resource attribute.
    pub service_name: String,

    /// OTLP/gRPC collector endpoint (e.g., "http://127.0.0.1:4317").
    pub collector_endpoint: String,

    /// Per-export timeout in seconds.
    pub export_timeout_secs: u64,

    /// Also write span start/finish to the local log.
    pub log_spans: bool,

    /// Sampling policy.
    pub sampler: SamplerConfig,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "main-service".to_string(),
            collector_endpoint: "http://127.0.0.1:4317".to_string(),
            export_timeout_secs: 5,
            log_spans: true,
            sampler: SamplerConfig::default(),
        }
    }
}

/// Sampler type, following the Jaeger client naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerKind {
    /// Non-zero param samples everything, zero samples nothing.
    Const,
    /// Param is the fraction of traces sampled, in [0, 1].
    Probabilistic,
}

/// Sampling policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub kind: SamplerKind,
    pub param: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            kind: SamplerKind::Const,
            param: 10.0,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Local logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable the Prometheus scrape endpoint.
    pub enabled: bool,

    /// Metrics endpoint bind address.
    pub address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Simulated work durations in milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub handle_request_ms: u64,
    pub check_login_ms: u64,
    pub email_notification_ms: u64,
    pub sms_notification_ms: u64,
    pub fetch_product_ms: u64,
}

impl SimulationConfig {
    /// Configured delay for one operation.
    pub fn delay(&self, operation: Operation) -> Duration {
        let ms = match operation {
            Operation::HandleRequest => self.handle_request_ms,
            Operation::CheckLogin => self.check_login_ms,
            Operation::EmailNotification => self.email_notification_ms,
            Operation::SmsNotification => self.sms_notification_ms,
            Operation::FetchProduct => self.fetch_product_ms,
        };
        Duration::from_millis(ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            handle_request_ms: 250,
            check_login_ms: 450,
            email_notification_ms: 2000,
            sms_notification_ms: 1000,
            fetch_product_ms: 750,
        }
    }
}
