//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, endpoints and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{SamplerKind, ServiceConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not an IP:port socket address (host names are not resolved)")]
    BindAddress(String),

    #[error("timeouts.request_secs must be greater than 0")]
    ZeroRequestTimeout,

    #[error("tracing.service_name must not be empty")]
    EmptyServiceName,

    #[error("tracing.collector_endpoint `{0}` must be an http:// or https:// URL")]
    CollectorEndpoint(String),

    #[error("tracing.export_timeout_secs must be greater than 0")]
    ZeroExportTimeout,

    #[error("tracing.sampler.param {0} is out of range")]
    SamplerParam(f64),

    #[error("metrics.address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    let tracing = &config.tracing;
    if tracing.service_name.trim().is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }

    let endpoint = tracing.collector_endpoint.as_str();
    let has_host = endpoint
        .strip_prefix("http://")
        .or_else(|| endpoint.strip_prefix("https://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        errors.push(ValidationError::CollectorEndpoint(endpoint.to_string()));
    }

    if tracing.export_timeout_secs == 0 {
        errors.push(ValidationError::ZeroExportTimeout);
    }

    let param = tracing.sampler.param;
    let param_ok = match tracing.sampler.kind {
        SamplerKind::Const => param.is_finite(),
        SamplerKind::Probabilistic => (0.0..=1.0).contains(&param),
    };
    if !param_ok {
        errors.push(ValidationError::SamplerParam(param));
    }

    if config.metrics.enabled && config.metrics.address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(config.metrics.address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
