//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or defaults, plus CLI overrides
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → consumed once at startup by lifecycle::startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload (tracer setup is process-wide)
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config, ConfigError};
pub use schema::{
    ListenerConfig, LogFormat, LoggingConfig, MetricsConfig, SamplerConfig, SamplerKind,
    ServiceConfig, SimulationConfig, TimeoutConfig, TracingConfig,
};
