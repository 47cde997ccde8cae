//! Traced product service library.
//!
//! One route, `GET /get-product`, served with one trace per request and
//! one span per operation.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────────────┐
//!                    │                   PRODUCT SERVICE                      │
//!                    │                                                        │
//!   GET /get-product │  ┌──────────┐   ┌──────────────────────────────────┐   │
//!   ─────────────────┼─▶│   http   │──▶│ handler  (root span, Server)     │   │
//!                    │  │  server  │   │   ├─ check_login        (await)  │   │
//!                    │  └──────────┘   │   ├─ dispatch_email     (detach) │   │
//!                    │                 │   ├─ dispatch_sms       (detach) │   │
//!   Product: map[..] │                 │   └─ fetch_product      (await)  │   │
//!   ◀────────────────┼─────────────────┴──────────────────────────────────┘   │
//!                    │                              │ spans                   │
//!                    │                              ▼                         │
//!                    │  ┌─────────────────────────────────────────────────┐   │
//!                    │  │ observability: tracer → batch → OTLP collector  │───┼──▶ Jaeger
//!                    │  │                logging, metrics                 │   │
//!                    │  └─────────────────────────────────────────────────┘   │
//!                    │  ┌──────────────┐  ┌──────────────────────────────┐    │
//!                    │  │    config    │  │ lifecycle: startup/shutdown  │    │
//!                    │  └──────────────┘  └──────────────────────────────┘    │
//!                    └───────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod operations;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::{SpanTracer, Telemetry};
