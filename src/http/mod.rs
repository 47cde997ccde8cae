//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (one task per connection)
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → handler.rs (root span, operations, product body)
//!     → response.rs (body rendering, error → status)
//!     → Send to client
//! ```

pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use handler::{ROOT_SPAN_NAME, ROUTE};
pub use request::X_REQUEST_ID;
pub use response::HandlerError;
pub use server::{AppState, HttpServer};
