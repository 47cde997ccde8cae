//! Response rendering and error mapping.
//!
//! # Design Decisions
//! - Failed login (or a failing login check) is 401: deny by default
//! - Product lookup failure is 503; notification failures never get here
//! - Error bodies are plain text, like the success body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::operations::{OperationError, ProductListing};

/// Request-level failures, each mapped to a status code.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("user is not logged in")]
    Unauthenticated(#[source] Option<OperationError>),

    #[error("product lookup failed")]
    ProductUnavailable(#[source] OperationError),

    #[error("request handling failed")]
    Internal(#[source] OperationError),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            HandlerError::ProductUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let cause = std::error::Error::source(&self).map(ToString::to_string);
        tracing::warn!(error = %self, cause = ?cause, "Request failed");
        (self.status(), self.to_string()).into_response()
    }
}

/// Body written for a successful lookup: `Product: map[P001:Sabun P002:Handuk]`.
pub fn product_body(listing: &ProductListing) -> String {
    format!("Product: {listing}")
}
