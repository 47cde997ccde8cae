//! Product lookup.

use std::collections::BTreeMap;
use std::fmt;

use opentelemetry::{Context, KeyValue};

use crate::operations::{Operation, OperationError, Operations};

const CATALOG: [(&str, &str); 2] = [("P001", "Sabun"), ("P002", "Handuk")];

/// Product code → product name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListing(BTreeMap<&'static str, &'static str>);

impl ProductListing {
    /// The static catalog.
    pub fn catalog() -> Self {
        Self(CATALOG.into_iter().collect())
    }

    pub fn get(&self, code: &str) -> Option<&'static str> {
        self.0.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Renders as `map[P001:Sabun P002:Handuk]`, keys sorted.
impl fmt::Display for ProductListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("map[")?;
        for (i, (code, name)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{code}:{name}")?;
        }
        f.write_str("]")
    }
}

impl Operations {
    /// Look up the product catalog.
    pub async fn fetch_product(&self, cx: &Context) -> Result<ProductListing, OperationError> {
        let operation = Operation::FetchProduct;
        let (span, cx) = self.tracer().start(cx, operation.name());

        self.perform(&span, operation, &cx).await?;

        let listing = ProductListing::catalog();
        span.set_attribute(KeyValue::new("product.count", listing.len() as i64));
        Ok(listing)
    }
}
