//! Typed errors raised at the boundary layers.
//!
//! The ranking engine itself is infallible; these cover catalog validation and
//! request validation before the engine is invoked.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("ad record {index}: {source}")]
    Malformed {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("ad record {index}: missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("duplicate ad id '{0}' in catalog")]
    DuplicateId(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("No query provided")]
    EmptyQuery,

    #[error("Caller id must not be empty")]
    EmptyCaller,
}
