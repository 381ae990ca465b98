//! Error types for dayview-core.
//!
//! Each concern gets its own error type via thiserror; the API surfaces are
//! narrow enough that no umbrella error is needed.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// An interval whose start lies after its end.
///
/// The strict overlap test is not guarded against negative-duration ranges,
/// so construction rejects them up front instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid interval: end ({end}) must not precede start ({start})")]
pub struct InvalidIntervalError {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Errors surfaced by the external time-indexed store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Resolving cached intervals into full records failed.
    #[error("Failed to resolve associated records: {0}")]
    ResolveFailed(String),

    /// The store rejected the queried span.
    #[error("Invalid query span: {0}")]
    InvalidSpan(#[from] InvalidIntervalError),

    /// Any other backend failure.
    #[error("Store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}
