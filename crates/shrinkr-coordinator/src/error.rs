use shrinkr_core::{CacheError, StorageError};
use thiserror::Error;

/// Result type for coordinator operations.
pub type Result<T> = std::result::Result<T, CoordinatorError>;

/// Failures the coordinator surfaces to its callers.
///
/// Cache failures never appear here on their own; they are logged and
/// tolerated unless the cache is the only tier left.
#[derive(Debug, Clone, Error)]
pub enum CoordinatorError {
    /// The durable tier rejected or did not answer an upsert.
    #[error("durable write failed: {0}")]
    DurableWrite(#[source] StorageError),
    /// The durable tier failed a lookup. Distinct from "not found".
    #[error("resolution failed: {0}")]
    DurableRead(#[source] StorageError),
    /// No durable tier is configured and the cache write failed too.
    #[error("cache-only write failed: {0}")]
    CacheOnlyWrite(#[source] CacheError),
    #[error("no storage tier available")]
    NoTierAvailable,
}

/// Failures while recording a click. Never propagated to a redirect.
#[derive(Debug, Clone, Error)]
pub enum TrackingError {
    #[error("durable tier unavailable")]
    DurableUnavailable,
    #[error("short code not found in durable tier: {0}")]
    UnknownShortCode(String),
    #[error("click storage failed: {0}")]
    Storage(#[from] StorageError),
}
