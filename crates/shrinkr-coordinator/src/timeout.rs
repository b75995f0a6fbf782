use shrinkr_core::{CacheError, StorageError};
use std::future::Future;
use std::time::Duration;

/// Runs a cache call, abandoning it once `limit` elapses.
pub(crate) async fn cache_call<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, CacheError>>,
) -> Result<T, CacheError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(CacheError::Timeout(format!(
            "cache call abandoned after {}ms",
            limit.as_millis()
        ))),
    }
}

/// Runs a durable call, abandoning it once `limit` elapses.
pub(crate) async fn store_call<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, StorageError>>,
) -> Result<T, StorageError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::Timeout(format!(
            "durable call abandoned after {}ms",
            limit.as_millis()
        ))),
    }
}
