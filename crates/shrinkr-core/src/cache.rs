use crate::error::CacheError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::time::Duration;

/// Default lifetime of a cache entry.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// The expiring cache tier.
///
/// The cache maps a [`ShortCode`] to the original URL and is never
/// authoritative. Entries vanish once their TTL elapses, which callers
/// observe as an ordinary miss.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get the original URL from cache.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>, CacheError>;

    /// Store the original URL under `code`, expiring after `ttl`.
    async fn set_url(
        &self,
        code: &ShortCode,
        original_url: &str,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Remove an entry from cache.
    ///
    /// It is not an error if the key does not exist.
    async fn del(&self, code: &ShortCode) -> Result<(), CacheError>;

    /// Releases any connections held by the cache.
    async fn close(&self) {}
}
