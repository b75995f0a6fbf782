use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use shrinkr_core::{ShortCode, UrlCache};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::Result;

const DEFAULT_MAX_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
struct CachedUrl {
    original_url: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, CachedUrl> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedUrl,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    // Overwriting an entry restarts its clock with the new TTL.
    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedUrl,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// An in-memory cache implementation using Moka.
///
/// Useful for single-node deployments without Redis and as the cache tier
/// in tests. Each entry honours the TTL passed to [`UrlCache::set_url`].
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<String, CachedUrl>,
}

impl MokaUrlCache {
    /// Creates a new Moka URL cache holding at most 10,000 entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY)
    }

    /// Creates a new Moka URL cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }

    /// Number of live entries, after pending maintenance has run.
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        trace!(code = %code, "Fetching URL from Moka cache");

        match self.cache.get(code.as_str()).await {
            Some(entry) => {
                debug!(code = %code, "Cache hit in Moka");
                Ok(Some(entry.original_url))
            }
            None => {
                trace!(code = %code, "Cache miss in Moka");
                Ok(None)
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, original_url: &str, ttl: Duration) -> Result<()> {
        trace!(code = %code, "Storing URL in Moka cache");

        let entry = CachedUrl {
            original_url: original_url.to_string(),
            ttl,
        };
        self.cache.insert(code.as_str().to_string(), entry).await;
        debug!(code = %code, "Cached URL in Moka");
        Ok(())
    }

    async fn del(&self, code: &ShortCode) -> Result<()> {
        trace!(code = %code, "Removing URL from Moka cache");

        self.cache.invalidate(code.as_str()).await;
        debug!(code = %code, "Removed URL from Moka cache (if present)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shrinkr_core::DEFAULT_CACHE_TTL;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    #[tokio::test]
    async fn cache_get_and_set() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");

        assert!(cache.get_url(&c).await.unwrap().is_none());

        cache
            .set_url(&c, "https://example.com", DEFAULT_CACHE_TTL)
            .await
            .unwrap();

        let result = cache.get_url(&c).await.unwrap();
        assert_eq!(result.as_deref(), Some("https://example.com"));
    }

    #[tokio::test]
    async fn cache_overwrite_replaces_value() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");

        cache
            .set_url(&c, "https://old.example", DEFAULT_CACHE_TTL)
            .await
            .unwrap();
        cache
            .set_url(&c, "https://new.example", DEFAULT_CACHE_TTL)
            .await
            .unwrap();

        let result = cache.get_url(&c).await.unwrap();
        assert_eq!(result.as_deref(), Some("https://new.example"));
    }

    #[tokio::test]
    async fn cache_del_is_idempotent() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");

        cache.del(&c).await.unwrap();
        assert!(cache.get_url(&c).await.unwrap().is_none());

        cache
            .set_url(&c, "https://example.com", DEFAULT_CACHE_TTL)
            .await
            .unwrap();
        cache.del(&c).await.unwrap();
        cache.del(&c).await.unwrap();
        assert!(cache.get_url(&c).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn entry_expires_after_its_own_ttl() {
        let cache = MokaUrlCache::new();
        let short_lived = code("short");
        let long_lived = code("long");

        cache
            .set_url(&short_lived, "https://short.example", Duration::from_millis(50))
            .await
            .unwrap();
        cache
            .set_url(&long_lived, "https://long.example", DEFAULT_CACHE_TTL)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        // Expiry is an ordinary miss, not an error.
        assert!(cache.get_url(&short_lived).await.unwrap().is_none());
        assert_eq!(
            cache.get_url(&long_lived).await.unwrap().as_deref(),
            Some("https://long.example")
        );
    }

    #[tokio::test]
    async fn rewrite_resets_ttl() {
        let cache = MokaUrlCache::new();
        let c = code("refill");

        cache
            .set_url(&c, "https://example.com", Duration::from_millis(50))
            .await
            .unwrap();
        cache
            .set_url(&c, "https://example.com", DEFAULT_CACHE_TTL)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(cache.get_url(&c).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn cache_handles_many_entries() {
        let cache = MokaUrlCache::with_capacity(100);

        for i in 0..50 {
            let c = code(&format!("code{}", i));
            cache
                .set_url(&c, &format!("https://example{}", i), DEFAULT_CACHE_TTL)
                .await
                .unwrap();
        }

        assert_eq!(cache.entry_count().await, 50);
        assert_eq!(
            cache.get_url(&code("code25")).await.unwrap().as_deref(),
            Some("https://example25")
        );
    }
}
