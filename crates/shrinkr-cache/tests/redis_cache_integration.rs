use std::time::Duration;

use shrinkr_cache::redis::DEFAULT_KEY_PREFIX;
use shrinkr_cache::{RedisUrlCache, UrlCache, DEFAULT_CACHE_TTL};
use shrinkr_core::ShortCode;
use shrinkr_test_infra::redis::RedisServer;

/// Test fixture that manages a Redis container using test-infra.
struct RedisTestContainer {
    _redis: RedisServer,
    redis_url: String,
}

impl RedisTestContainer {
    async fn start() -> Self {
        let redis = RedisServer::new().await.expect("Failed to start Redis");
        let redis_url = redis.redis_url().await.expect("Failed to get Redis url");

        Self {
            _redis: redis,
            redis_url,
        }
    }

    async fn cache(&self, prefix: &str) -> RedisUrlCache {
        RedisUrlCache::connect(&self.redis_url, prefix, Duration::from_secs(5))
            .await
            .expect("Failed to connect to Redis")
    }
}

#[tokio::test]
async fn test_redis_cache_basic_get_set() {
    let fixture = RedisTestContainer::start().await;
    let cache = fixture.cache(DEFAULT_KEY_PREFIX).await;
    let code = ShortCode::new("test123").unwrap();

    assert!(cache.get_url(&code).await.unwrap().is_none());

    cache
        .set_url(&code, "https://example.com", DEFAULT_CACHE_TTL)
        .await
        .unwrap();

    let result = cache.get_url(&code).await.unwrap();
    assert_eq!(result.as_deref(), Some("https://example.com"));
}

#[tokio::test]
async fn test_redis_cache_delete() {
    let fixture = RedisTestContainer::start().await;
    let cache = fixture.cache(DEFAULT_KEY_PREFIX).await;
    let code = ShortCode::new("delete123").unwrap();

    cache
        .set_url(&code, "https://example.com/delete", DEFAULT_CACHE_TTL)
        .await
        .unwrap();
    cache.del(&code).await.unwrap();

    assert!(cache.get_url(&code).await.unwrap().is_none());
    assert!(cache.del(&code).await.is_ok(), "Deleting a missing key should not error");
}

#[tokio::test]
async fn test_redis_cache_custom_prefix_isolates_entries() {
    let fixture = RedisTestContainer::start().await;
    let cache1 = fixture.cache("prefix1:").await;
    let cache2 = fixture.cache("prefix2:").await;
    let code = ShortCode::new("prefix_test").unwrap();

    cache1
        .set_url(&code, "https://example.com/prefix", DEFAULT_CACHE_TTL)
        .await
        .unwrap();

    assert!(cache1.get_url(&code).await.unwrap().is_some());
    assert!(cache2.get_url(&code).await.unwrap().is_none());
}

#[tokio::test]
async fn test_redis_cache_overwrite() {
    let fixture = RedisTestContainer::start().await;
    let cache = fixture.cache(DEFAULT_KEY_PREFIX).await;
    let code = ShortCode::new("overwrite").unwrap();

    cache
        .set_url(&code, "https://example.com/old", DEFAULT_CACHE_TTL)
        .await
        .unwrap();
    cache
        .set_url(&code, "https://example.com/new", DEFAULT_CACHE_TTL)
        .await
        .unwrap();

    let result = cache.get_url(&code).await.unwrap();
    assert_eq!(result.as_deref(), Some("https://example.com/new"));
}

#[tokio::test]
async fn test_redis_cache_entry_expires_as_miss() {
    let fixture = RedisTestContainer::start().await;
    let cache = fixture.cache(DEFAULT_KEY_PREFIX).await;
    let code = ShortCode::new("ttl_test").unwrap();

    cache
        .set_url(&code, "https://example.com/ttl", Duration::from_secs(1))
        .await
        .unwrap();
    assert!(cache.get_url(&code).await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(2_200)).await;

    let result = cache.get_url(&code).await.unwrap();
    assert!(result.is_none(), "Key should be expired after TTL");
}

#[tokio::test]
async fn test_redis_connect_to_dead_port_is_soft_failure() {
    let err = RedisUrlCache::connect(
        "redis://127.0.0.1:1",
        DEFAULT_KEY_PREFIX,
        Duration::from_secs(2),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        shrinkr_core::CacheError::Unavailable(_)
            | shrinkr_core::CacheError::Timeout(_)
            | shrinkr_core::CacheError::Operation(_)
    ));
}
