use shrinkr_cache::redis::DEFAULT_KEY_PREFIX;
use shrinkr_cache::DEFAULT_CACHE_TTL;
use shrinkr_storage::PoolSettings;
use std::time::Duration;
use typed_builder::TypedBuilder;

/// Per-call limits and the cache lifetime the coordinator applies.
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct CoordinatorOptions {
    /// Lifetime of cache entries written by saves and refills.
    #[builder(default = DEFAULT_CACHE_TTL)]
    pub cache_ttl: Duration,
    /// Longest the coordinator waits on a single cache call.
    #[builder(default = Duration::from_secs(1))]
    pub cache_timeout: Duration,
    /// Longest the coordinator waits on a single durable call.
    #[builder(default = Duration::from_secs(5))]
    pub durable_timeout: Duration,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Everything needed to bring both tiers up.
///
/// A tier whose URL is absent is simply not started.
#[derive(Debug, Clone, TypedBuilder)]
pub struct Settings {
    #[builder(default, setter(into, strip_option))]
    pub redis_url: Option<String>,
    #[builder(default, setter(into, strip_option))]
    pub database_url: Option<String>,
    #[builder(default = DEFAULT_KEY_PREFIX.to_string(), setter(into))]
    pub cache_key_prefix: String,
    #[builder(default)]
    pub pool: PoolSettings,
    #[builder(default)]
    pub options: CoordinatorOptions,
}
