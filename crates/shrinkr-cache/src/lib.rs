//! Cache tier implementations for shrinkr.

pub mod moka;
pub mod redis;

pub use self::moka::MokaUrlCache;
pub use self::redis::RedisUrlCache;
pub use shrinkr_core::{CacheError, UrlCache, DEFAULT_CACHE_TTL};

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;
