use shrinkr_cache::RedisUrlCache;
use shrinkr_storage::PgUrlStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::coordinator::{StorageCoordinator, TierMode};
use crate::settings::Settings;

/// Bound on establishing the Redis connection at startup.
const REDIS_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// The production pairing: Redis in front of Postgres.
pub type Coordinator = StorageCoordinator<RedisUrlCache, PgUrlStore>;

impl Coordinator {
    /// Connects whichever tiers `settings` names.
    ///
    /// A tier that cannot be reached is logged and left out; the coordinator
    /// then runs degraded rather than refusing to start.
    pub async fn initialize(settings: &Settings) -> Self {
        let cache = match &settings.redis_url {
            Some(url) => {
                match RedisUrlCache::connect(url, &settings.cache_key_prefix, REDIS_CONNECT_TIMEOUT)
                    .await
                {
                    Ok(cache) => {
                        info!(prefix = %settings.cache_key_prefix, "Cache tier connected");
                        Some(Arc::new(cache))
                    }
                    Err(e) => {
                        warn!(error = %e, "Cache tier unavailable, continuing without it");
                        None
                    }
                }
            }
            None => {
                info!("Cache tier not configured");
                None
            }
        };

        let store = match &settings.database_url {
            Some(url) => match PgUrlStore::connect(url, &settings.pool).await {
                Ok(store) => {
                    info!("Durable tier connected");
                    Some(Arc::new(store))
                }
                Err(e) => {
                    warn!(error = %e, "Durable tier unavailable, continuing without it");
                    None
                }
            },
            None => {
                info!("Durable tier not configured");
                None
            }
        };

        let coordinator = Self::new(cache, store, settings.options);
        match coordinator.mode() {
            TierMode::Full => info!("Storage coordinator ready"),
            TierMode::Unavailable => error!("No storage tier available, every call will fail"),
            mode => warn!(mode = %mode, "Storage coordinator running degraded"),
        }
        coordinator
    }
}
