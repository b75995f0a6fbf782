use shrinkr_core::{normalize_owner, ClickId, RecordId, ShortCode, UrlCache, UrlStore};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

use crate::click::{ClickRecorder, Visit};
use crate::error::{CoordinatorError, Result, TrackingError};
use crate::settings::CoordinatorOptions;
use crate::timeout::{cache_call, store_call};

/// Which tiers a coordinator was started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierMode {
    Full,
    CacheOnly,
    DurableOnly,
    Unavailable,
}

impl Display for TierMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TierMode::Full => write!(f, "full"),
            TierMode::CacheOnly => write!(f, "cache-only"),
            TierMode::DurableOnly => write!(f, "durable-only"),
            TierMode::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Result of a successful [`StorageCoordinator::save_mapping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Durable id of the mapping. `None` in cache-only mode.
    pub record_id: Option<RecordId>,
    /// Whether the cache accepted the write.
    pub cached: bool,
}

/// A resolved redirect and the click being recorded for it.
#[derive(Debug)]
pub struct Redirect {
    pub original_url: String,
    /// Background click recording. Dropping the handle detaches it.
    pub tracking: JoinHandle<std::result::Result<ClickId, TrackingError>>,
}

/// Coordinates reads and writes across the cache and durable tiers.
///
/// Writes go to both tiers; the durable tier decides success. Reads go to
/// the cache first and fall back to the durable tier, refilling the cache
/// on a durable hit. Every tier call is bounded by the configured timeout
/// and abandoned when it runs over.
///
/// Either tier may be absent. Without a durable tier the coordinator runs in
/// cache-only mode: writes land in the cache alone and expire with it.
#[derive(Debug)]
pub struct StorageCoordinator<C, S> {
    cache: Option<Arc<C>>,
    store: Option<Arc<S>>,
    options: CoordinatorOptions,
    clicks: ClickRecorder<S>,
}

impl<C, S> Clone for StorageCoordinator<C, S> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            store: self.store.clone(),
            options: self.options,
            clicks: self.clicks.clone(),
        }
    }
}

impl<C, S> StorageCoordinator<C, S>
where
    C: UrlCache + 'static,
    S: UrlStore + 'static,
{
    pub fn new(cache: Option<Arc<C>>, store: Option<Arc<S>>, options: CoordinatorOptions) -> Self {
        let clicks = ClickRecorder::new(store.clone(), options.durable_timeout);
        Self {
            cache,
            store,
            options,
            clicks,
        }
    }

    pub fn cache(&self) -> Option<&Arc<C>> {
        self.cache.as_ref()
    }

    pub fn store(&self) -> Option<&Arc<S>> {
        self.store.as_ref()
    }

    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    pub fn clicks(&self) -> &ClickRecorder<S> {
        &self.clicks
    }

    pub fn mode(&self) -> TierMode {
        match (self.cache.is_some(), self.store.is_some()) {
            (true, true) => TierMode::Full,
            (true, false) => TierMode::CacheOnly,
            (false, true) => TierMode::DurableOnly,
            (false, false) => TierMode::Unavailable,
        }
    }

    /// Writes a mapping to both tiers.
    ///
    /// A cache failure is logged and reported through
    /// [`SaveOutcome::cached`]. A durable failure fails the save even when
    /// the cache accepted the write.
    pub async fn save_mapping(
        &self,
        code: &ShortCode,
        original_url: &str,
        owner_user_id: Option<&str>,
    ) -> Result<SaveOutcome> {
        if self.mode() == TierMode::Unavailable {
            error!(code = %code, "No storage tier available for save");
            return Err(CoordinatorError::NoTierAvailable);
        }

        let owner = normalize_owner(owner_user_id);

        let cache_result = match &self.cache {
            Some(cache) => Some(
                cache_call(
                    self.options.cache_timeout,
                    cache.set_url(code, original_url, self.options.cache_ttl),
                )
                .await,
            ),
            None => None,
        };
        if let Some(Err(e)) = &cache_result {
            warn!(code = %code, error = %e, "Cache write failed");
        }
        let cached = matches!(cache_result, Some(Ok(())));

        let Some(store) = &self.store else {
            return match cache_result {
                Some(Ok(())) => {
                    warn!(code = %code, "Durable tier absent, mapping kept in cache only");
                    Ok(SaveOutcome {
                        record_id: None,
                        cached: true,
                    })
                }
                Some(Err(e)) => Err(CoordinatorError::CacheOnlyWrite(e)),
                None => Err(CoordinatorError::NoTierAvailable),
            };
        };

        match store_call(
            self.options.durable_timeout,
            store.upsert(code, original_url, owner.as_deref()),
        )
        .await
        {
            Ok(id) => {
                debug!(code = %code, id = %id, cached, "Saved mapping");
                Ok(SaveOutcome {
                    record_id: Some(id),
                    cached,
                })
            }
            Err(e) => {
                error!(code = %code, error = %e, "Durable write failed");
                Err(CoordinatorError::DurableWrite(e))
            }
        }
    }

    /// Resolves a short code to its original URL.
    ///
    /// Returns `Ok(None)` when neither tier knows the code. A failing durable
    /// tier is reported as [`CoordinatorError::DurableRead`] so callers can
    /// tell it apart from an unknown code.
    pub async fn resolve_mapping(&self, code: &ShortCode) -> Result<Option<String>> {
        if self.mode() == TierMode::Unavailable {
            error!(code = %code, "No storage tier available for resolve");
            return Err(CoordinatorError::NoTierAvailable);
        }

        if let Some(cache) = &self.cache {
            match cache_call(self.options.cache_timeout, cache.get_url(code)).await {
                Ok(Some(url)) => {
                    trace!(code = %code, "Cache hit");
                    return Ok(Some(url));
                }
                Ok(None) => trace!(code = %code, "Cache miss"),
                Err(e) => warn!(code = %code, error = %e, "Cache read failed, falling back"),
            }
        }

        let Some(store) = &self.store else {
            debug!(code = %code, "Durable tier absent, treating as not found");
            return Ok(None);
        };

        match store_call(self.options.durable_timeout, store.lookup(code)).await {
            Ok(Some(stored)) => {
                self.refill(code, &stored.original_url).await;
                Ok(Some(stored.original_url))
            }
            Ok(None) => {
                debug!(code = %code, "Short code not found");
                Ok(None)
            }
            Err(e) => {
                error!(code = %code, error = %e, "Durable read failed");
                Err(CoordinatorError::DurableRead(e))
            }
        }
    }

    /// Like [`resolve_mapping`](Self::resolve_mapping), folding every error
    /// into "not found".
    pub async fn resolve_mapping_or_none(&self, code: &ShortCode) -> Option<String> {
        self.resolve_mapping(code).await.ok().flatten()
    }

    /// Resolves `code` and starts recording the click in the background.
    ///
    /// No click is recorded for unknown codes.
    pub async fn redirect(&self, code: &ShortCode, visit: Visit) -> Result<Option<Redirect>> {
        let Some(original_url) = self.resolve_mapping(code).await? else {
            return Ok(None);
        };

        let tracking = self.clicks.track(code.clone(), visit);
        Ok(Some(Redirect {
            original_url,
            tracking,
        }))
    }

    /// Closes both tiers.
    ///
    /// The durable pool is shared with outstanding clones, so their durable
    /// calls fail from here on. A cache without a `close` of its own (Redis)
    /// keeps answering clones until the last one drops.
    pub async fn shutdown(self) {
        if let Some(cache) = &self.cache {
            cache.close().await;
        }
        if let Some(store) = &self.store {
            store.close().await;
        }
        debug!("Storage coordinator shut down");
    }

    async fn refill(&self, code: &ShortCode, original_url: &str) {
        let Some(cache) = &self.cache else {
            return;
        };

        match cache_call(
            self.options.cache_timeout,
            cache.set_url(code, original_url, self.options.cache_ttl),
        )
        .await
        {
            Ok(()) => trace!(code = %code, "Refilled cache from durable tier"),
            Err(e) => warn!(code = %code, error = %e, "Cache refill failed"),
        }
    }
}
