use async_trait::async_trait;
use shrinkr_core::{
    CacheError, ClickId, NewClick, RecordId, ShortCode, StorageError, StoredUrl, UrlCache,
    UrlStore,
};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::time::Duration;

/// How a wrapped tier answers calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultMode {
    /// Calls reach the inner tier.
    Healthy,
    /// Calls fail immediately as if the backend were unreachable.
    Failing,
    /// Calls never complete.
    Hanging,
}

#[derive(Debug, Default)]
struct FaultSwitch(AtomicU8);

impl FaultSwitch {
    fn set(&self, mode: FaultMode) {
        let raw = match mode {
            FaultMode::Healthy => 0,
            FaultMode::Failing => 1,
            FaultMode::Hanging => 2,
        };
        self.0.store(raw, Ordering::SeqCst);
    }

    fn get(&self) -> FaultMode {
        match self.0.load(Ordering::SeqCst) {
            0 => FaultMode::Healthy,
            1 => FaultMode::Failing,
            _ => FaultMode::Hanging,
        }
    }
}

async fn hang<T>() -> T {
    loop {
        tokio::time::sleep(Duration::from_secs(3600)).await;
    }
}

/// A [`UrlCache`] wrapper whose availability can be switched at runtime.
#[derive(Debug, Default)]
pub struct FaultyCache<C> {
    inner: C,
    mode: FaultSwitch,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl<C: UrlCache> FaultyCache<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            mode: FaultSwitch::default(),
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn set_mode(&self, mode: FaultMode) {
        self.mode.set(mode);
    }

    /// Shorthand for [`FaultMode::Failing`].
    pub fn fail(&self) {
        self.set_mode(FaultMode::Failing);
    }

    /// Shorthand for [`FaultMode::Healthy`].
    pub fn recover(&self) {
        self.set_mode(FaultMode::Healthy);
    }

    /// Number of `get_url` calls seen, including failed ones.
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of `set_url` calls seen, including failed ones.
    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    async fn gate(&self) -> Result<(), CacheError> {
        match self.mode.get() {
            FaultMode::Healthy => Ok(()),
            FaultMode::Failing => Err(CacheError::Unavailable("injected cache outage".into())),
            FaultMode::Hanging => hang().await,
        }
    }
}

#[async_trait]
impl<C: UrlCache> UrlCache for FaultyCache<C> {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;
        self.inner.get_url(code).await
    }

    async fn set_url(
        &self,
        code: &ShortCode,
        original_url: &str,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;
        self.inner.set_url(code, original_url, ttl).await
    }

    async fn del(&self, code: &ShortCode) -> Result<(), CacheError> {
        self.gate().await?;
        self.inner.del(code).await
    }

    async fn close(&self) {
        self.inner.close().await
    }
}

/// A [`UrlStore`] wrapper whose availability can be switched at runtime.
#[derive(Debug, Default)]
pub struct FaultyStore<S> {
    inner: S,
    mode: FaultSwitch,
    upserts: AtomicUsize,
    lookups: AtomicUsize,
    clicks: AtomicUsize,
}

impl<S: UrlStore> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            mode: FaultSwitch::default(),
            upserts: AtomicUsize::new(0),
            lookups: AtomicUsize::new(0),
            clicks: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn set_mode(&self, mode: FaultMode) {
        self.mode.set(mode);
    }

    /// Shorthand for [`FaultMode::Failing`].
    pub fn fail(&self) {
        self.set_mode(FaultMode::Failing);
    }

    /// Shorthand for [`FaultMode::Healthy`].
    pub fn recover(&self) {
        self.set_mode(FaultMode::Healthy);
    }

    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn click_inserts(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }

    async fn gate(&self) -> Result<(), StorageError> {
        match self.mode.get() {
            FaultMode::Healthy => Ok(()),
            FaultMode::Failing => Err(StorageError::Unavailable(
                "injected database outage".into(),
            )),
            FaultMode::Hanging => hang().await,
        }
    }
}

#[async_trait]
impl<S: UrlStore> UrlStore for FaultyStore<S> {
    async fn upsert(
        &self,
        code: &ShortCode,
        original_url: &str,
        owner_user_id: Option<&str>,
    ) -> Result<RecordId, StorageError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;
        self.inner.upsert(code, original_url, owner_user_id).await
    }

    async fn lookup(&self, code: &ShortCode) -> Result<Option<StoredUrl>, StorageError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;
        self.inner.lookup(code).await
    }

    async fn insert_click(&self, click: &NewClick) -> Result<ClickId, StorageError> {
        self.clicks.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;
        self.inner.insert_click(click).await
    }

    async fn close(&self) {
        self.inner.close().await
    }
}
