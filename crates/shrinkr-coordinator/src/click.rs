use shrinkr_core::{normalize_owner, ClickId, NewClick, ShortCode, UrlStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn, Instrument};
use typed_builder::TypedBuilder;

use crate::error::TrackingError;
use crate::timeout::store_call;

/// Request metadata captured when a short link is followed.
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct Visit {
    /// The visitor's user id. Guest and blank ids are stored as absent.
    #[builder(default, setter(into, strip_option))]
    pub owner_user_id: Option<String>,
    #[builder(default, setter(into, strip_option))]
    pub ip_address: Option<String>,
    #[builder(default, setter(into, strip_option))]
    pub user_agent: Option<String>,
    #[builder(default, setter(into, strip_option))]
    pub referer: Option<String>,
}

/// Records click events in the durable tier.
///
/// The recorder looks the mapping id up itself rather than trusting any
/// cached value, so a click is only stored against a mapping that exists
/// durably.
#[derive(Debug)]
pub struct ClickRecorder<S> {
    store: Option<Arc<S>>,
    timeout: Duration,
}

impl<S> Clone for ClickRecorder<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            timeout: self.timeout,
        }
    }
}

impl<S: UrlStore + 'static> ClickRecorder<S> {
    pub fn new(store: Option<Arc<S>>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Stores one click for `code` and returns its id.
    pub async fn record_click(
        &self,
        code: &ShortCode,
        visit: &Visit,
    ) -> Result<ClickId, TrackingError> {
        let store = self.store.as_ref().ok_or(TrackingError::DurableUnavailable)?;

        let stored = store_call(self.timeout, store.lookup(code))
            .await?
            .ok_or_else(|| TrackingError::UnknownShortCode(code.to_string()))?;

        let click = NewClick {
            url_id: stored.id,
            owner_user_id: normalize_owner(visit.owner_user_id.as_deref()),
            ip_address: visit.ip_address.clone(),
            user_agent: visit.user_agent.clone(),
            referer: visit.referer.clone(),
        };
        trace!(code = %code, url_id = %click.url_id, "Recording click");

        let id = store_call(self.timeout, store.insert_click(&click)).await?;
        Ok(id)
    }

    /// Records a click on a background task.
    ///
    /// Failures are logged and never reach the caller that served the
    /// redirect. The handle may be dropped; awaiting it yields the outcome.
    pub fn track(
        &self,
        code: ShortCode,
        visit: Visit,
    ) -> JoinHandle<Result<ClickId, TrackingError>> {
        let recorder = self.clone();

        tokio::spawn(
            async move {
                let result = recorder.record_click(&code, &visit).await;
                match &result {
                    Ok(id) => debug!(code = %code, click_id = %id, "Click recorded"),
                    Err(e) => warn!(code = %code, error = %e, "Failed to record click"),
                }
                result
            }
            .in_current_span(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shrinkr_core::GUEST_USER_ID;
    use shrinkr_storage::InMemoryUrlStore;
    use shrinkr_test_infra::FaultyStore;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    type TestStore = FaultyStore<InMemoryUrlStore>;

    fn recorder(store: &Arc<TestStore>) -> ClickRecorder<TestStore> {
        ClickRecorder::new(Some(Arc::clone(store)), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn records_click_against_mapping_id() {
        let store = Arc::new(FaultyStore::new(InMemoryUrlStore::new()));
        let id = store
            .upsert(&code("abc123"), "https://example.com", None)
            .await
            .unwrap();

        let visit = Visit::builder()
            .owner_user_id("alice")
            .ip_address("198.51.100.4")
            .user_agent("Mozilla/5.0")
            .referer("https://search.example")
            .build();
        recorder(&store)
            .record_click(&code("abc123"), &visit)
            .await
            .unwrap();

        let clicks = store.inner().clicks(id);
        assert_eq!(clicks.len(), 1);
        assert_eq!(clicks[0].owner_user_id.as_deref(), Some("alice"));
        assert_eq!(clicks[0].ip_address.as_deref(), Some("198.51.100.4"));
        assert_eq!(clicks[0].user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(clicks[0].referer.as_deref(), Some("https://search.example"));
    }

    #[tokio::test]
    async fn guest_owner_is_stored_as_absent() {
        let store = Arc::new(FaultyStore::new(InMemoryUrlStore::new()));
        let id = store
            .upsert(&code("guest1"), "https://example.com", None)
            .await
            .unwrap();

        for owner in [GUEST_USER_ID, "", "   "] {
            let visit = Visit::builder().owner_user_id(owner).build();
            recorder(&store)
                .record_click(&code("guest1"), &visit)
                .await
                .unwrap();
        }

        let clicks = store.inner().clicks(id);
        assert_eq!(clicks.len(), 3);
        assert!(clicks.iter().all(|c| c.owner_user_id.is_none()));
    }

    #[tokio::test]
    async fn unknown_code_is_reported() {
        let store = Arc::new(FaultyStore::new(InMemoryUrlStore::new()));

        let err = recorder(&store)
            .record_click(&code("missing"), &Visit::default())
            .await
            .unwrap_err();

        assert!(matches!(err, TrackingError::UnknownShortCode(c) if c == "missing"));
        assert_eq!(store.click_inserts(), 0);
    }

    #[tokio::test]
    async fn missing_durable_tier_is_reported() {
        let recorder: ClickRecorder<InMemoryUrlStore> =
            ClickRecorder::new(None, Duration::from_secs(1));

        let err = recorder
            .record_click(&code("abc123"), &Visit::default())
            .await
            .unwrap_err();

        assert!(matches!(err, TrackingError::DurableUnavailable));
    }

    #[tokio::test]
    async fn tracked_failure_surfaces_through_handle() {
        let store = Arc::new(FaultyStore::new(InMemoryUrlStore::new()));
        store
            .upsert(&code("abc123"), "https://example.com", None)
            .await
            .unwrap();
        store.fail();

        let result = recorder(&store)
            .track(code("abc123"), Visit::default())
            .await
            .unwrap();

        assert!(matches!(result, Err(TrackingError::Storage(_))));
    }
}
