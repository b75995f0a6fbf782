use async_trait::async_trait;
use dashmap::DashMap;
use jiff::Timestamp;
use shrinkr_core::{
    ClickEvent, ClickId, NewClick, RecordId, ShortCode, StorageError, StoredUrl, UrlMapping,
    UrlStore,
};

use crate::Result;

/// In-memory implementation of the durable tier using DashMap.
///
/// Upserts take the shard lock for the code through [`DashMap::entry`], so
/// concurrent writers for one code serialize exactly like the SQL upsert.
/// Owner ids are not checked against a users table.
#[derive(Debug, Default)]
pub struct InMemoryUrlStore {
    mappings: DashMap<String, UrlMapping>,
    clicks: DashMap<RecordId, Vec<ClickEvent>>,
}

impl InMemoryUrlStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the full mapping stored under `code`, if any.
    pub fn mapping(&self, code: &ShortCode) -> Option<UrlMapping> {
        self.mappings.get(code.as_str()).map(|m| m.clone())
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Lists the clicks recorded against a mapping, oldest first.
    pub fn clicks(&self, url_id: RecordId) -> Vec<ClickEvent> {
        self.clicks
            .get(&url_id)
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    fn contains_id(&self, id: RecordId) -> bool {
        self.mappings.iter().any(|m| m.id == id)
    }
}

#[async_trait]
impl UrlStore for InMemoryUrlStore {
    async fn upsert(
        &self,
        code: &ShortCode,
        original_url: &str,
        owner_user_id: Option<&str>,
    ) -> Result<RecordId> {
        let now = Timestamp::now();
        let owner = owner_user_id.map(str::to_string);

        let entry = self
            .mappings
            .entry(code.as_str().to_string())
            .and_modify(|m| {
                m.original_url = original_url.to_string();
                m.owner_user_id = owner.clone();
                m.is_active = true;
                m.updated_at = now;
            })
            .or_insert_with(|| UrlMapping {
                id: RecordId::new(),
                short_code: code.clone(),
                original_url: original_url.to_string(),
                owner_user_id: owner.clone(),
                is_active: true,
                created_at: now,
                updated_at: now,
            });

        Ok(entry.id)
    }

    async fn lookup(&self, code: &ShortCode) -> Result<Option<StoredUrl>> {
        Ok(self
            .mappings
            .get(code.as_str())
            .filter(|m| m.is_active)
            .map(|m| StoredUrl {
                id: m.id,
                original_url: m.original_url.clone(),
            }))
    }

    async fn insert_click(&self, click: &NewClick) -> Result<ClickId> {
        if !self.contains_id(click.url_id) {
            return Err(StorageError::Constraint(format!(
                "url mapping {} does not exist",
                click.url_id
            )));
        }

        let event = ClickEvent {
            id: ClickId::new(),
            url_id: click.url_id,
            owner_user_id: click.owner_user_id.clone(),
            ip_address: click.ip_address.clone(),
            user_agent: click.user_agent.clone(),
            referer: click.referer.clone(),
            clicked_at: Timestamp::now(),
        };
        let id = event.id;
        self.clicks.entry(click.url_id).or_default().push(event);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    fn click(url_id: RecordId) -> NewClick {
        NewClick {
            url_id,
            owner_user_id: None,
            ip_address: Some("127.0.0.1".to_string()),
            user_agent: Some("test-agent".to_string()),
            referer: None,
        }
    }

    #[tokio::test]
    async fn upsert_and_lookup() {
        let store = InMemoryUrlStore::new();

        let id = store
            .upsert(&code("abc123"), "https://example.com", Some("alice"))
            .await
            .unwrap();

        let found = store.lookup(&code("abc123")).await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.original_url, "https://example.com");
    }

    #[tokio::test]
    async fn lookup_nonexistent() {
        let store = InMemoryUrlStore::new();
        assert!(store.lookup(&code("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_updates_in_place() {
        let store = InMemoryUrlStore::new();
        let c = code("abc123");

        let first = store.upsert(&c, "https://one.example", None).await.unwrap();
        let created_at = store.mapping(&c).unwrap().created_at;
        let second = store
            .upsert(&c, "https://two.example", Some("bob"))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);

        let mapping = store.mapping(&c).unwrap();
        assert_eq!(mapping.original_url, "https://two.example");
        assert_eq!(mapping.owner_user_id.as_deref(), Some("bob"));
        assert_eq!(mapping.created_at, created_at);
        assert!(mapping.updated_at >= created_at);
    }

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let store = InMemoryUrlStore::new();
        let c = code("same");

        let a = store.upsert(&c, "https://example.com", None).await.unwrap();
        let b = store.upsert(&c, "https://example.com", None).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn insert_click_requires_existing_mapping() {
        let store = InMemoryUrlStore::new();

        let err = store.insert_click(&click(RecordId::new())).await.unwrap_err();
        assert!(matches!(err, StorageError::Constraint(_)));

        let id = store
            .upsert(&code("abc123"), "https://example.com", None)
            .await
            .unwrap();
        store.insert_click(&click(id)).await.unwrap();
        store.insert_click(&click(id)).await.unwrap();

        let clicks = store.clicks(id);
        assert_eq!(clicks.len(), 2);
        assert!(clicks.iter().all(|c| c.url_id == id));
        assert_eq!(clicks[0].ip_address.as_deref(), Some("127.0.0.1"));
    }

    #[tokio::test]
    async fn upsert_reactivates_retired_mapping() {
        let store = InMemoryUrlStore::new();
        let c = code("retired");

        let id = store.upsert(&c, "https://old.example", None).await.unwrap();
        store.mappings.get_mut(c.as_str()).unwrap().is_active = false;
        assert!(store.lookup(&c).await.unwrap().is_none());

        let again = store.upsert(&c, "https://new.example", None).await.unwrap();
        let found = store.lookup(&c).await.unwrap().unwrap();

        assert_eq!(again, id);
        assert_eq!(found.original_url, "https://new.example");
    }

    #[tokio::test]
    async fn concurrent_upserts_keep_one_row() {
        let store = Arc::new(InMemoryUrlStore::new());
        let mut handles = vec![];

        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .upsert(&code("race"), &format!("https://example{}.com", i % 2), None)
                    .await
                    .unwrap()
            }));
        }

        let mut ids = vec![];
        for handle in handles {
            ids.push(handle.await.unwrap());
        }

        assert_eq!(store.len(), 1);
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        let url = store.mapping(&code("race")).unwrap().original_url;
        assert!(url == "https://example0.com" || url == "https://example1.com");
    }
}
