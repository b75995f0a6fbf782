use crate::error::StorageError;
use crate::mapping::{ClickId, NewClick, RecordId, StoredUrl};
use crate::shortcode::ShortCode;
use async_trait::async_trait;

/// The durable, authoritative tier.
#[async_trait]
pub trait UrlStore: Send + Sync + 'static {
    /// Inserts a mapping or updates the one already stored under `code`.
    ///
    /// Must be a single atomic operation so that concurrent writers for the
    /// same code resolve as last-write-wins. Returns the durable identity of
    /// the row, which is stable across updates.
    async fn upsert(
        &self,
        code: &ShortCode,
        original_url: &str,
        owner_user_id: Option<&str>,
    ) -> Result<RecordId, StorageError>;

    /// Looks up the mapping for `code`.
    /// Returns `None` if the code does not exist.
    async fn lookup(&self, code: &ShortCode) -> Result<Option<StoredUrl>, StorageError>;

    /// Records a click against an existing mapping.
    async fn insert_click(&self, click: &NewClick) -> Result<ClickId, StorageError>;

    /// Releases the connections held by the store.
    async fn close(&self) {}
}
