use crate::shortcode::ShortCode;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Owner id historically used for anonymous shortening requests.
pub const GUEST_USER_ID: &str = "guest-user";

/// Normalizes an owner id so guests are represented as "no owner".
///
/// `None`, blank strings and [`GUEST_USER_ID`] all map to `None`.
pub fn normalize_owner(owner: Option<&str>) -> Option<String> {
    let owner = owner?.trim();
    if owner.is_empty() || owner == GUEST_USER_ID {
        None
    } else {
        Some(owner.to_string())
    }
}

/// Durable identity of a URL mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generates a fresh random record id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Durable identity of a click event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClickId(Uuid);

impl ClickId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ClickId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ClickId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A URL mapping as held by the durable tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlMapping {
    pub id: RecordId,
    pub short_code: ShortCode,
    /// The original URL. Stored as given, never validated as a URI.
    pub original_url: String,
    /// `None` for guest mappings.
    pub owner_user_id: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The part of a mapping needed to redirect and to attribute clicks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUrl {
    pub id: RecordId,
    pub original_url: String,
}

/// A click to be inserted into the durable tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClick {
    pub url_id: RecordId,
    pub owner_user_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

/// A recorded click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub id: ClickId,
    pub url_id: RecordId,
    pub owner_user_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub clicked_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_owners_normalize_to_none() {
        assert_eq!(normalize_owner(None), None);
        assert_eq!(normalize_owner(Some("")), None);
        assert_eq!(normalize_owner(Some("   ")), None);
        assert_eq!(normalize_owner(Some(GUEST_USER_ID)), None);
    }

    #[test]
    fn real_owners_are_kept_trimmed() {
        assert_eq!(normalize_owner(Some("alice")), Some("alice".to_string()));
        assert_eq!(normalize_owner(Some(" bob ")), Some("bob".to_string()));
    }

    #[test]
    fn record_ids_are_unique() {
        assert_ne!(RecordId::new(), RecordId::new());
    }
}
