//! Core types and traits for the shrinkr URL shortener.
//!
//! This crate holds the domain model shared by the cache tier, the durable
//! tier and the storage coordinator, together with the traits each tier
//! implements.

pub mod cache;
pub mod error;
pub mod generator;
pub mod mapping;
pub mod shortcode;
pub mod store;

pub use cache::{UrlCache, DEFAULT_CACHE_TTL};
pub use error::{CacheError, CoreError, StorageError};
pub use generator::Generator;
pub use mapping::{
    normalize_owner, ClickEvent, ClickId, NewClick, RecordId, StoredUrl, UrlMapping,
    GUEST_USER_ID,
};
pub use shortcode::ShortCode;
pub use store::UrlStore;
