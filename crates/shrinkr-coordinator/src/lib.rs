//! Dual-tier storage coordinator for shrinkr.
//!
//! A [`StorageCoordinator`] writes mappings to an expiring cache tier and a
//! durable relational tier, resolves short codes cache-first with durable
//! fallback, and hands successful redirects to a [`ClickRecorder`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use shrinkr_cache::MokaUrlCache;
//! use shrinkr_coordinator::{CoordinatorOptions, StorageCoordinator};
//! use shrinkr_core::ShortCode;
//! use shrinkr_storage::InMemoryUrlStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let coordinator = StorageCoordinator::new(
//!     Some(Arc::new(MokaUrlCache::new())),
//!     Some(Arc::new(InMemoryUrlStore::new())),
//!     CoordinatorOptions::default(),
//! );
//!
//! let code = ShortCode::new("abc123")?;
//! coordinator.save_mapping(&code, "https://example.com", None).await?;
//! assert_eq!(
//!     coordinator.resolve_mapping(&code).await?.as_deref(),
//!     Some("https://example.com")
//! );
//! # Ok(())
//! # }
//! ```

pub mod click;
pub mod coordinator;
pub mod error;
pub mod lifecycle;
pub mod settings;
mod timeout;

pub use click::{ClickRecorder, Visit};
pub use coordinator::{Redirect, SaveOutcome, StorageCoordinator, TierMode};
pub use error::{CoordinatorError, TrackingError};
pub use lifecycle::Coordinator;
pub use settings::{CoordinatorOptions, Settings};
