//! Durable tier implementations for shrinkr.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryUrlStore;
pub use postgres::{PgUrlStore, PoolSettings};
pub use shrinkr_core::{StorageError, UrlStore};

/// Result type for durable tier operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// DDL for the Postgres schema expected by [`PgUrlStore`].
pub const POSTGRES_SCHEMA: &str = include_str!("../ddl/postgres/schema.sql");
