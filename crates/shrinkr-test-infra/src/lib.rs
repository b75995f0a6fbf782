//! Test fixtures shared by the shrinkr crates.
//!
//! Disposable Postgres and Redis containers for integration tests, plus
//! wrappers that inject outages into any cache or durable tier.

pub mod error;
pub mod fault;
pub mod postgres;
pub mod redis;

pub use error::{Result, TestInfraError};
pub use fault::{FaultMode, FaultyCache, FaultyStore};
