//! Key-value store abstraction layer for Checkgate.
//!
//! Provides the [`KeyValueStore`] trait that abstracts over the external
//! store holding each session's current code, plus the implementations
//! the server can run against.
//!
//! The store is the source of truth for codes: replicas that never saw a
//! session start can still read its code, as long as they talk to the same
//! store.
//!
//! # Feature Flags
//!
//! - `redis` (default): Redis store via the `redis` crate's connection manager

mod backend;
mod error;
mod memory;
#[cfg(feature = "redis")]
mod redis_store;
mod timeout;

pub use backend::StoreBackend;
pub use error::StoreError;
pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;
pub use timeout::{StoreConfig, TimeoutStore};

use std::future::Future;
use std::time::Duration;

/// A durable string map with optional per-key expiry.
///
/// # Contract
///
/// - `set` overwrites any existing value. With `ttl = Some(d)` the store
///   forgets the key on its own after `d`; with `None` the key lives until
///   deleted.
/// - `get` returns `Ok(None)` for a key that was never written, was
///   deleted, or has expired. Callers can't tell these apart.
/// - `delete` is idempotent: deleting an absent key is `Ok(())`.
///
/// The methods return `impl Future + Send` (rather than plain `async fn`)
/// so that callers can drive them from spawned Tokio tasks, e.g. rotation
/// timers.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Writes `value` under `key`, optionally expiring after `ttl`.
    fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Reads the current value under `key`.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Removes `key`. Absent keys are not an error.
    fn delete(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl<S: KeyValueStore> KeyValueStore for std::sync::Arc<S> {
    fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).set(key, value, ttl)
    }

    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send {
        (**self).get(key)
    }

    fn delete(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).delete(key)
    }
}
