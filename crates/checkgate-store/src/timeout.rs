//! I/O timeout wrapper for any [`KeyValueStore`].

use std::future::Future;
use std::time::Duration;

use crate::{KeyValueStore, StoreError};

/// Store-layer settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Upper bound on a single get/set/delete round trip.
    ///
    /// Default: 2 seconds.
    pub io_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            io_timeout: Duration::from_secs(2),
        }
    }
}

/// Wraps a store so every operation fails with [`StoreError::Timeout`]
/// instead of hanging when the backend stops answering.
#[derive(Debug, Clone)]
pub struct TimeoutStore<S> {
    inner: S,
    io_timeout: Duration,
}

impl<S: KeyValueStore> TimeoutStore<S> {
    pub fn new(inner: S, config: &StoreConfig) -> Self {
        Self {
            inner,
            io_timeout: config.io_timeout,
        }
    }

    /// Borrows the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn timed<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.io_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    op,
                    timeout_ms = self.io_timeout.as_millis() as u64,
                    "store operation timed out"
                );
                Err(StoreError::Timeout {
                    op,
                    after: self.io_timeout,
                })
            }
        }
    }
}

impl<S: KeyValueStore> KeyValueStore for TimeoutStore<S> {
    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        self.timed("set", self.inner.set(key, value, ttl)).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.timed("get", self.inner.get(key)).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.timed("delete", self.inner.delete(key)).await
    }
}
