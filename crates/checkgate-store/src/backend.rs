//! Runtime-selected store backend.

use std::time::Duration;

#[cfg(feature = "redis")]
use crate::RedisStore;
use crate::{KeyValueStore, MemoryStore, StoreError};

/// One of the concrete stores, picked at startup from configuration.
///
/// The session layer is generic over [`KeyValueStore`]; this enum lets the
/// binary choose Redis or the in-memory map without making the whole server
/// generic over that choice.
#[derive(Clone)]
pub enum StoreBackend {
    #[cfg(feature = "redis")]
    Redis(RedisStore),
    Memory(MemoryStore),
}

impl StoreBackend {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            #[cfg(feature = "redis")]
            Self::Redis(_) => "redis",
            Self::Memory(_) => "memory",
        }
    }
}

impl From<MemoryStore> for StoreBackend {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}

#[cfg(feature = "redis")]
impl From<RedisStore> for StoreBackend {
    fn from(store: RedisStore) -> Self {
        Self::Redis(store)
    }
}

impl KeyValueStore for StoreBackend {
    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        match self {
            #[cfg(feature = "redis")]
            Self::Redis(s) => s.set(key, value, ttl).await,
            Self::Memory(s) => s.set(key, value, ttl).await,
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            #[cfg(feature = "redis")]
            Self::Redis(s) => s.get(key).await,
            Self::Memory(s) => s.get(key).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match self {
            #[cfg(feature = "redis")]
            Self::Redis(s) => s.delete(key).await,
            Self::Memory(s) => s.delete(key).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_delegates_to_store() {
        let memory = MemoryStore::new();
        let backend = StoreBackend::from(memory.clone());

        backend.set("k", "v", None).await.unwrap();

        assert_eq!(backend.kind(), "memory");
        assert!(memory.contains_key("k"));
        backend.delete("k").await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), None);
    }
}
