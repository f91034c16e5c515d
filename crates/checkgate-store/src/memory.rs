//! In-process store backed by a `HashMap`.
//!
//! Used for single-process deployments (`--store memory`) and as the store
//! double in tests. Expiry uses Tokio's clock, so tests running under
//! `tokio::time::pause()` can fast-forward through a TTL.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::{KeyValueStore, StoreError};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// A [`KeyValueStore`] that keeps everything in memory.
///
/// Cheap to clone: clones share the same map, like handles to one Redis.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `key` holds a value that has not expired.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = Instant::now();
        self.lock().get(key).is_some_and(|e| e.is_live(now))
    }

    /// Number of live (non-expired) keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock().values().filter(|e| e.is_live(now)).count()
    }

    /// Returns `true` if no live keys remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock can't leave the map half-updated
    // (every critical section is a single insert/remove), so a poisoned
    // lock is safe to keep using.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: ttl.map(|d| Instant::now() + d),
        };
        self.lock().insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                // Lazily drop expired keys, the way Redis does on access.
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }
}
