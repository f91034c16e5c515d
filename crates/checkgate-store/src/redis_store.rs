//! Redis store implementation using the `redis` crate.

use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::{KeyValueStore, StoreError};

/// A [`KeyValueStore`] backed by Redis.
///
/// Holds a [`ConnectionManager`], which multiplexes commands over one
/// connection and transparently reconnects after a drop. Cloning is cheap
/// and every clone shares the same underlying connection, so commands
/// issued by one clone are applied in order with the others.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connects to the Redis server at `url` (e.g. `redis://localhost:6379/`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).inspect_err(|e| {
            tracing::error!(url, error = %e, "invalid redis url");
        })?;
        let conn = client.get_connection_manager().await.inspect_err(|e| {
            tracing::error!(url, error = %e, "redis connection error");
        })?;
        tracing::info!(url, "redis connected");
        Ok(Self { conn })
    }

    /// Builds a connection URL from a host and port.
    pub fn url(host: &str, port: u16) -> String {
        format!("redis://{host}:{port}/")
    }
}

impl KeyValueStore for RedisStore {
    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        match ttl {
            // SET EX rejects 0, so sub-second TTLs round up to one second.
            Some(ttl) => {
                let secs = ttl.as_secs().max(1);
                let _: () = conn.set_ex(key, value, secs).await?;
            }
            None => {
                let _: () = conn.set(key, value).await?;
            }
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        // DEL replies with the number of keys removed; 0 is fine.
        let _: () = conn.del(key).await?;
        Ok(())
    }
}
