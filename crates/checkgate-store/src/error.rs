use std::time::Duration;

/// Errors that can occur in the store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The Redis client reported a failure (connect, command, protocol).
    #[cfg(feature = "redis")]
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A store operation did not complete within the I/O timeout.
    #[error("store {op} timed out after {after:?}")]
    Timeout {
        /// Which operation timed out (`"get"`, `"set"`, `"delete"`).
        op: &'static str,
        after: Duration,
    },

    /// The backend is unreachable or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
