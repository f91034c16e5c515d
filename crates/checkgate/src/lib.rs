//! # Checkgate
//!
//! Rotating check-in access codes for events.
//!
//! A check-in session hands out a short code that attendees present at the
//! door. The code rotates, either when an operator asks for a new one or on
//! a server-side timer, and the current code always lives in a shared
//! key-value store so that any replica can answer "what's the code right
//! now?".
//!
//! This crate ties the layers together behind an HTTP API:
//! protocol → session → store.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use checkgate::prelude::*;
//!
//! # async fn run() -> Result<(), CheckgateError> {
//! let server = CheckgateServer::builder()
//!     .bind("0.0.0.0:3001")
//!     .build(MemoryStore::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;
mod signal;

pub use config::{CodeStyle, KeyMode, ServerConfig, StoreKind};
pub use error::CheckgateError;
pub use server::{CheckgateServer, CheckgateServerBuilder};
pub use signal::shutdown_signal;

/// Everything needed to embed a Checkgate server.
pub mod prelude {
    pub use crate::{CheckgateError, CheckgateServer, CheckgateServerBuilder, ServerConfig};

    pub use checkgate_protocol::{EventId, SessionId};
    pub use checkgate_session::{
        CodeFormat, KeyStrategy, SessionConfig, SessionError, SessionLifecycleManager,
        ShutdownReport, StartOptions,
    };
    pub use checkgate_store::{KeyValueStore, MemoryStore, StoreConfig, StoreError, TimeoutStore};
}
