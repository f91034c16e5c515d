//! Wire protocol for Checkgate.
//!
//! This crate defines the "language" that check-in clients and the server
//! speak over HTTP:
//!
//! - **Identifiers** ([`SessionId`], [`EventId`]): the opaque ids that
//!   appear in URL paths, query strings and response bodies.
//! - **Bodies** ([`StartSessionRequest`], [`StartSessionResponse`],
//!   [`CodeResponse`], ...): the JSON documents each route accepts and
//!   returns.
//! - **Errors** ([`ProtocolError`]): what can go wrong when turning raw
//!   request input into identifiers.
//!
//! # Architecture
//!
//! The protocol layer doesn't know about stores, timers or the registry.
//! It only knows how request and response documents are shaped.
//!
//! ```text
//! HTTP (bytes) → Protocol (typed bodies) → Session (lifecycle manager)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use error::ProtocolError;
pub use types::{
    CodeQuery, CodeResponse, ErrorBody, EventId, HealthResponse,
    MessageResponse, SessionId, StartSessionRequest, StartSessionResponse,
    STOPPED_MESSAGE,
};
