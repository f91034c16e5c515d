//! Session types: what the registry knows about a running session.
//!
//! A "session" is one check-in window. It tracks:
//! - WHO it is (`SessionId`, and the `EventId` it belongs to if any)
//! - WHERE its code lives (the derived store key)
//! - WHEN it started, and HOW OFTEN the server rotates its code
//!
//! The code itself is never kept here. The store is the only place a code
//! lives, so that replicas reading the store always agree with us.

use std::time::{Duration, SystemTime};

use checkgate_protocol::{EventId, SessionId};

use crate::{CodeFormat, SessionError};

// ---------------------------------------------------------------------------
// KeyStrategy
// ---------------------------------------------------------------------------

/// How a session's store key and code TTL are derived.
///
/// ```text
/// EventScoped              event:{eventId}:session:{sessionId}   no TTL
/// SelfExpiring { ttl }     session:{sessionId}                   TTL = ttl
///                          event:{eventId}:session:{sessionId}   (when an event is given)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    /// Multi-tenant: every session belongs to an event and codes persist
    /// until rotated or deleted.
    EventScoped,
    /// Single-session: codes expire on their own after `ttl` unless the
    /// server rotates them first.
    SelfExpiring { ttl: Duration },
}

impl Default for KeyStrategy {
    fn default() -> Self {
        Self::EventScoped
    }
}

impl KeyStrategy {
    /// Derives the store key for a session.
    ///
    /// # Errors
    /// [`SessionError::InvalidRequest`] when the strategy is
    /// [`EventScoped`](Self::EventScoped) and no event id was supplied.
    pub fn derive_key(
        &self,
        session_id: &SessionId,
        event_id: Option<&EventId>,
    ) -> Result<String, SessionError> {
        match (self, event_id) {
            (_, Some(event_id)) => Ok(format!("event:{event_id}:session:{session_id}")),
            (Self::EventScoped, None) => {
                Err(SessionError::InvalidRequest("eventId is required".into()))
            }
            (Self::SelfExpiring { .. }, None) => Ok(format!("session:{session_id}")),
        }
    }

    /// TTL applied when a session's first code is written.
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            Self::EventScoped => None,
            Self::SelfExpiring { ttl } => Some(*ttl),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Shape of generated codes. Default: six digits.
    pub code_format: CodeFormat,

    /// Key derivation and TTL. Default: event-scoped, no TTL.
    pub key_strategy: KeyStrategy,

    /// Rotation period used when a start request doesn't name one.
    /// `None` means codes only rotate on explicit requests.
    pub rotation_period: Option<Duration>,

    /// Maximum random delay added before a session's first timer rotation.
    pub rotation_jitter: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            code_format: CodeFormat::default(),
            key_strategy: KeyStrategy::default(),
            rotation_period: None,
            rotation_jitter: Duration::from_millis(100),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single check-in session started by this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque id, fixed at creation.
    pub session_id: SessionId,

    /// The event this session belongs to (event-scoped deployments).
    pub event_id: Option<EventId>,

    /// Creation time.
    pub started_at: SystemTime,

    /// How often the server rotates the code, if it does.
    pub rotation_period: Option<Duration>,

    /// Store key holding the current code.
    pub code_key: String,
}

impl Session {
    /// `true` if `event_id` names the scope this session was started in.
    pub fn in_scope(&self, event_id: Option<&EventId>) -> bool {
        self.event_id.as_ref() == event_id
    }
}
