//! Core protocol types for Checkgate's HTTP surface.
//!
//! Every type here is either an identifier that shows up in a URL or a
//! JSON document that travels in a request or response body.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ProtocolError;

/// The message returned by a successful stop.
pub const STOPPED_MESSAGE: &str = "Session stopped successfully";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a check-in session.
///
/// A newtype wrapper around the string form of the id. New sessions get a
/// random UUID v4 via [`SessionId::generate`], but any non-blank string is
/// accepted from clients: a replica may be asked about a session that
/// another process started, so we never assume the id was minted here.
///
/// `#[serde(transparent)]` serializes this as the bare string, so
/// `SessionId("abc")` becomes `"abc"` in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Mints a fresh, random session id (UUID v4, hyphenated).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Validates a raw id taken from a path segment or query string.
    ///
    /// # Errors
    /// Returns [`ProtocolError::BlankId`] for an empty or whitespace id.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        if raw.trim().is_empty() {
            return Err(ProtocolError::BlankId("sessionId"));
        }
        Ok(Self(raw.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies the live event a session belongs to.
///
/// Only meaningful in event-scoped deployments, where several sessions are
/// grouped under one event and the event id is part of the store key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Validates a raw event id taken from a path segment.
    ///
    /// # Errors
    /// Returns [`ProtocolError::BlankId`] for an empty or whitespace id.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        if raw.trim().is_empty() {
            return Err(ProtocolError::BlankId("eventId"));
        }
        Ok(Self(raw.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST .../startSession`. The whole body is optional.
///
/// `duration` is the rotation period in seconds. When present, the server
/// rotates the session's code on its own every `duration` seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSessionRequest {
    #[serde(default)]
    pub duration: Option<u64>,
}

/// Query string of `GET /code?sessionId=...`.
///
/// The field is optional at the serde level so that a missing id can be
/// reported as a 400 with a clear message instead of a generic rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

impl CodeQuery {
    /// Extracts the session id, rejecting a missing or blank value.
    ///
    /// # Errors
    /// [`ProtocolError::MissingId`] if absent, [`ProtocolError::BlankId`]
    /// if blank.
    pub fn session_id(&self) -> Result<SessionId, ProtocolError> {
        let raw = self
            .session_id
            .as_deref()
            .ok_or(ProtocolError::MissingId("sessionId"))?;
        SessionId::parse(raw)
    }
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// Response of a successful start.
///
/// `duration` is echoed back only when the session rotates on a server
/// timer. `skip_serializing_if` keeps it out of the JSON otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResponse {
    pub session_id: SessionId,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

/// Response carrying a single code (rotate and read).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeResponse {
    pub code: String,
}

/// Response carrying a human-readable confirmation (stop).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    /// The confirmation returned after a session is stopped.
    pub fn stopped() -> Self {
        Self {
            message: STOPPED_MESSAGE.to_string(),
        }
    }
}

/// Body of every non-2xx response: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub active_sessions: usize,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
