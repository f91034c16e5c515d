//! Error types for the session layer.

use checkgate_protocol::{ProtocolError, SessionId};
use checkgate_store::StoreError;

/// Errors that can occur during session lifecycle operations.
///
/// Three kinds reach callers: not found (404), invalid request (400) and
/// internal (500). [`status_code`](Self::status_code) is the mapping.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session is not active in this process: it was never started
    /// here, it was stopped, or it belongs to a different event.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// No code is stored for the session. Never-created and expired
    /// sessions look the same from the store, so they share this error.
    #[error("code not found or session expired for {0}")]
    CodeNotFound(SessionId),

    /// The request is missing an identifier the deployment mode needs.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The store failed or timed out.
    ///
    /// `#[from]` lets `?` turn a `StoreError` into this variant.
    #[error("store failure: {0}")]
    Internal(#[from] StoreError),

    /// A session with this id is already registered.
    /// Ids are freshly generated, so this signals a bug, not a user error.
    #[error("session {0} is already registered")]
    AlreadyRegistered(SessionId),

    /// The task running the operation was cancelled before it finished,
    /// which only happens while the runtime shuts down.
    #[error("session operation interrupted")]
    Interrupted,
}

impl SessionError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::CodeNotFound(_) => 404,
            Self::InvalidRequest(_) => 400,
            Self::Internal(_) | Self::AlreadyRegistered(_) | Self::Interrupted => 500,
        }
    }

    /// The message shown to HTTP clients.
    ///
    /// Internal details (store addresses, timeouts) stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::NotFound(_) => "Session not found".to_string(),
            Self::CodeNotFound(_) => "Code not found or session expired".to_string(),
            Self::InvalidRequest(msg) => msg.clone(),
            Self::Internal(_) | Self::AlreadyRegistered(_) | Self::Interrupted => {
                "Internal server error".to_string()
            }
        }
    }
}

impl From<ProtocolError> for SessionError {
    fn from(err: ProtocolError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid() -> SessionId {
        SessionId::parse("S1").unwrap()
    }

    #[test]
    fn test_status_code_not_found_kinds_are_404() {
        assert_eq!(SessionError::NotFound(sid()).status_code(), 404);
        assert_eq!(SessionError::CodeNotFound(sid()).status_code(), 404);
    }

    #[test]
    fn test_status_code_store_failure_is_500() {
        let err = SessionError::from(StoreError::Unavailable("down".into()));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.public_message(), "Internal server error");
        assert!(err.to_string().contains("down"));
    }

    #[test]
    fn test_status_code_interrupted_is_500() {
        assert_eq!(SessionError::Interrupted.status_code(), 500);
        assert_eq!(SessionError::Interrupted.public_message(), "Internal server error");
    }

    #[test]
    fn test_from_protocol_error_is_invalid_request() {
        let err = SessionError::from(ProtocolError::MissingId("sessionId"));
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.public_message(), "sessionId is required");
    }

    #[test]
    fn test_public_messages_match_http_contract() {
        assert_eq!(
            SessionError::NotFound(sid()).public_message(),
            "Session not found"
        );
        assert_eq!(
            SessionError::CodeNotFound(sid()).public_message(),
            "Code not found or session expired"
        );
    }
}
