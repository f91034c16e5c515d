//! Error types for the protocol layer.
//!
//! Each crate in Checkgate defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in the shape of the client's
//! input, not in the store or the session state machine.

/// Errors that can occur while reading identifiers from request input.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A required identifier was absent from the request.
    ///
    /// The payload names the missing field, e.g. `"sessionId"`.
    #[error("{0} is required")]
    MissingId(&'static str),

    /// An identifier was present but blank (empty or whitespace only).
    #[error("{0} must not be blank")]
    BlankId(&'static str),
}
