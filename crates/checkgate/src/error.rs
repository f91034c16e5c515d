//! Unified error type for Checkgate.

use checkgate_protocol::ProtocolError;
use checkgate_session::SessionError;
use checkgate_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `checkgate` crate, you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CheckgateError {
    /// A malformed identifier or request body.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The key-value store failed (connect, read, write, timeout).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A session lifecycle operation failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Binding or serving the HTTP listener failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
