//! Check-in session management for Checkgate.
//!
//! This crate owns the lifecycle of a check-in session and its rotating
//! access code:
//!
//! 1. **Code generation**: producing fresh codes ([`CodeGenerator`])
//! 2. **Session tracking**: knowing which sessions this process started
//!    ([`SessionRegistry`])
//! 3. **Lifecycle**: start, rotate, read and stop, with timer-driven
//!    rotation where configured ([`SessionLifecycleManager`])
//! 4. **Teardown**: removing every live code when the process exits
//!    ([`ShutdownCoordinator`])
//!
//! # How it fits in the stack
//!
//! ```text
//! HTTP layer (above)  ← maps requests to lifecycle operations
//!     ↕
//! Session layer (this crate)  ← state machine, registry, timers
//!     ↕
//! Store layer (below)  ← where the current code actually lives
//! ```

mod code;
mod error;
mod manager;
mod registry;
mod session;
mod shutdown;

pub use code::{CodeFormat, CodeGenerator};
pub use error::SessionError;
pub use manager::{SessionLifecycleManager, StartOptions, StartedSession};
pub use registry::SessionRegistry;
pub use session::{KeyStrategy, Session, SessionConfig};
pub use shutdown::{ShutdownCoordinator, ShutdownReport};
