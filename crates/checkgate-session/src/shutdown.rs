//! Process-exit cleanup.
//!
//! When the server is asked to stop, every session it started still has a
//! code sitting in the store. The coordinator cancels all rotation timers
//! and deletes those codes so that nothing outlives the process.

use checkgate_store::KeyValueStore;

use crate::SessionLifecycleManager;

/// Outcome of a shutdown pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Sessions whose code was deleted.
    pub cleaned: usize,
    /// Sessions whose delete failed. Their codes may remain in the store.
    pub failed: usize,
}

impl ShutdownReport {
    pub fn total(&self) -> usize {
        self.cleaned + self.failed
    }
}

/// Tears down every active session of a [`SessionLifecycleManager`].
pub struct ShutdownCoordinator<S> {
    manager: SessionLifecycleManager<S>,
}

impl<S: KeyValueStore> ShutdownCoordinator<S> {
    pub fn new(manager: SessionLifecycleManager<S>) -> Self {
        Self { manager }
    }

    /// Cancels all timers, empties the registry and deletes every code.
    ///
    /// Never fails: a delete that errors is logged and counted in
    /// [`ShutdownReport::failed`]. Safe to run more than once; later runs
    /// find nothing to do.
    pub async fn run(&self) -> ShutdownReport {
        tracing::info!(
            sessions = self.manager.active_sessions(),
            "cleaning up active sessions"
        );

        let (cleaned, failed) = self.manager.drain().await;
        let report = ShutdownReport { cleaned, failed };

        if failed > 0 {
            tracing::warn!(cleaned, failed, "shutdown cleanup incomplete");
        } else {
            tracing::info!(cleaned, "shutdown cleanup complete");
        }
        report
    }
}
