//! Cancellable rotation task.
//!
//! A [`RotationTimer`] is the handle to one spawned task that waits on a
//! [`RotationSchedule`] and runs a callback every period. The handle lives
//! in the session's registry entry; stopping the session calls
//! [`RotationTimer::cancel`], and dropping the handle has the same effect.

use std::future::Future;
use std::ops::ControlFlow;

use tokio::sync::watch;

use crate::{RotationSchedule, RotationTick};

/// Read side of a timer's cancellation flag.
///
/// Handed to every callback invocation. A callback that has to wait (for
/// example on a per-session lock) should re-check [`is_cancelled`] once it
/// gets through, because the timer may have been cancelled while it
/// waited.
///
/// [`is_cancelled`]: CancelSignal::is_cancelled
#[derive(Debug, Clone)]
pub struct CancelSignal(watch::Receiver<bool>);

impl CancelSignal {
    /// `true` once the owning [`RotationTimer`] was cancelled or dropped.
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow() || self.0.has_changed().is_err()
    }
}

/// Handle to a running rotation task.
#[derive(Debug)]
pub struct RotationTimer {
    cancel: watch::Sender<bool>,
}

impl RotationTimer {
    /// Spawns a task that calls `on_tick` every time `schedule` fires.
    ///
    /// The callback returns [`ControlFlow::Break`] to end the task on its
    /// own (e.g. the session vanished). The task also ends as soon as the
    /// timer is cancelled. Must be called from within a Tokio runtime.
    pub fn spawn<F, Fut>(mut schedule: RotationSchedule, mut on_tick: F) -> Self
    where
        F: FnMut(RotationTick, CancelSignal) -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let (cancel, mut cancelled) = watch::channel(false);
        let signal = CancelSignal(cancelled.clone());

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    // Cancellation wins over a tick that is due at the same time.
                    biased;
                    // A change means cancel; an error means the handle was dropped.
                    _ = cancelled.changed() => break,
                    tick = schedule.wait_for_tick() => {
                        if signal.is_cancelled() {
                            break;
                        }
                        let flow = on_tick(tick, signal.clone()).await;
                        schedule.record_tick_end();
                        if flow.is_break() {
                            break;
                        }
                    }
                }
            }
            let metrics = schedule.metrics();
            tracing::debug!(
                rotations = metrics.total_ticks,
                overruns = metrics.total_overruns,
                skipped = metrics.total_skipped,
                max_rotation_ms = metrics.max_rotation_time.as_millis() as u64,
                "rotation timer finished"
            );
        });

        Self { cancel }
    }

    /// Cancels the timer. Synchronous and idempotent.
    ///
    /// No new rotation starts after this returns. A callback that is
    /// already running finishes; it can observe the cancellation through
    /// its [`CancelSignal`].
    pub fn cancel(&self) {
        // `send_replace` works even if the task already exited and dropped
        // its receiver.
        self.cancel.send_replace(true);
    }
}
