//! Fixed-period rotation scheduler for Checkgate.
//!
//! Sessions started with a rotation period get their code replaced by the
//! server every period. This crate provides the two pieces that make that
//! happen:
//!
//! - [`RotationSchedule`]: decides *when* the next rotation is due, with
//!   first-fire jitter and overrun detection.
//! - [`RotationTimer`]: a spawned task driving a schedule, owned by the
//!   session's registry entry and cancelled explicitly on stop/shutdown.
//!
//! # Integration
//!
//! ```ignore
//! let schedule = RotationSchedule::new(RotationConfig::every(period));
//! let timer = RotationTimer::spawn(schedule, move |tick, signal| {
//!     let manager = manager.clone();
//!     async move {
//!         manager.rotate_on_timer(&id, &signal).await;
//!         ControlFlow::Continue(())
//!     }
//! });
//! // later, synchronously:
//! timer.cancel();
//! ```

mod timer;

pub use timer::{CancelSignal, RotationTimer};

use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Full configuration for a rotation schedule.
#[derive(Debug, Clone)]
pub struct RotationConfig {
    /// Time between rotations.
    pub period: Duration,
    /// Random jitter (0–max) added to the *first* rotation only, so that
    /// sessions started in the same instant don't hit the store together.
    pub initial_jitter: Duration,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(30),
            initial_jitter: Duration::from_millis(100),
        }
    }
}

impl RotationConfig {
    /// Shortest supported period.
    pub const MIN_PERIOD: Duration = Duration::from_secs(1);
    /// Longest supported period.
    pub const MAX_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);
    /// A rotation whose own work takes at least this share of the period
    /// is logged as slow.
    pub const SLOW_ROTATION_SHARE: f64 = 0.5;

    /// Create a config for a specific period with sensible defaults.
    pub fn every(period: Duration) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    /// Clamp any out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`RotationSchedule::new`]. `period` is
    /// clamped to [`Self::MIN_PERIOD`]..=[`Self::MAX_PERIOD`].
    pub fn validated(mut self) -> Self {
        if self.period < Self::MIN_PERIOD || self.period > Self::MAX_PERIOD {
            let clamped = self.period.clamp(Self::MIN_PERIOD, Self::MAX_PERIOD);
            warn!(
                requested_ms = self.period.as_millis() as u64,
                clamped_ms = clamped.as_millis() as u64,
                "rotation period out of range, clamping"
            );
            self.period = clamped;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info (returned to caller each rotation)
// ---------------------------------------------------------------------------

/// Information about a due rotation, returned by
/// [`RotationSchedule::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct RotationTick {
    /// Monotonically increasing rotation number (starts at 1).
    pub tick: u64,
    /// `true` if this rotation fired late.
    pub overrun: bool,
    /// How many whole periods were skipped due to the overrun.
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Runtime counters for one schedule.
#[derive(Debug, Clone, Default)]
pub struct RotationMetrics {
    /// Rotations fired.
    pub total_ticks: u64,
    /// Rotations that fired late.
    pub total_overruns: u64,
    /// Whole periods skipped because of overruns.
    pub total_skipped: u64,
    /// Longest rotation work observed (as reported by `record_tick_end`).
    pub max_rotation_time: Duration,
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Fixed-period schedule for one session's rotations.
pub struct RotationSchedule {
    config: RotationConfig,
    tick_count: u64,
    /// When the next rotation should fire (Tokio instant for `sleep_until`).
    next_tick: TokioInstant,
    /// Wall-clock instant when the last rotation's work started.
    /// Set by `wait_for_tick`, consumed by `record_tick_end`.
    tick_start: Option<Instant>,
    metrics: RotationMetrics,
}

impl RotationSchedule {
    /// Create a new schedule from config.
    ///
    /// The first rotation is due one period from now, plus jitter.
    pub fn new(config: RotationConfig) -> Self {
        let config = config.validated();

        let jitter = if config.initial_jitter.is_zero() {
            Duration::ZERO
        } else {
            let max_us = config.initial_jitter.as_micros() as u64;
            Duration::from_micros(rand::rng().random_range(0..max_us.max(1)))
        };
        let next_tick = TokioInstant::now() + config.period + jitter;

        debug!(
            period_ms = config.period.as_millis() as u64,
            jitter_ms = jitter.as_millis() as u64,
            "rotation schedule created"
        );

        Self {
            config,
            tick_count: 0,
            next_tick,
            tick_start: None,
            metrics: RotationMetrics::default(),
        }
    }

    /// Wait until the next rotation is due.
    pub async fn wait_for_tick(&mut self) -> RotationTick {
        let next = self.next_tick;
        let period = self.config.period;

        time::sleep_until(next).await;

        let now = TokioInstant::now();
        self.tick_count += 1;
        self.tick_start = Some(Instant::now());

        // More than 10% of a period late counts as an overrun. Missed
        // rotations are skipped, never replayed in a burst: the next one is
        // due a full period from now.
        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > period / 10;
        let ticks_skipped = if overrun {
            (late_by.as_nanos() / period.as_nanos()) as u64
        } else {
            0
        };
        self.next_tick = now + period;

        if overrun {
            self.metrics.total_overruns += 1;
        }
        self.metrics.total_skipped += ticks_skipped;
        self.metrics.total_ticks += 1;

        trace!(tick = self.tick_count, overrun, "rotation due");

        RotationTick {
            tick: self.tick_count,
            overrun,
            ticks_skipped,
        }
    }

    /// Record that the work for the current rotation has finished.
    ///
    /// Feeds `max_rotation_time` and logs a warning for slow rotations.
    pub fn record_tick_end(&mut self) {
        let Some(start) = self.tick_start.take() else {
            return;
        };
        let elapsed = start.elapsed();

        if elapsed > self.metrics.max_rotation_time {
            self.metrics.max_rotation_time = elapsed;
        }

        let utilization = elapsed.as_secs_f64() / self.config.period.as_secs_f64();
        if utilization >= RotationConfig::SLOW_ROTATION_SHARE {
            warn!(
                tick = self.tick_count,
                elapsed_ms = elapsed.as_millis() as u64,
                period_ms = self.config.period.as_millis() as u64,
                "rotation took a large share of its period"
            );
        }
    }

    /// Snapshot of current metrics.
    pub fn metrics(&self) -> &RotationMetrics {
        &self.metrics
    }
}
