//! Time-remaining indicator.
//!
//! # Responsibility
//! - Deplete a value from full to empty over a fixed duration.
//! - Refresh on a fine-grained interval timer it owns itself.
//!
//! # Invariants
//! - The rendered value is derived from elapsed wall-clock time, not from the
//!   number of refresh ticks observed.
//! - Within one cycle `remaining_ms` never increases and is exactly 0 once
//!   `elapsed >= duration`.
//! - Re-activation restarts from full; disposal releases the interval timer.

use crate::clock::{TimerGuard, TimerPoll, TimerQueue, Timestamp};
use crate::config::DecisionConfig;
use log::debug;

/// Point-in-time view of the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub remaining_ms: u64,
    pub duration_ms: u64,
}

impl ProgressSnapshot {
    /// Remaining share in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        self.remaining_ms as f64 / self.duration_ms as f64
    }

    /// Remaining share in `[0, 100]`.
    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }

    pub fn is_depleted(&self) -> bool {
        self.remaining_ms == 0
    }

    /// Fixed-width text bar, e.g. `[######....]  60%`.
    pub fn render_bar(&self, width: usize) -> String {
        let filled = ((self.fraction() * width as f64).ceil() as usize).min(width);
        format!(
            "[{}{}] {:>3.0}%",
            "#".repeat(filled),
            ".".repeat(width - filled),
            self.percent()
        )
    }
}

#[derive(Debug)]
struct DepletionCycle {
    duration_ms: u64,
    started_at: Timestamp,
    remaining_ms: u64,
    refresh: Option<TimerGuard>,
}

impl DepletionCycle {
    fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            remaining_ms: self.remaining_ms,
            duration_ms: self.duration_ms,
        }
    }
}

/// Depleting indicator driven by its own refresh timer.
#[derive(Debug)]
pub struct ProgressIndicator {
    timers: TimerQueue,
    refresh_interval_ms: u64,
    cycle: Option<DepletionCycle>,
}

impl ProgressIndicator {
    pub fn new(timers: TimerQueue, refresh_interval_ms: u64) -> Self {
        Self {
            timers,
            refresh_interval_ms: refresh_interval_ms.max(1),
            cycle: None,
        }
    }

    pub fn from_config(timers: TimerQueue, config: &DecisionConfig) -> Self {
        Self::new(timers, config.refresh_interval_ms)
    }

    /// Starts a fresh cycle at 100%, discarding any running one.
    pub fn activate(&mut self, duration_ms: u64) {
        self.cycle = None;

        let refresh = (duration_ms > 0).then(|| self.timers.arm_every(self.refresh_interval_ms));
        self.cycle = Some(DepletionCycle {
            duration_ms,
            started_at: self.timers.now(),
            remaining_ms: duration_ms,
            refresh,
        });
        debug!("event=progress_start module=progress status=ok duration_ms={duration_ms}");
    }

    /// Advances the displayed value if a refresh is due.
    ///
    /// Returns `None` when no cycle is active.
    pub fn poll(&mut self) -> Option<ProgressSnapshot> {
        let now = self.timers.now();
        let cycle = self.cycle.as_mut()?;
        let elapsed = now.saturating_sub(cycle.started_at);

        if elapsed >= cycle.duration_ms {
            cycle.remaining_ms = 0;
            if cycle.refresh.take().is_some() {
                debug!("event=progress_depleted module=progress status=ok");
            }
        } else if let Some(refresh) = cycle.refresh.as_mut() {
            if let TimerPoll::Fired { .. } = refresh.poll() {
                cycle.remaining_ms = cycle.remaining_ms.min(cycle.duration_ms - elapsed);
            }
        }

        Some(cycle.snapshot())
    }

    /// Last displayed value without advancing.
    pub fn snapshot(&self) -> Option<ProgressSnapshot> {
        self.cycle.as_ref().map(DepletionCycle::snapshot)
    }

    /// Whether the refresh timer is still armed.
    pub fn is_running(&self) -> bool {
        self.cycle
            .as_ref()
            .is_some_and(|cycle| cycle.refresh.is_some())
    }

    /// Stops refreshing and forgets the cycle.
    pub fn dispose(&mut self) {
        if self.cycle.take().is_some() {
            debug!("event=progress_dispose module=progress status=ok");
        }
    }
}
