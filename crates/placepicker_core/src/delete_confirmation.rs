//! Delete confirmation dialog surface.
//!
//! # Responsibility
//! - Pair one decision controller with one progress indicator.
//! - Expose the host operations `open`, `close`, `confirm`, `cancel`, `poll`.
//!
//! # Invariants
//! - Both parts are configured from one `DecisionConfig.duration_ms`.
//! - Every exit path (confirm, cancel, expiry, close, drop) releases both the
//!   deadline timer and the refresh timer.
//! - The two parts keep separate timers; they agree only on the duration.

use crate::clock::TimerQueue;
use crate::config::DecisionConfig;
use crate::confirmation::{ConfirmationController, ConfirmationState, DecisionHandler};
use crate::model::place::PlaceId;
use crate::progress::{ProgressIndicator, ProgressSnapshot};

#[derive(Debug)]
pub struct DeleteConfirmation {
    controller: ConfirmationController,
    progress: ProgressIndicator,
}

impl DeleteConfirmation {
    pub fn new(timers: TimerQueue, config: &DecisionConfig) -> Self {
        Self {
            controller: ConfirmationController::from_config(timers.clone(), config),
            progress: ProgressIndicator::from_config(timers, config),
        }
    }

    /// Opens (or re-opens) the dialog for `target`, restarting both timers.
    pub fn open(&mut self, target: PlaceId) {
        self.controller.start(target);
        self.progress.activate(self.controller.duration_ms());
    }

    /// Closes the dialog without a decision.
    pub fn close(&mut self) -> bool {
        self.progress.dispose();
        self.controller.dispose()
    }

    pub fn confirm(&mut self, handler: &mut impl DecisionHandler) -> bool {
        self.progress.dispose();
        self.controller.confirm(handler)
    }

    pub fn cancel(&mut self, handler: &mut impl DecisionHandler) -> bool {
        self.progress.dispose();
        self.controller.cancel(handler)
    }

    /// Drives both timers. Returns the progress to display while the dialog
    /// stays open, or `None` once it is closed (including by expiry in this
    /// call).
    pub fn poll(&mut self, handler: &mut impl DecisionHandler) -> Option<ProgressSnapshot> {
        let snapshot = self.progress.poll();
        if self.controller.poll(handler) || !self.controller.is_pending() {
            self.progress.dispose();
            return None;
        }
        snapshot
    }

    pub fn is_open(&self) -> bool {
        self.controller.is_pending()
    }

    pub fn target(&self) -> Option<&PlaceId> {
        self.controller.pending_target()
    }

    pub fn state(&self) -> ConfirmationState {
        self.controller.state()
    }

    pub fn progress(&self) -> Option<ProgressSnapshot> {
        self.progress.snapshot()
    }
}
