//! Timed decision controller.
//!
//! # Responsibility
//! - Own the lifetime of one pending decision and its deadline timer.
//! - Resolve every activation with exactly one outcome, or dispose it silently.
//!
//! # Invariants
//! - At most one `PendingDeletion` (and so at most one deadline timer) exists.
//! - The deadline timer is disarmed before any callback runs.
//! - Re-arming, cancel, confirm, expiry and disposal all release the timer.
//!
//! State machine: `Idle -> Pending -> {Confirmed, Cancelled} -> Idle`.
//! Starting while pending silently disposes the previous decision first.

use crate::clock::{TimerGuard, TimerPoll, TimerQueue, Timestamp};
use crate::config::DecisionConfig;
use crate::model::place::PlaceId;
use log::{debug, info, warn};

/// Host callbacks for resolved decisions.
pub trait DecisionHandler {
    fn confirmed(&mut self, target: &PlaceId);
    fn cancelled(&mut self, target: &PlaceId);
}

/// Observable controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationState {
    Idle,
    Pending {
        target: PlaceId,
        deadline: Timestamp,
    },
}

#[derive(Debug)]
struct PendingDeletion {
    target: PlaceId,
    deadline: Timestamp,
    timer: TimerGuard,
}

impl PendingDeletion {
    /// Disarms the deadline timer and hands back the target.
    fn release(self) -> PlaceId {
        let Self { target, timer, .. } = self;
        drop(timer);
        target
    }
}

/// Single-decision controller with automatic expiry.
#[derive(Debug)]
pub struct ConfirmationController {
    timers: TimerQueue,
    duration_ms: u64,
    pending: Option<PendingDeletion>,
}

impl ConfirmationController {
    pub fn new(timers: TimerQueue, duration_ms: u64) -> Self {
        Self {
            timers,
            duration_ms,
            pending: None,
        }
    }

    pub fn from_config(timers: TimerQueue, config: &DecisionConfig) -> Self {
        Self::new(timers, config.duration_ms)
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn state(&self) -> ConfirmationState {
        match &self.pending {
            Some(pending) => ConfirmationState::Pending {
                target: pending.target.clone(),
                deadline: pending.deadline,
            },
            None => ConfirmationState::Idle,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Target of the pending decision, if any.
    pub fn pending_target(&self) -> Option<&PlaceId> {
        self.pending.as_ref().map(|pending| &pending.target)
    }

    /// Milliseconds left before automatic confirmation.
    pub fn remaining_ms(&self) -> Option<u64> {
        self.pending
            .as_ref()
            .map(|pending| pending.deadline.saturating_sub(self.timers.now()))
    }

    /// Arms a new decision for `target`, disposing any pending one first.
    pub fn start(&mut self, target: PlaceId) {
        if let Some(previous) = self.pending.take() {
            let previous = previous.release();
            debug!(
                "event=confirmation_superseded module=confirmation status=ok target={previous}"
            );
        }

        let timer = self.timers.arm_once(self.duration_ms);
        let deadline = timer.first_due();
        info!(
            "event=confirmation_start module=confirmation status=pending target={} duration_ms={}",
            target, self.duration_ms
        );
        self.pending = Some(PendingDeletion {
            target,
            deadline,
            timer,
        });
    }

    /// Restarts the countdown for `target`; same guarantees as `start`.
    pub fn reset(&mut self, target: PlaceId) {
        self.start(target);
    }

    /// Cancels the pending decision. No-op when idle.
    pub fn cancel(&mut self, handler: &mut impl DecisionHandler) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        let target = pending.release();
        info!("event=confirmation_resolve module=confirmation status=cancelled target={target}");
        handler.cancelled(&target);
        true
    }

    /// Confirms immediately; the deadline timer is disarmed first so expiry
    /// cannot fire a second confirmation.
    pub fn confirm(&mut self, handler: &mut impl DecisionHandler) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        let target = pending.release();
        info!(
            "event=confirmation_resolve module=confirmation status=confirmed trigger=manual target={target}"
        );
        handler.confirmed(&target);
        true
    }

    /// Fires the automatic confirmation once the deadline has passed.
    ///
    /// Returns `true` when this call resolved the decision.
    pub fn poll(&mut self, handler: &mut impl DecisionHandler) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };

        match pending.timer.poll() {
            TimerPoll::Pending => false,
            TimerPoll::Fired { .. } => {
                let Some(pending) = self.pending.take() else {
                    return false;
                };
                let target = pending.release();
                info!(
                    "event=confirmation_resolve module=confirmation status=confirmed trigger=expiry target={target}"
                );
                handler.confirmed(&target);
                true
            }
            TimerPoll::Disarmed => {
                if let Some(pending) = self.pending.take() {
                    warn!(
                        "event=confirmation_resolve module=confirmation status=dropped reason=timer_disarmed target={}",
                        pending.target
                    );
                }
                false
            }
        }
    }

    /// Tears down any pending decision without invoking callbacks.
    pub fn dispose(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        let target = pending.release();
        debug!("event=confirmation_dispose module=confirmation status=ok target={target}");
        true
    }
}

impl Drop for ConfirmationController {
    fn drop(&mut self) {
        self.dispose();
    }
}
