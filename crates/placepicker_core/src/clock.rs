//! Time source and cooperative timer queue.
//!
//! # Responsibility
//! - Provide a monotonic millisecond clock that tests can advance by hand.
//! - Track armed timers so every arm has exactly one matching disarm.
//!
//! # Invariants
//! - Dropping a `TimerGuard` disarms its timer.
//! - A one-shot timer fires at most once, then disarms itself.
//! - Handles are single-threaded (`Rc`); timer callbacks run only when the
//!   owner polls, never concurrently.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;
use std::time::Instant;

/// Milliseconds since the owning clock's origin.
pub type Timestamp = u64;

/// Stable identifier of one armed timer inside a `TimerQueue`.
pub type TimerId = u64;

/// Monotonic millisecond time source.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock source backed by `Instant`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Hand-driven clock for deterministic tests and replay.
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the code under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Timestamp>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(at: Timestamp) -> Self {
        Self {
            now: Rc::new(Cell::new(at)),
        }
    }

    /// Moves time forward by `delta_ms`.
    pub fn advance(&self, delta_ms: u64) {
        self.now.set(self.now.get().saturating_add(delta_ms));
    }

    /// Jumps to `at`; earlier instants are ignored to keep the clock monotonic.
    pub fn set(&self, at: Timestamp) {
        self.now.set(self.now.get().max(at));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Once,
    Every { period_ms: u64 },
}

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    kind: TimerKind,
    due: Timestamp,
}

#[derive(Debug, Default)]
struct TimerTable {
    next_id: TimerId,
    entries: BTreeMap<TimerId, TimerEntry>,
}

/// Shared handle to the set of armed timers bound to one clock.
#[derive(Clone)]
pub struct TimerQueue {
    clock: Rc<dyn Clock>,
    table: Rc<RefCell<TimerTable>>,
}

impl Debug for TimerQueue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now", &self.now())
            .field("armed", &self.armed_count())
            .finish()
    }
}

impl TimerQueue {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            table: Rc::new(RefCell::new(TimerTable::default())),
        }
    }

    /// Queue driven by the real monotonic clock.
    pub fn system() -> Self {
        Self::new(Rc::new(SystemClock::new()))
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Arms a timer that fires once, `delay_ms` from now.
    pub fn arm_once(&self, delay_ms: u64) -> TimerGuard {
        self.arm(TimerKind::Once, delay_ms)
    }

    /// Arms a recurring timer with the given period. A zero period is
    /// clamped to 1 ms.
    pub fn arm_every(&self, period_ms: u64) -> TimerGuard {
        let period_ms = period_ms.max(1);
        self.arm(TimerKind::Every { period_ms }, period_ms)
    }

    /// Number of timers currently armed.
    pub fn armed_count(&self) -> usize {
        self.table.borrow().entries.len()
    }

    /// Earliest due instant among armed timers, used by hosts to sleep.
    pub fn next_due(&self) -> Option<Timestamp> {
        self.table
            .borrow()
            .entries
            .values()
            .map(|entry| entry.due)
            .min()
    }

    fn arm(&self, kind: TimerKind, delay_ms: u64) -> TimerGuard {
        let due = self.now().saturating_add(delay_ms);
        let mut table = self.table.borrow_mut();
        let id = table.next_id;
        table.next_id += 1;
        table.entries.insert(id, TimerEntry { kind, due });

        TimerGuard {
            id,
            first_due: due,
            queue: self.clone(),
        }
    }
}

/// Result of polling one timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPoll {
    /// Armed and not yet due.
    Pending,
    /// Due; `ticks` counts elapsed periods (always 1 for one-shot timers).
    Fired { ticks: u64 },
    /// No longer armed (one-shot already fired).
    Disarmed,
}

/// Scoped ownership of one armed timer; dropping it disarms the timer.
pub struct TimerGuard {
    id: TimerId,
    first_due: Timestamp,
    queue: TimerQueue,
}

impl Debug for TimerGuard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerGuard")
            .field("id", &self.id)
            .field("first_due", &self.first_due)
            .field("armed", &self.is_armed())
            .finish()
    }
}

impl TimerGuard {
    /// Instant the timer was first due when armed.
    pub fn first_due(&self) -> Timestamp {
        self.first_due
    }

    pub fn is_armed(&self) -> bool {
        self.queue.table.borrow().entries.contains_key(&self.id)
    }

    /// Checks the timer against the queue clock.
    ///
    /// One-shot timers disarm on firing. Recurring timers fold every missed
    /// period into one `Fired` and move to the next future period.
    pub fn poll(&mut self) -> TimerPoll {
        let now = self.queue.now();
        let mut table = self.queue.table.borrow_mut();
        let Some(entry) = table.entries.get_mut(&self.id) else {
            return TimerPoll::Disarmed;
        };
        if now < entry.due {
            return TimerPoll::Pending;
        }

        let kind = entry.kind;
        match kind {
            TimerKind::Once => {
                table.entries.remove(&self.id);
                TimerPoll::Fired { ticks: 1 }
            }
            TimerKind::Every { period_ms } => {
                let ticks = (now - entry.due) / period_ms + 1;
                entry.due = entry.due.saturating_add(ticks.saturating_mul(period_ms));
                TimerPoll::Fired { ticks }
            }
        }
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        if let Ok(mut table) = self.queue.table.try_borrow_mut() {
            table.entries.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock, TimerPoll, TimerQueue};
    use std::rc::Rc;

    fn queue() -> (ManualClock, TimerQueue) {
        let clock = ManualClock::new();
        let queue = TimerQueue::new(Rc::new(clock.clone()));
        (clock, queue)
    }

    #[test]
    fn manual_clock_never_moves_backwards() {
        let clock = ManualClock::starting_at(100);
        clock.set(50);
        assert_eq!(clock.now(), 100);
        clock.advance(25);
        assert_eq!(clock.now(), 125);
    }

    #[test]
    fn one_shot_fires_once_at_deadline() {
        let (clock, queue) = queue();
        let mut timer = queue.arm_once(100);
        assert_eq!(timer.first_due(), 100);

        clock.advance(99);
        assert_eq!(timer.poll(), TimerPoll::Pending);
        clock.advance(1);
        assert_eq!(timer.poll(), TimerPoll::Fired { ticks: 1 });
        assert_eq!(timer.poll(), TimerPoll::Disarmed);
        assert_eq!(queue.armed_count(), 0);
    }

    #[test]
    fn dropping_guard_disarms_timer() {
        let (_clock, queue) = queue();
        let timer = queue.arm_once(10);
        let other = queue.arm_every(5);
        assert_eq!(queue.armed_count(), 2);
        assert_eq!(queue.next_due(), Some(5));

        drop(other);
        assert_eq!(queue.armed_count(), 1);
        assert_eq!(queue.next_due(), Some(10));
        drop(timer);
        assert_eq!(queue.armed_count(), 0);
        assert_eq!(queue.next_due(), None);
    }

    #[test]
    fn recurring_timer_folds_missed_periods() {
        let (clock, queue) = queue();
        let mut timer = queue.arm_every(10);

        clock.advance(35);
        assert_eq!(timer.poll(), TimerPoll::Fired { ticks: 3 });
        assert_eq!(timer.poll(), TimerPoll::Pending);
        assert_eq!(queue.next_due(), Some(40));
        assert!(timer.is_armed());
    }

    #[test]
    fn zero_period_is_clamped() {
        let (clock, queue) = queue();
        let mut timer = queue.arm_every(0);
        clock.advance(1);
        assert_eq!(timer.poll(), TimerPoll::Fired { ticks: 1 });
    }
}
