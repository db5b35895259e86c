use placepicker_core::{
    ConfirmationController, ConfirmationState, DecisionHandler, ManualClock, PlaceId, TimerQueue,
};
use std::rc::Rc;

#[derive(Debug, Default)]
struct Recorder {
    confirmed: Vec<PlaceId>,
    cancelled: Vec<PlaceId>,
}

impl DecisionHandler for Recorder {
    fn confirmed(&mut self, target: &PlaceId) {
        self.confirmed.push(target.clone());
    }

    fn cancelled(&mut self, target: &PlaceId) {
        self.cancelled.push(target.clone());
    }
}

fn setup(duration_ms: u64) -> (ManualClock, TimerQueue, ConfirmationController) {
    let clock = ManualClock::new();
    let timers = TimerQueue::new(Rc::new(clock.clone()));
    let controller = ConfirmationController::new(timers.clone(), duration_ms);
    (clock, timers, controller)
}

#[test]
fn auto_confirms_exactly_at_deadline() {
    let (clock, timers, mut controller) = setup(3_000);
    let mut recorder = Recorder::default();
    controller.start(PlaceId::from(42));

    clock.advance(2_999);
    assert!(!controller.poll(&mut recorder));
    assert!(recorder.confirmed.is_empty());

    clock.advance(2);
    assert!(controller.poll(&mut recorder));
    assert_eq!(recorder.confirmed, vec![PlaceId::from(42)]);
    assert_eq!(controller.state(), ConfirmationState::Idle);
    assert_eq!(timers.armed_count(), 0);

    clock.advance(10_000);
    assert!(!controller.poll(&mut recorder));
    assert_eq!(recorder.confirmed.len(), 1);
    assert!(recorder.cancelled.is_empty());
}

#[test]
fn cancel_before_deadline_prevents_confirmation() {
    let (clock, timers, mut controller) = setup(3_000);
    let mut recorder = Recorder::default();
    controller.start(PlaceId::from(7));

    clock.advance(1_500);
    assert!(controller.cancel(&mut recorder));
    assert_eq!(timers.armed_count(), 0);

    clock.advance(5_000);
    assert!(!controller.poll(&mut recorder));
    assert!(recorder.confirmed.is_empty());
    assert_eq!(recorder.cancelled, vec![PlaceId::from(7)]);

    assert!(!controller.cancel(&mut recorder));
    assert_eq!(recorder.cancelled.len(), 1);
}

#[test]
fn manual_confirm_prevents_second_confirmation_by_expiry() {
    let (clock, timers, mut controller) = setup(3_000);
    let mut recorder = Recorder::default();
    controller.start(PlaceId::from(5));

    clock.advance(1_000);
    assert!(controller.confirm(&mut recorder));
    assert_eq!(timers.armed_count(), 0);

    clock.advance(3_000);
    assert!(!controller.poll(&mut recorder));
    assert!(!controller.confirm(&mut recorder));
    assert_eq!(recorder.confirmed, vec![PlaceId::from(5)]);
}

#[test]
fn restart_supersedes_previous_target_without_callbacks() {
    let (clock, timers, mut controller) = setup(3_000);
    let mut recorder = Recorder::default();

    controller.start(PlaceId::from(1));
    clock.advance(2_000);
    controller.start(PlaceId::from(2));
    assert_eq!(timers.armed_count(), 1);
    assert_eq!(controller.pending_target(), Some(&PlaceId::from(2)));

    // The first deadline (t=3000) passes without firing.
    clock.advance(1_500);
    assert!(!controller.poll(&mut recorder));
    assert!(recorder.confirmed.is_empty());
    assert!(recorder.cancelled.is_empty());

    clock.advance(1_500);
    assert!(controller.poll(&mut recorder));
    assert_eq!(recorder.confirmed, vec![PlaceId::from(2)]);
}

#[test]
fn at_most_one_deadline_timer_across_many_starts() {
    let (clock, timers, mut controller) = setup(300);
    let mut recorder = Recorder::default();

    for step in 0..50u64 {
        controller.reset(PlaceId::from(step));
        assert_eq!(timers.armed_count(), 1);
        clock.advance(step % 7 * 50);
        controller.poll(&mut recorder);
        assert!(timers.armed_count() <= 1);
    }
}

#[test]
fn dispose_leaves_nothing_scheduled() {
    let (clock, timers, mut controller) = setup(3_000);
    let mut recorder = Recorder::default();
    controller.start(PlaceId::from(11));

    assert!(controller.dispose());
    assert_eq!(timers.armed_count(), 0);
    assert_eq!(timers.next_due(), None);

    clock.advance(4_000);
    assert!(!controller.poll(&mut recorder));
    assert!(recorder.confirmed.is_empty());
    assert!(recorder.cancelled.is_empty());
}
