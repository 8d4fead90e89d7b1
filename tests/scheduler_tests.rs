//! Retune Scheduler Tests
//!
//! Head-of-queue progression through the timer and onto the hardware.

mod common;

use common::{frontend, MockFrontend, MockTimer};
use retune_firmware::config::RETUNE_QUEUE_CAPACITY;
use retune_firmware::error::{HardwareError, RetuneError};
use retune_firmware::retune::alarm::Ticket;
use retune_firmware::retune::entry::EntryState;
use retune_firmware::retune::queue::RetuneQueue;
use retune_firmware::retune::scheduler::{RetuneScheduler, StepOutcome};
use retune_firmware::types::{FreqFlags, LmsFreq, Module};

fn freq(nint: u16) -> LmsFreq {
    LmsFreq::new(nint, 0x1234, 0x2c, 20, FreqFlags::NONE)
}

/// Errors are only counted in debug builds
fn expected_errors(n: u32) -> u32 {
    if cfg!(debug_assertions) {
        n
    } else {
        0
    }
}

struct Rig {
    queue: RetuneQueue<8>,
    frontend: MockFrontend,
    timer: MockTimer,
    scheduler: RetuneScheduler,
}

impl Rig {
    fn new() -> Self {
        Self {
            queue: RetuneQueue::new(),
            frontend: frontend(),
            timer: MockTimer::default(),
            scheduler: RetuneScheduler::new(),
        }
    }

    fn step(&mut self) -> StepOutcome {
        self.scheduler
            .step(&mut self.queue, &mut self.frontend, &mut self.timer)
    }

    fn errors(&self) -> u32 {
        self.scheduler.diagnostics().error_count()
    }
}

// ============================================================================
// Basic Progression
// ============================================================================

#[test]
fn test_empty_queue_is_idle() {
    let mut rig = Rig::new();
    assert_eq!(rig.step(), StepOutcome::Idle);
    assert!(rig.timer.armed.is_empty());
    assert!(rig.frontend.synth.calls.is_empty());
}

#[test]
fn test_new_head_is_armed_with_its_timestamp() {
    let mut rig = Rig::new();
    rig.queue.insert(freq(100), Module::Tx, 5_000).unwrap();

    let outcome = rig.step();
    let StepOutcome::Scheduled(ticket) = outcome else {
        panic!("expected Scheduled, got {outcome:?}");
    };

    assert_eq!(rig.timer.armed, vec![(Module::Tx, 5_000, ticket)]);
    assert_eq!(
        rig.queue.head().map(|e| e.state()),
        Some(EntryState::Scheduled(ticket))
    );
}

#[test]
fn test_scheduled_head_waits_without_rearming() {
    let mut rig = Rig::new();
    rig.queue.insert(freq(100), Module::Rx, 5_000).unwrap();
    rig.step();

    for _ in 0..5 {
        assert_eq!(rig.step(), StepOutcome::Waiting);
    }
    assert_eq!(rig.timer.armed.len(), 1);
    assert!(rig.frontend.synth.calls.is_empty());
    assert_eq!(rig.queue.len(), 1);
}

#[test]
fn test_fired_head_is_applied_and_removed() {
    let mut rig = Rig::new();
    rig.queue.insert(freq(100), Module::Rx, 5_000).unwrap();
    rig.step();
    rig.timer.fire_last();

    let StepOutcome::Applied(entry) = rig.step() else {
        panic!("expected Applied");
    };

    assert_eq!(entry.module(), Module::Rx);
    assert_eq!(entry.freq().nint, 100);
    assert_eq!(entry.timestamp(), 5_000);
    assert!(entry.is_ready());
    // Tuning result written back into the retired entry
    assert_eq!(entry.freq().vcocap_result, 0x1c);

    assert!(rig.queue.is_empty());
    assert_eq!(rig.frontend.synth.calls.len(), 1);
    assert_eq!(rig.frontend.bands.calls, vec![(Module::Rx, false)]);
    assert_eq!(rig.step(), StepOutcome::Idle);
}

#[test]
fn test_low_band_entry_selects_low_band() {
    let mut rig = Rig::new();
    let f = LmsFreq::new(50, 0, 0x3f, 0, FreqFlags::LOW_BAND);
    rig.queue.insert(f, Module::Tx, 10).unwrap();
    rig.step();
    rig.timer.fire_last();
    rig.step();

    assert_eq!(rig.frontend.bands.calls, vec![(Module::Tx, true)]);
}

#[test]
fn test_timer_event_consumed_on_same_step_as_apply() {
    let mut rig = Rig::new();
    rig.queue.insert(freq(1), Module::Rx, 1).unwrap();
    rig.step();
    rig.timer.fire_last();

    assert!(matches!(rig.step(), StepOutcome::Applied(_)));
    assert!(rig.timer.fired.is_empty());
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_only_head_is_ever_armed() {
    let mut rig = Rig::new();
    for i in 0..3 {
        rig.queue.insert(freq(i), Module::Rx, 1_000 + u64::from(i)).unwrap();
    }

    rig.step();
    rig.step();
    assert_eq!(rig.timer.armed.len(), 1);
    assert!(rig
        .queue
        .iter()
        .skip(1)
        .all(|e| e.state() == EntryState::New));
}

#[test]
fn test_entries_applied_in_submission_order() {
    let mut rig = Rig::new();
    let stamps = [3_000u64, 1_000, 2_000];
    for (i, ts) in stamps.iter().enumerate() {
        rig.queue.insert(freq(i as u16), Module::Tx, *ts).unwrap();
    }

    let mut applied = Vec::new();
    while !rig.queue.is_empty() {
        match rig.step() {
            StepOutcome::Scheduled(_) => {
                rig.timer.fire_last();
            }
            StepOutcome::Applied(e) => applied.push((e.freq().nint, e.timestamp())),
            other => panic!("unexpected {other:?}"),
        }
    }

    // Out-of-order timestamps are not reordered
    assert_eq!(applied, vec![(0, 3_000), (1, 1_000), (2, 2_000)]);
}

#[test]
fn test_full_queue_drains_in_submission_order() {
    let mut queue: RetuneQueue = RetuneQueue::new();
    let mut frontend = frontend();
    let mut timer = MockTimer::default();
    let mut scheduler = RetuneScheduler::new();

    for i in 0..RETUNE_QUEUE_CAPACITY {
        let module = if i % 2 == 0 { Module::Rx } else { Module::Tx };
        queue
            .insert(freq(i as u16), module, 10_000 + i as u64)
            .unwrap();
    }

    let mut order = Vec::new();
    let mut steps = 0;
    while !queue.is_empty() {
        steps += 1;
        assert!(steps < 4 * RETUNE_QUEUE_CAPACITY, "scheduler stalled");
        match scheduler.step(&mut queue, &mut frontend, &mut timer) {
            StepOutcome::Scheduled(_) => {
                timer.fire_last();
            }
            StepOutcome::Applied(e) => order.push(e.freq().nint),
            other => panic!("unexpected {other:?}"),
        }
    }

    let expected: Vec<u16> = (0..RETUNE_QUEUE_CAPACITY as u16).collect();
    assert_eq!(order, expected);
    assert_eq!(frontend.synth.calls.len(), RETUNE_QUEUE_CAPACITY);
    assert_eq!(timer.armed.len(), RETUNE_QUEUE_CAPACITY);
    assert_eq!(queue.cursors(), (0, 0));
}

#[test]
fn test_tickets_are_unique_per_entry() {
    let mut rig = Rig::new();
    for i in 0..4 {
        rig.queue.insert(freq(i), Module::Rx, 1).unwrap();
    }
    while !rig.queue.is_empty() {
        if let StepOutcome::Scheduled(_) = rig.step() {
            rig.timer.fire_last();
        }
    }

    let mut tickets: Vec<_> = rig.timer.armed.iter().map(|(_, _, t)| t.raw()).collect();
    tickets.dedup();
    assert_eq!(tickets.len(), 4);
}

// ============================================================================
// Hardware Failures
// ============================================================================

#[test]
fn test_tune_failure_still_retires_entry() {
    let mut rig = Rig::new();
    rig.frontend.synth.fail = true;
    rig.queue.insert(freq(7), Module::Rx, 1).unwrap();
    rig.queue.insert(freq(8), Module::Rx, 2).unwrap();
    rig.step();
    rig.timer.fire_last();

    let outcome = rig.step();
    let StepOutcome::Failed(entry, err) = outcome else {
        panic!("expected Failed, got {outcome:?}");
    };
    assert_eq!(entry.freq().nint, 7);
    assert_eq!(err, RetuneError::HardwareTune(HardwareError::Tuning));

    // Band select skipped after a tuning failure
    assert!(rig.frontend.bands.calls.is_empty());
    assert_eq!(rig.queue.len(), 1);
    assert_eq!(rig.errors(), expected_errors(1));

    // The next entry proceeds normally
    assert!(matches!(rig.step(), StepOutcome::Scheduled(_)));
}

#[test]
fn test_band_select_failure_still_retires_entry() {
    let mut rig = Rig::new();
    rig.frontend.bands.fail = true;
    rig.queue.insert(freq(7), Module::Tx, 1).unwrap();
    rig.step();
    rig.timer.fire_last();

    let outcome = rig.step();
    assert!(matches!(
        outcome,
        StepOutcome::Failed(_, RetuneError::HardwareBandSelect(HardwareError::Bus))
    ));
    assert_eq!(rig.frontend.synth.calls.len(), 1);
    assert!(rig.queue.is_empty());
    assert_eq!(rig.errors(), expected_errors(1));
}

#[test]
fn test_reset_clears_error_count() {
    let mut rig = Rig::new();
    rig.frontend.synth.fail = true;
    rig.queue.insert(freq(7), Module::Tx, 1).unwrap();
    rig.step();
    rig.timer.fire_last();
    rig.step();
    assert_eq!(rig.errors(), expected_errors(1));

    rig.scheduler.reset();
    assert_eq!(rig.errors(), 0);
}

// ============================================================================
// Timer Events
// ============================================================================

#[test]
fn test_stale_ticket_is_ignored() {
    let mut rig = Rig::new();
    rig.queue.insert(freq(1), Module::Rx, 1).unwrap();
    rig.step();

    rig.timer.fire(Ticket::new(999));
    assert_eq!(rig.step(), StepOutcome::Waiting);
    assert_eq!(rig.errors(), 0);
    assert!(rig.frontend.synth.calls.is_empty());
}

#[test]
fn test_ticket_with_empty_queue_is_dropped() {
    let mut rig = Rig::new();
    rig.timer.fire(Ticket::new(3));
    assert_eq!(rig.step(), StepOutcome::Idle);
    assert!(rig.timer.fired.is_empty());
    assert_eq!(rig.errors(), 0);
}

#[test]
fn test_ticket_before_schedule_does_not_ready_entry() {
    let mut rig = Rig::new();
    rig.queue.insert(freq(1), Module::Rx, 1).unwrap();

    // First ticket the scheduler will hand out, delivered early
    rig.timer.fire(Ticket::new(0));
    assert!(matches!(rig.step(), StepOutcome::Scheduled(_)));
    assert_eq!(rig.step(), StepOutcome::Waiting);
}

#[test]
fn test_duplicate_ticket_is_counted() {
    let mut rig = Rig::new();
    rig.queue.insert(freq(1), Module::Rx, 1).unwrap();
    let StepOutcome::Scheduled(ticket) = rig.step() else {
        panic!("expected Scheduled");
    };

    rig.timer.fire(ticket);
    rig.timer.fire(ticket);

    assert!(matches!(rig.step(), StepOutcome::Applied(_)));
    assert_eq!(rig.errors(), expected_errors(1));
}

#[test]
fn test_old_ticket_after_queue_reset_is_stale() {
    let mut rig = Rig::new();
    rig.queue.insert(freq(1), Module::Rx, 1_000).unwrap();
    let StepOutcome::Scheduled(old) = rig.step() else {
        panic!("expected Scheduled");
    };

    rig.queue.reset();
    rig.scheduler.reset();
    rig.queue.insert(freq(2), Module::Rx, 2_000).unwrap();
    let StepOutcome::Scheduled(new) = rig.step() else {
        panic!("expected Scheduled");
    };
    assert_ne!(old, new);

    rig.timer.fire(old);
    assert_eq!(rig.step(), StepOutcome::Waiting);

    rig.timer.fire(new);
    let StepOutcome::Applied(entry) = rig.step() else {
        panic!("expected Applied");
    };
    assert_eq!(entry.freq().nint, 2);
}
