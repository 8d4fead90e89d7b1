//! Retune Scheduler
//!
//! Poll-driven progression of the head of the retune queue. The driving loop
//! calls [`RetuneScheduler::step`] repeatedly; each call does at most one unit
//! of work on the oldest pending retune.

use super::alarm::{RetuneTimer, Ticket};
use super::entry::{EntryState, RetuneEntry};
use super::queue::RetuneQueue;
use crate::error::RetuneError;
use crate::hal::{BandSelector, RfFrontend, Synthesizer, TimeTamer};

/// Result of one scheduler step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Queue is empty
    Idle,
    /// Head entry was handed to the timer with this ticket
    Scheduled(Ticket),
    /// Head entry is waiting for its timer
    Waiting,
    /// Head entry was applied and retired
    Applied(RetuneEntry),
    /// Head entry failed in hardware and was retired anyway
    Failed(RetuneEntry, RetuneError),
}

#[cfg(feature = "embedded")]
impl defmt::Format for StepOutcome {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "Idle"),
            Self::Scheduled(t) => defmt::write!(f, "Scheduled({})", t),
            Self::Waiting => defmt::write!(f, "Waiting"),
            Self::Applied(e) => defmt::write!(f, "Applied({})", e),
            Self::Failed(e, err) => defmt::write!(f, "Failed({}, {})", e, err),
        }
    }
}

/// Failure counters for errors that never reach a response packet
///
/// Only counted in builds with debug assertions; release builds read zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct Diagnostics {
    #[cfg(debug_assertions)]
    error_count: u32,
}

impl Diagnostics {
    /// Create with all counters at zero
    #[must_use]
    pub const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            error_count: 0,
        }
    }

    /// Record a failure
    pub fn record(&mut self, err: RetuneError) {
        warn!("retune error: {}", err);
        #[cfg(debug_assertions)]
        {
            self.error_count = self.error_count.wrapping_add(1);
        }
    }

    /// Number of failures recorded
    #[cfg(debug_assertions)]
    #[must_use]
    pub const fn error_count(&self) -> u32 {
        self.error_count
    }

    /// Number of failures recorded
    #[cfg(not(debug_assertions))]
    #[must_use]
    pub const fn error_count(&self) -> u32 {
        0
    }

    /// Zero all counters
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

/// Drives queued retunes through `New -> Scheduled -> Ready -> applied`
#[derive(Clone, Debug, Default)]
pub struct RetuneScheduler {
    next_ticket: Ticket,
    diagnostics: Diagnostics,
}

impl RetuneScheduler {
    /// Create a scheduler
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_ticket: Ticket::new(0),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Failure counters
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Clear the failure counters
    ///
    /// The ticket sequence keeps running so that alarms armed before a queue
    /// reset are recognised as stale.
    pub fn reset(&mut self) {
        self.diagnostics.clear();
    }

    /// Advance the head of the queue by one step
    ///
    /// Timer events that arrived since the last call are consumed first.
    /// A ready head is applied to hardware and removed whether or not the
    /// hardware succeeds; failures only show up in [`Self::diagnostics`].
    pub fn step<const N: usize, S, B, C, T>(
        &mut self,
        queue: &mut RetuneQueue<N>,
        frontend: &mut RfFrontend<S, B, C>,
        timer: &mut T,
    ) -> StepOutcome
    where
        S: Synthesizer,
        B: BandSelector,
        C: TimeTamer,
        T: RetuneTimer,
    {
        self.collect_timer_events(queue, timer);

        let Some(entry) = queue.peek_head() else {
            return StepOutcome::Idle;
        };

        match entry.state() {
            EntryState::New => {
                let ticket = self.next_ticket;
                if let Err(e) = entry.schedule(ticket) {
                    self.diagnostics.record(e);
                    return StepOutcome::Waiting;
                }
                self.next_ticket = ticket.next();
                timer.arm(entry.module(), entry.timestamp(), ticket);
                debug!(
                    "retune {} armed for {} ({})",
                    entry.module(),
                    entry.timestamp(),
                    ticket
                );
                StepOutcome::Scheduled(ticket)
            }
            EntryState::Scheduled(_) => StepOutcome::Waiting,
            EntryState::Ready(_) => {
                let module = entry.module();
                let result = frontend.apply(module, entry.freq_mut());

                let retired = match queue.remove() {
                    Ok(retired) => retired,
                    Err(e) => {
                        self.diagnostics.record(e);
                        return StepOutcome::Idle;
                    }
                };

                match result {
                    Ok(()) => {
                        trace!("retune {} applied", module);
                        StepOutcome::Applied(retired)
                    }
                    Err(e) => {
                        self.diagnostics.record(e);
                        StepOutcome::Failed(retired, e)
                    }
                }
            }
        }
    }

    fn collect_timer_events<const N: usize, T: RetuneTimer>(
        &mut self,
        queue: &mut RetuneQueue<N>,
        timer: &mut T,
    ) {
        while let Some(ticket) = timer.fired() {
            let Some(entry) = queue.peek_head() else {
                debug!("timer {} fired with no pending retune", ticket);
                continue;
            };

            match entry.mark_ready(ticket) {
                Ok(true) => trace!("retune {} ready", ticket),
                Ok(false) => debug!("stale timer {} ignored", ticket),
                Err(e) => self.diagnostics.record(e),
            }
        }
    }
}
