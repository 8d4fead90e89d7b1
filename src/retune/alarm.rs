//! Timer Events
//!
//! The only asynchronous actor in the retune path is the timer that reports a
//! scheduled retune as due. It never touches the queue: it pushes the armed
//! [`Ticket`] into a single-producer/single-consumer channel, and the
//! scheduler step is the sole consumer.

use heapless::spsc::{Consumer, Producer, Queue};

use crate::config::TIMER_EVENT_DEPTH;
use crate::types::Module;

/// Identifies one armed timer request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Ticket(u32);

impl Ticket {
    /// Create from a raw sequence number
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw sequence number
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Following ticket (wraps)
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Ticket {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "#{}", self.0);
    }
}

/// Timer event channel storage
pub type TimerEvents = Queue<Ticket, TIMER_EVENT_DEPTH>;

/// Sending half, owned by the alarm/interrupt context
pub type TimerEventProducer<'a> = Producer<'a, Ticket, TIMER_EVENT_DEPTH>;

/// Receiving half, read by the scheduler step
pub type TimerEventConsumer<'a> = Consumer<'a, Ticket, TIMER_EVENT_DEPTH>;

/// Hardware seam for arming a timestamp alarm
pub trait AlarmArm {
    /// Arrange for `ticket` to be pushed to the timer event channel once the
    /// module's timestamp counter reaches `at`
    ///
    /// A timestamp already in the past should fire as soon as possible.
    fn arm(&mut self, module: Module, at: u64, ticket: Ticket);
}

impl<F> AlarmArm for F
where
    F: FnMut(Module, u64, Ticket),
{
    fn arm(&mut self, module: Module, at: u64, ticket: Ticket) {
        self(module, at, ticket);
    }
}

/// Timer as seen by the scheduler step
pub trait RetuneTimer {
    /// Request that `ticket` be reported once `at` is reached
    fn arm(&mut self, module: Module, at: u64, ticket: Ticket);

    /// Next ticket whose alarm has fired
    fn fired(&mut self) -> Option<Ticket>;
}

impl<T: RetuneTimer + ?Sized> RetuneTimer for &mut T {
    fn arm(&mut self, module: Module, at: u64, ticket: Ticket) {
        (**self).arm(module, at, ticket);
    }

    fn fired(&mut self) -> Option<Ticket> {
        (**self).fired()
    }
}

/// [`RetuneTimer`] built from an alarm and the consuming end of the event channel
pub struct SpscAlarm<'a, A> {
    alarm: A,
    events: TimerEventConsumer<'a>,
}

impl<'a, A: AlarmArm> SpscAlarm<'a, A> {
    /// Combine an alarm with the channel its firings arrive on
    #[must_use]
    pub fn new(alarm: A, events: TimerEventConsumer<'a>) -> Self {
        Self { alarm, events }
    }

    /// Number of fired tickets not yet consumed
    #[must_use]
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    /// Underlying alarm
    pub fn alarm_mut(&mut self) -> &mut A {
        &mut self.alarm
    }
}

impl<A: AlarmArm> RetuneTimer for SpscAlarm<'_, A> {
    fn arm(&mut self, module: Module, at: u64, ticket: Ticket) {
        self.alarm.arm(module, at, ticket);
    }

    fn fired(&mut self) -> Option<Ticket> {
        self.events.dequeue()
    }
}
