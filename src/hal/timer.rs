//! Timer Abstractions
//!
//! Embassy-backed timestamp counter and retune alarm. The alarm task stands in
//! for the timer interrupt: it sleeps until each armed timestamp and reports
//! the ticket on the timer event channel.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::{Instant, Timer};
use static_cell::StaticCell;

use crate::config::ALARM_REQUEST_DEPTH;
use crate::hal::TimeTamer;
use crate::retune::alarm::{
    AlarmArm, SpscAlarm, Ticket, TimerEventProducer, TimerEvents,
};
use crate::types::Module;

/// Timestamp counter reading the embassy time driver
///
/// Both modules share one counter.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyTimeTamer;

impl TimeTamer for EmbassyTimeTamer {
    fn timestamp(&mut self, _module: Module) -> u64 {
        Instant::now().as_ticks()
    }
}

impl defmt::Format for EmbassyTimeTamer {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "EmbassyTimeTamer({})", Instant::now().as_ticks());
    }
}

/// One armed alarm
#[derive(Clone, Copy, Debug)]
pub struct AlarmRequest {
    /// Module whose counter the timestamp refers to
    pub module: Module,
    /// Tick at which to fire
    pub at: u64,
    /// Ticket to report
    pub ticket: Ticket,
}

impl defmt::Format for AlarmRequest {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Alarm({} @{} {})", self.module, self.at, self.ticket);
    }
}

/// Channel carrying alarm requests to [`alarm_task`]
pub type AlarmChannel = Channel<CriticalSectionRawMutex, AlarmRequest, ALARM_REQUEST_DEPTH>;

/// Sending end of the alarm request channel
pub type AlarmSender<'a> = Sender<'a, CriticalSectionRawMutex, AlarmRequest, ALARM_REQUEST_DEPTH>;

/// Receiving end of the alarm request channel
pub type AlarmReceiver<'a> = Receiver<'a, CriticalSectionRawMutex, AlarmRequest, ALARM_REQUEST_DEPTH>;

/// [`AlarmArm`] that hands requests to [`alarm_task`]
pub struct EmbassyAlarm<'a> {
    requests: AlarmSender<'a>,
}

impl<'a> EmbassyAlarm<'a> {
    /// Create from the request channel's sender
    #[must_use]
    pub const fn new(requests: AlarmSender<'a>) -> Self {
        Self { requests }
    }
}

impl AlarmArm for EmbassyAlarm<'_> {
    fn arm(&mut self, module: Module, at: u64, ticket: Ticket) {
        let request = AlarmRequest { module, at, ticket };
        if self.requests.try_send(request).is_err() {
            // The head retune stalls until the queue is reset
            error!("alarm channel full, {} dropped", request);
        }
    }
}

/// Sleep until each requested timestamp and report its ticket
///
/// Spawn from the board crate's executor. Requests are served in order, which
/// matches the queue: only the head retune is ever armed.
pub async fn alarm_task(requests: AlarmReceiver<'_>, mut events: TimerEventProducer<'_>) -> ! {
    loop {
        let request = requests.receive().await;
        Timer::at(Instant::from_ticks(request.at)).await;

        if events.enqueue(request.ticket).is_err() {
            warn!("timer event channel full, {} lost", request.ticket);
        } else {
            trace!("alarm {} fired", request.ticket);
        }
    }
}

/// Static storage for the alarm channels
pub struct AlarmResources {
    requests: AlarmChannel,
    events: TimerEvents,
}

impl AlarmResources {
    /// Create empty channels
    #[must_use]
    pub const fn new() -> Self {
        Self {
            requests: Channel::new(),
            events: TimerEvents::new(),
        }
    }
}

impl Default for AlarmResources {
    fn default() -> Self {
        Self::new()
    }
}

/// Place the alarm channels in static memory and split them
///
/// Returns the timer for the scheduler step plus the two ends that
/// [`alarm_task`] needs.
pub fn init_alarm(
    cell: &'static StaticCell<AlarmResources>,
) -> (
    SpscAlarm<'static, EmbassyAlarm<'static>>,
    AlarmReceiver<'static>,
    TimerEventProducer<'static>,
) {
    let resources = cell.init(AlarmResources::new());
    let (producer, consumer) = resources.events.split();
    let alarm = EmbassyAlarm::new(resources.requests.sender());

    (
        SpscAlarm::new(alarm, consumer),
        resources.requests.receiver(),
        producer,
    )
}
