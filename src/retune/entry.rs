//! Retune Queue Entries
//!
//! One deferred retune and its progress toward the hardware.

use super::alarm::Ticket;
use crate::error::RetuneError;
use crate::types::{LmsFreq, Module};

/// Progress of a queued retune
///
/// Transitions only move forward: `New -> Scheduled -> Ready`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryState {
    /// Waiting to reach the head of the queue
    New,
    /// Timer armed, waiting for the ticket to fire
    Scheduled(Ticket),
    /// Timer fired, retune may be applied
    Ready(Ticket),
}

impl EntryState {
    /// Ticket armed for this entry, if any
    #[must_use]
    pub const fn ticket(self) -> Option<Ticket> {
        match self {
            Self::New => None,
            Self::Scheduled(t) | Self::Ready(t) => Some(t),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for EntryState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::New => defmt::write!(f, "New"),
            Self::Scheduled(t) => defmt::write!(f, "Scheduled({})", t),
            Self::Ready(t) => defmt::write!(f, "Ready({})", t),
        }
    }
}

/// A deferred retune request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetuneEntry {
    state: EntryState,
    module: Module,
    freq: LmsFreq,
    timestamp: u64,
}

impl RetuneEntry {
    /// Create a new entry in the `New` state
    #[must_use]
    pub const fn new(freq: LmsFreq, module: Module, timestamp: u64) -> Self {
        Self {
            state: EntryState::New,
            module,
            freq,
            timestamp,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> EntryState {
        self.state
    }

    /// Target module
    #[must_use]
    pub const fn module(&self) -> Module {
        self.module
    }

    /// Frequency settings
    #[must_use]
    pub const fn freq(&self) -> &LmsFreq {
        &self.freq
    }

    /// Frequency settings, for the tuning primitive to record its result
    pub fn freq_mut(&mut self) -> &mut LmsFreq {
        &mut self.freq
    }

    /// Timestamp at which the retune should take effect
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// `New -> Scheduled`
    ///
    /// # Errors
    /// `UnexpectedState` if the entry has already been scheduled.
    pub fn schedule(&mut self, ticket: Ticket) -> Result<(), RetuneError> {
        match self.state {
            EntryState::New => {
                self.state = EntryState::Scheduled(ticket);
                Ok(())
            }
            EntryState::Scheduled(_) | EntryState::Ready(_) => Err(RetuneError::UnexpectedState),
        }
    }

    /// `Scheduled -> Ready` when `ticket` is the one this entry is waiting on
    ///
    /// Returns `Ok(false)` for tickets that belong to some other (retired)
    /// entry; those are left for the caller to discard.
    ///
    /// # Errors
    /// `UnexpectedState` if the entry's own ticket fires again after it is ready.
    pub fn mark_ready(&mut self, ticket: Ticket) -> Result<bool, RetuneError> {
        match self.state {
            EntryState::Scheduled(t) if t == ticket => {
                self.state = EntryState::Ready(t);
                Ok(true)
            }
            EntryState::Ready(t) if t == ticket => Err(RetuneError::UnexpectedState),
            _ => Ok(false),
        }
    }

    /// Check if the timer for this entry has fired
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.state, EntryState::Ready(_))
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for RetuneEntry {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Retune({}, @{}, {})",
            self.module,
            self.timestamp,
            self.state
        );
    }
}
