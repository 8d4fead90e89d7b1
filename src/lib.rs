//! RF Retune Scheduler Firmware Library
//!
//! This library implements the firmware side of RF transceiver retuning:
//! a host asks for a synthesizer frequency change either *now*, blocking
//! until the hardware confirms, or at a *future hardware timestamp*, in which
//! case the request is queued and applied exactly once, in order, when the
//! timestamp arrives.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    REQUEST LAYER                             │
//! │  Packet codec (protocol)  │  Dispatch (retune::dispatch)     │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   SCHEDULING LAYER                           │
//! │  RetuneQueue  │  RetuneScheduler::step  │  Timer events      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   HAL / DRIVER LAYER                         │
//! │  Synthesizer  │  BandSelector  │  TimeTamer  │  Alarm        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    RTOS / SCHEDULER                          │
//! │        cooperative poll loop + embassy-time alarm task       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **No allocation**: the deferred queue is a fixed power-of-two ring buffer
//! - **Single writer**: only the poll loop touches the queue; the timer reports
//!   through an SPSC channel
//! - **No unsafe in application code**
//! - **Always answer the host**: failures become response flags, never panics

#![cfg_attr(all(feature = "embedded", not(test)), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[macro_use]
mod fmt;

// Re-export dependencies needed by board crates (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_sync;
#[cfg(feature = "embedded")]
pub use embassy_time;
#[cfg(feature = "embedded")]
pub use static_cell;

/// Hardware Abstraction Layer
///
/// Traits for the synthesizer, band switch, and timestamp counter.
pub mod hal;

/// Peripheral Drivers
///
/// Implementations of the HAL traits over `embedded-hal`.
pub mod drivers;

/// Retune Scheduling
///
/// Deferred queue, scheduler step, and request dispatch.
pub mod retune;

/// Communication Protocols
///
/// Retune request/response packet codec.
pub mod protocol;

/// Error types
pub mod error;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::error::{HardwareError, RetuneError};
    pub use crate::hal::{BandSelector, RfFrontend, Synthesizer, TimeTamer};
    pub use crate::protocol::{ResponseFlags, RetuneRequest, RetuneResponse};
    pub use crate::retune::alarm::{AlarmArm, RetuneTimer, SpscAlarm, Ticket, TimerEvents};
    pub use crate::retune::dispatch::{dispatch, handle_packet};
    pub use crate::retune::entry::{EntryState, RetuneEntry};
    pub use crate::retune::queue::RetuneQueue;
    pub use crate::retune::scheduler::{RetuneScheduler, StepOutcome};
    pub use crate::types::*;

    // Common traits
    pub use embedded_hal::digital::OutputPin;

    // Embassy
    #[cfg(feature = "embedded")]
    pub use crate::hal::timer::{alarm_task, init_alarm, EmbassyAlarm, EmbassyTimeTamer};
    #[cfg(feature = "embedded")]
    pub use embassy_time::{Duration, Instant, Timer};

    // Logging
    #[cfg(feature = "embedded")]
    pub use defmt::{debug, error, info, trace, warn};
}
