//! Retune Scheduling
//!
//! Immediate and timestamped frequency changes for the RF front end.
//!
//! ```text
//!   request ──► dispatch ──┬── now ──► RfFrontend (blocking, timed)
//!                          └── at(ts) ──► RetuneQueue
//!                                             │ head only
//!   poll loop ──► RetuneScheduler::step ◄─────┘
//!                     │   ▲
//!                  arm│   │Ticket (spsc)
//!                     ▼   │
//!                  alarm / timer interrupt
//! ```

pub mod alarm;
pub mod dispatch;
pub mod entry;
pub mod queue;
pub mod scheduler;
