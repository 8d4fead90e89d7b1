//! Error types
//!
//! Every failure in the retune path is recovered locally into response flags
//! or a diagnostic counter; these types only travel between internal layers.

use core::fmt;

/// Failure reported by a hardware primitive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HardwareError {
    /// Register or pin access failed
    Bus,
    /// Synthesizer did not settle on a usable configuration
    Tuning,
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => f.write_str("bus access failed"),
            Self::Tuning => f.write_str("synthesizer failed to tune"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for HardwareError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Bus => defmt::write!(f, "Bus"),
            Self::Tuning => defmt::write!(f, "Tuning"),
        }
    }
}

/// Retune scheduler error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetuneError {
    /// Deferred insert rejected, queue at capacity
    QueueFull,
    /// Remove attempted on an empty queue
    QueueEmpty,
    /// Request targets neither the RX nor the TX module
    InvalidModule,
    /// Synthesizer primitive failed
    HardwareTune(HardwareError),
    /// Band select primitive failed
    HardwareBandSelect(HardwareError),
    /// Timer event arrived for an entry that was not waiting on it
    UnexpectedState,
    /// Packet does not carry the retune magic byte
    BadMagic(u8),
}

impl fmt::Display for RetuneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => f.write_str("retune queue full"),
            Self::QueueEmpty => f.write_str("retune queue empty"),
            Self::InvalidModule => f.write_str("invalid module"),
            Self::HardwareTune(e) => write!(f, "tuning failed: {e}"),
            Self::HardwareBandSelect(e) => write!(f, "band select failed: {e}"),
            Self::UnexpectedState => f.write_str("unexpected entry state"),
            Self::BadMagic(m) => write!(f, "bad packet magic 0x{m:02x}"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for RetuneError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::QueueFull => defmt::write!(f, "QueueFull"),
            Self::QueueEmpty => defmt::write!(f, "QueueEmpty"),
            Self::InvalidModule => defmt::write!(f, "InvalidModule"),
            Self::HardwareTune(e) => defmt::write!(f, "HardwareTune({})", e),
            Self::HardwareBandSelect(e) => defmt::write!(f, "HardwareBandSelect({})", e),
            Self::UnexpectedState => defmt::write!(f, "UnexpectedState"),
            Self::BadMagic(m) => defmt::write!(f, "BadMagic(0x{:02x})", m),
        }
    }
}
