//! Shared types used across the retune firmware
//!
//! This module defines domain-specific types that enforce invariants
//! at compile time and provide type safety throughout the codebase.

use core::fmt;

use crate::config::{NFRAC_MAX, NINT_MAX, SIX_BIT_MASK, VCOCAP_UNKNOWN};
use crate::error::RetuneError;

/// RF path targeted by a retune
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Module {
    /// Receive path
    Rx,
    /// Transmit path
    Tx,
}

impl Module {
    /// Raw module identifier (`0` = RX, `1` = TX)
    #[must_use]
    pub const fn as_raw(self) -> u8 {
        match self {
            Self::Rx => 0,
            Self::Tx => 1,
        }
    }

    /// Parse a raw module identifier, returns None for anything but RX or TX
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Rx),
            1 => Some(Self::Tx),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Module {
    type Error = RetuneError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::from_raw(raw).ok_or(RetuneError::InvalidModule)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rx => f.write_str("RX"),
            Self::Tx => f.write_str("TX"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Module {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Rx => defmt::write!(f, "RX"),
            Self::Tx => defmt::write!(f, "TX"),
        }
    }
}

/// Tuning configuration flags carried by a frequency setting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FreqFlags(u8);

impl FreqFlags {
    /// No flags set (high band, tuning algorithm enabled)
    pub const NONE: Self = Self(0);

    /// Configure PLL output buffers and band switch for the low band
    pub const LOW_BAND: Self = Self(1 << 0);

    /// Use the `vcocap` value as-is rather than as a starting hint
    pub const FORCE_VCOCAP: Self = Self(1 << 1);

    /// Build the flag set from request options
    #[must_use]
    pub const fn from_request(low_band: bool, quick_tune: bool) -> Self {
        let mut bits = 0;
        if low_band {
            bits |= Self::LOW_BAND.0;
        }
        if quick_tune {
            bits |= Self::FORCE_VCOCAP.0;
        }
        Self(bits)
    }

    /// Raw flag bits
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check whether all bits of `other` are set
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check the low band flag
    #[must_use]
    pub const fn low_band(self) -> bool {
        self.contains(Self::LOW_BAND)
    }

    /// Check the force-precomputed-capacitance flag
    #[must_use]
    pub const fn force_vcocap(self) -> bool {
        self.contains(Self::FORCE_VCOCAP)
    }
}

impl core::ops::BitOr for FreqFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for FreqFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "{}{}",
            if self.low_band() { "LB" } else { "HB" },
            if self.force_vcocap() { "+QT" } else { "" }
        );
    }
}

/// Precalculated synthesizer settings for one retune
///
/// The divider fields are produced on the host; the firmware only copies them
/// into the PLL. `vcocap_result` is written back by the tuning primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LmsFreq {
    /// Integer portion of the LO divider (9 bits)
    pub nint: u16,
    /// Fractional portion of the LO divider (23 bits)
    pub nfrac: u32,
    /// Choice of VCO and division ratio (6 bits)
    pub freqsel: u8,
    /// Capacitance hint (6 bits)
    pub vcocap: u8,
    /// Capacitance chosen by the last tuning attempt, or [`VCOCAP_UNKNOWN`]
    pub vcocap_result: u8,
    /// Tuning configuration
    pub flags: FreqFlags,
}

impl LmsFreq {
    /// Create a frequency setting, masking each field to its width
    ///
    /// `vcocap_result` starts out as [`VCOCAP_UNKNOWN`].
    #[must_use]
    pub const fn new(nint: u16, nfrac: u32, freqsel: u8, vcocap: u8, flags: FreqFlags) -> Self {
        Self {
            nint: nint & NINT_MAX,
            nfrac: nfrac & NFRAC_MAX,
            freqsel: freqsel & SIX_BIT_MASK,
            vcocap: vcocap & SIX_BIT_MASK,
            vcocap_result: VCOCAP_UNKNOWN,
            flags,
        }
    }

    /// Check whether the tuning primitive has reported a capacitance value
    #[must_use]
    pub const fn has_result(&self) -> bool {
        self.vcocap_result != VCOCAP_UNKNOWN
    }

    /// Check if this retune targets the low band
    #[must_use]
    pub const fn low_band(&self) -> bool {
        self.flags.low_band()
    }
}

impl Default for LmsFreq {
    fn default() -> Self {
        Self::new(0, 0, 0, 0, FreqFlags::NONE)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for LmsFreq {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "LmsFreq(nint={}, nfrac={}, freqsel=0x{:02x}, vcocap={}, {})",
            self.nint,
            self.nfrac,
            self.freqsel,
            self.vcocap,
            self.flags
        );
    }
}

/// When a retune should take effect
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetuneTime {
    /// Apply immediately, bypassing the queue
    Now,
    /// Apply when the module's timestamp counter reaches this value
    At(u64),
}

impl RetuneTime {
    /// Interpret a raw wire timestamp
    #[must_use]
    pub const fn from_timestamp(timestamp: u64) -> Self {
        if timestamp == crate::config::RETUNE_NOW {
            Self::Now
        } else {
            Self::At(timestamp)
        }
    }

    /// Raw wire timestamp
    #[must_use]
    pub const fn as_timestamp(self) -> u64 {
        match self {
            Self::Now => crate::config::RETUNE_NOW,
            Self::At(ts) => ts,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for RetuneTime {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Now => defmt::write!(f, "now"),
            Self::At(ts) => defmt::write!(f, "@{}", ts),
        }
    }
}

/// RF band routed by the band switch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RfBand {
    /// Low band path
    Low,
    /// High band path
    High,
}

impl RfBand {
    /// Band for a low-band flag
    #[must_use]
    pub const fn from_low_band(low_band: bool) -> Self {
        if low_band {
            Self::Low
        } else {
            Self::High
        }
    }

    /// Check if this is the low band
    #[must_use]
    pub const fn is_low(self) -> bool {
        matches!(self, Self::Low)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for RfBand {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Low => defmt::write!(f, "LOW"),
            Self::High => defmt::write!(f, "HIGH"),
        }
    }
}
