//! Hardware Abstraction Layer
//!
//! Traits for the hardware primitives the retune core drives. Board crates
//! implement them over their synthesizer, band switch and timestamp counter;
//! the embedded build ships an embassy-backed clock and alarm in `timer`.

use crate::error::{HardwareError, RetuneError};
use crate::types::{LmsFreq, Module};

#[cfg(feature = "embedded")]
pub mod timer;

/// RF synthesizer programming
pub trait Synthesizer {
    /// Program the module's PLL with precalculated dividers
    ///
    /// On success the implementation may record the capacitance it settled on
    /// in `freq.vcocap_result`.
    fn set_precalculated_frequency(
        &mut self,
        module: Module,
        freq: &mut LmsFreq,
    ) -> Result<(), HardwareError>;
}

/// Low/high band RF path selection
pub trait BandSelector {
    /// Route the module through the low band (`true`) or high band (`false`)
    fn band_select(&mut self, module: Module, low_band: bool) -> Result<(), HardwareError>;
}

/// Hardware timestamp counter
///
/// Monotonically increasing ticks. Serves as the deferred-retune trigger clock
/// and as a stopwatch for immediate retunes.
pub trait TimeTamer {
    /// Current counter value for the module
    fn timestamp(&mut self, module: Module) -> u64;
}

impl<T: Synthesizer + ?Sized> Synthesizer for &mut T {
    fn set_precalculated_frequency(
        &mut self,
        module: Module,
        freq: &mut LmsFreq,
    ) -> Result<(), HardwareError> {
        (**self).set_precalculated_frequency(module, freq)
    }
}

impl<T: BandSelector + ?Sized> BandSelector for &mut T {
    fn band_select(&mut self, module: Module, low_band: bool) -> Result<(), HardwareError> {
        (**self).band_select(module, low_band)
    }
}

impl<T: TimeTamer + ?Sized> TimeTamer for &mut T {
    fn timestamp(&mut self, module: Module) -> u64 {
        (**self).timestamp(module)
    }
}

/// The hardware touched by a retune
pub struct RfFrontend<S, B, C> {
    /// Synthesizer driver
    pub synth: S,
    /// Band switch driver
    pub bands: B,
    /// Timestamp counter
    pub clock: C,
}

impl<S, B, C> RfFrontend<S, B, C>
where
    S: Synthesizer,
    B: BandSelector,
    C: TimeTamer,
{
    /// Bundle the three primitives
    #[must_use]
    pub const fn new(synth: S, bands: B, clock: C) -> Self {
        Self {
            synth,
            bands,
            clock,
        }
    }

    /// Program the synthesizer, then select the band matching `freq`
    ///
    /// Band select is skipped when tuning fails.
    pub fn apply(&mut self, module: Module, freq: &mut LmsFreq) -> Result<(), RetuneError> {
        self.synth
            .set_precalculated_frequency(module, freq)
            .map_err(RetuneError::HardwareTune)?;
        self.bands
            .band_select(module, freq.low_band())
            .map_err(RetuneError::HardwareBandSelect)
    }
}
