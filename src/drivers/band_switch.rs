//! Band Switch Driver
//!
//! Selects the low or high band RF path for each module with one GPIO line
//! per module: driven high for the low band, low for the high band.

use embedded_hal::digital::OutputPin;

use crate::error::HardwareError;
use crate::hal::BandSelector;
use crate::types::{Module, RfBand};

/// GPIO band switch for the RX and TX paths
pub struct GpioBandSwitch<RX, TX> {
    rx: RX,
    tx: TX,
    rx_band: Option<RfBand>,
    tx_band: Option<RfBand>,
}

impl<RX, TX> GpioBandSwitch<RX, TX>
where
    RX: OutputPin,
    TX: OutputPin,
{
    /// Create a band switch; no band is considered selected until the first
    /// [`band_select`](BandSelector::band_select)
    #[must_use]
    pub fn new(rx: RX, tx: TX) -> Self {
        Self {
            rx,
            tx,
            rx_band: None,
            tx_band: None,
        }
    }

    /// Band last selected for a module
    #[must_use]
    pub const fn current(&self, module: Module) -> Option<RfBand> {
        match module {
            Module::Rx => self.rx_band,
            Module::Tx => self.tx_band,
        }
    }

    /// Release the pins
    pub fn release(self) -> (RX, TX) {
        (self.rx, self.tx)
    }
}

impl<RX, TX> BandSelector for GpioBandSwitch<RX, TX>
where
    RX: OutputPin,
    TX: OutputPin,
{
    fn band_select(&mut self, module: Module, low_band: bool) -> Result<(), HardwareError> {
        let band = RfBand::from_low_band(low_band);

        let driven = match module {
            Module::Rx => drive(&mut self.rx, band).is_ok(),
            Module::Tx => drive(&mut self.tx, band).is_ok(),
        };
        if !driven {
            warn!("band switch {} pin write failed", module);
            return Err(HardwareError::Bus);
        }

        match module {
            Module::Rx => self.rx_band = Some(band),
            Module::Tx => self.tx_band = Some(band),
        }
        trace!("{} band {}", module, band);
        Ok(())
    }
}

fn drive<P: OutputPin>(pin: &mut P, band: RfBand) -> Result<(), P::Error> {
    if band.is_low() {
        pin.set_high()
    } else {
        pin.set_low()
    }
}
