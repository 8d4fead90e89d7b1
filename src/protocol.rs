//! Communication Protocols
//!
//! Retune request/response packets exchanged with the host. Both are fixed
//! 16-byte buffers tagged with the `'T'` magic byte.
//!
//! ```text
//! Request                              Response
//! [0]      magic 'T'                   [0]      magic 'T'
//! [1..9]   timestamp (LE, 0 = now)     [1..9]   duration in ticks (LE)
//! [9..13]  nint:9 | nfrac:23           [9]      vcocap result
//! [13]     freqsel:6 | RX | TX         [10]     flags (DURATION_VALID, SUCCESS)
//! [14]     vcocap:6 | QUICK | LOW      [11..16] reserved
//! [15]     reserved
//! ```

use crate::config::{
    request, response, NFRAC_MAX, NINT_MAX, PACKET_LEN, RETUNE_MAGIC, SIX_BIT_MASK, VCOCAP_UNKNOWN,
};
use crate::error::RetuneError;
use crate::types::{FreqFlags, LmsFreq, Module, RetuneTime};

/// Decoded retune request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetuneRequest {
    /// Target module; `None` when the packet selects neither or both
    pub module: Option<Module>,
    /// Raw timestamp ([`crate::config::RETUNE_NOW`] requests an immediate retune)
    pub timestamp: u64,
    /// Integer LO divider (9 bits)
    pub nint: u16,
    /// Fractional LO divider (23 bits)
    pub nfrac: u32,
    /// VCO and divider selection (6 bits)
    pub freqsel: u8,
    /// Capacitance hint (6 bits)
    pub vcocap: u8,
    /// Select the low band
    pub low_band: bool,
    /// Use `vcocap` as-is instead of searching from it
    pub quick_tune: bool,
}

impl RetuneRequest {
    /// Build a request for a module
    #[must_use]
    pub const fn new(module: Module, time: RetuneTime, nint: u16, nfrac: u32, freqsel: u8) -> Self {
        Self {
            module: Some(module),
            timestamp: time.as_timestamp(),
            nint: nint & NINT_MAX,
            nfrac: nfrac & NFRAC_MAX,
            freqsel: freqsel & SIX_BIT_MASK,
            vcocap: 0,
            low_band: false,
            quick_tune: false,
        }
    }

    /// Set the capacitance hint
    #[must_use]
    pub const fn with_vcocap(self, vcocap: u8) -> Self {
        Self {
            vcocap: vcocap & SIX_BIT_MASK,
            ..self
        }
    }

    /// Set the low band flag
    #[must_use]
    pub const fn with_low_band(self, low_band: bool) -> Self {
        Self { low_band, ..self }
    }

    /// Set the quick tune flag
    #[must_use]
    pub const fn with_quick_tune(self, quick_tune: bool) -> Self {
        Self { quick_tune, ..self }
    }

    /// When the retune should happen
    #[must_use]
    pub const fn time(&self) -> RetuneTime {
        RetuneTime::from_timestamp(self.timestamp)
    }

    /// Frequency settings for the tuning primitive
    #[must_use]
    pub const fn freq(&self) -> LmsFreq {
        LmsFreq::new(
            self.nint,
            self.nfrac,
            self.freqsel,
            self.vcocap,
            FreqFlags::from_request(self.low_band, self.quick_tune),
        )
    }

    /// Decode a request packet
    ///
    /// # Errors
    /// `BadMagic` if the packet is not a retune request. An invalid module
    /// selection decodes to `module: None` and is rejected by the dispatcher.
    pub fn unpack(buf: &[u8; PACKET_LEN]) -> Result<Self, RetuneError> {
        if buf[request::IDX_MAGIC] != RETUNE_MAGIC {
            return Err(RetuneError::BadMagic(buf[request::IDX_MAGIC]));
        }

        let timestamp = read_u64(buf, request::IDX_TIME);

        let intfrac = &buf[request::IDX_INTFRAC..request::IDX_INTFRAC + 4];
        let nint = (u16::from(intfrac[0]) << 1) | u16::from(intfrac[1] >> 7);
        let nfrac = (u32::from(intfrac[1] & 0x7f) << 16)
            | (u32::from(intfrac[2]) << 8)
            | u32::from(intfrac[3]);

        let freqsel = buf[request::IDX_FREQSEL];
        let module = match (
            freqsel & request::FLAG_RX != 0,
            freqsel & request::FLAG_TX != 0,
        ) {
            (true, false) => Some(Module::Rx),
            (false, true) => Some(Module::Tx),
            _ => None,
        };

        let bandsel = buf[request::IDX_BANDSEL];

        Ok(Self {
            module,
            timestamp,
            nint,
            nfrac,
            freqsel: freqsel & SIX_BIT_MASK,
            vcocap: bandsel & SIX_BIT_MASK,
            low_band: bandsel & request::FLAG_LOW_BAND != 0,
            quick_tune: bandsel & request::FLAG_QUICK_TUNE != 0,
        })
    }

    /// Encode as a request packet (host side)
    #[must_use]
    pub fn pack(&self) -> [u8; PACKET_LEN] {
        let mut buf = [0u8; PACKET_LEN];
        buf[request::IDX_MAGIC] = RETUNE_MAGIC;
        write_u64(&mut buf, request::IDX_TIME, self.timestamp);

        let nint = self.nint & NINT_MAX;
        let nfrac = self.nfrac & NFRAC_MAX;
        buf[request::IDX_INTFRAC] = (nint >> 1) as u8;
        buf[request::IDX_INTFRAC + 1] = (((nint & 1) << 7) as u8) | ((nfrac >> 16) & 0x7f) as u8;
        buf[request::IDX_INTFRAC + 2] = ((nfrac >> 8) & 0xff) as u8;
        buf[request::IDX_INTFRAC + 3] = (nfrac & 0xff) as u8;

        let module_bits = match self.module {
            Some(Module::Rx) => request::FLAG_RX,
            Some(Module::Tx) => request::FLAG_TX,
            None => 0,
        };
        buf[request::IDX_FREQSEL] = (self.freqsel & SIX_BIT_MASK) | module_bits;

        let mut bandsel = self.vcocap & SIX_BIT_MASK;
        if self.quick_tune {
            bandsel |= request::FLAG_QUICK_TUNE;
        }
        if self.low_band {
            bandsel |= request::FLAG_LOW_BAND;
        }
        buf[request::IDX_BANDSEL] = bandsel;
        buf[request::IDX_RESV] = 0;

        buf
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for RetuneRequest {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "RetuneRequest({}, {}, nint={}, nfrac={}, lb={}, qt={})",
            self.module,
            self.time(),
            self.nint,
            self.nfrac,
            self.low_band,
            self.quick_tune
        );
    }
}

/// Status bits of a retune response
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ResponseFlags(u8);

impl ResponseFlags {
    /// No bits set
    pub const NONE: Self = Self(0);

    /// The duration field holds a measured tuning time
    pub const DURATION_VALID: Self = Self(1 << 0);

    /// The request was carried out (or accepted, for scheduled retunes)
    pub const SUCCESS: Self = Self(1 << 1);

    /// Create from raw bits
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bits
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check whether all bits of `other` are set
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the bits of `other`
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clear the bits of `other`
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

/// Retune response
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetuneResponse {
    /// Tuning time in timer ticks, 0 when not measured
    pub duration: u64,
    /// Capacitance chosen by tuning, or [`VCOCAP_UNKNOWN`]
    pub vcocap_result: u8,
    /// Status bits
    pub flags: ResponseFlags,
}

impl RetuneResponse {
    /// Unsuccessful response with no measurement
    #[must_use]
    pub const fn failure() -> Self {
        Self {
            duration: 0,
            vcocap_result: VCOCAP_UNKNOWN,
            flags: ResponseFlags::NONE,
        }
    }

    /// Check the success bit
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.flags.contains(ResponseFlags::SUCCESS)
    }

    /// Check whether `duration` holds a measurement
    #[must_use]
    pub const fn duration_valid(&self) -> bool {
        self.flags.contains(ResponseFlags::DURATION_VALID)
    }

    /// Encode into a response packet
    pub fn pack(&self, buf: &mut [u8; PACKET_LEN]) {
        buf.fill(0);
        buf[response::IDX_MAGIC] = RETUNE_MAGIC;
        write_u64(buf, response::IDX_TIME, self.duration);
        buf[response::IDX_VCOCAP] = self.vcocap_result;
        buf[response::IDX_FLAGS] = self.flags.bits();
    }

    /// Decode a response packet (host side)
    ///
    /// # Errors
    /// `BadMagic` if the packet is not a retune response.
    pub fn unpack(buf: &[u8; PACKET_LEN]) -> Result<Self, RetuneError> {
        if buf[response::IDX_MAGIC] != RETUNE_MAGIC {
            return Err(RetuneError::BadMagic(buf[response::IDX_MAGIC]));
        }

        Ok(Self {
            duration: read_u64(buf, response::IDX_TIME),
            vcocap_result: buf[response::IDX_VCOCAP],
            flags: ResponseFlags::from_bits(buf[response::IDX_FLAGS]),
        })
    }
}

impl Default for RetuneResponse {
    fn default() -> Self {
        Self::failure()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for RetuneResponse {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "RetuneResponse(ok={}, {} ticks, valid={}, vcocap=0x{:02x})",
            self.is_success(),
            self.duration,
            self.duration_valid(),
            self.vcocap_result
        );
    }
}

fn read_u64(buf: &[u8; PACKET_LEN], at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(bytes)
}

fn write_u64(buf: &mut [u8; PACKET_LEN], at: usize, value: u64) {
    buf[at..at + 8].copy_from_slice(&value.to_le_bytes());
}
