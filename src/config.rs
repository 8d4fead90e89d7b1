//! System configuration and protocol constants
//!
//! This module defines compile-time constants for the retune scheduler.
//! Queue sizing, packet layout, and reserved sentinel values are centralized here.

/// Capacity of the deferred retune queue
///
/// Must be a power of two; queue cursors advance by masking with `N - 1`.
pub const RETUNE_QUEUE_CAPACITY: usize = 32;

/// Depth of the timer event channel between the alarm context and the scheduler
///
/// A `heapless::spsc::Queue` of depth `N` holds `N - 1` items. Only the head
/// entry is ever armed, so a handful of slots absorbs stale tickets after a reset.
pub const TIMER_EVENT_DEPTH: usize = 8;

/// Depth of the alarm request channel feeding the embassy alarm task
pub const ALARM_REQUEST_DEPTH: usize = 4;

/// Size of request and response packets exchanged with the host
pub const PACKET_LEN: usize = 16;

/// Magic byte identifying a retune packet
pub const RETUNE_MAGIC: u8 = b'T';

/// Timestamp requesting that a retune be applied immediately
pub const RETUNE_NOW: u64 = 0;

/// Capacitance value reported when no tuning result is available
pub const VCOCAP_UNKNOWN: u8 = 0xff;

/// Mask for the 6-bit `freqsel` and `vcocap` fields
pub const SIX_BIT_MASK: u8 = 0x3f;

/// Largest `nint` value representable in the 9-bit divider field
pub const NINT_MAX: u16 = 0x1ff;

/// Largest `nfrac` value representable in the 23-bit divider field
pub const NFRAC_MAX: u32 = 0x007f_ffff;

/// Request packet byte offsets
pub mod request {
    //! Byte offsets within a retune request packet

    /// Magic value
    pub const IDX_MAGIC: usize = 0;

    /// Little-endian 64-bit timestamp
    pub const IDX_TIME: usize = 1;

    /// Packed integer/fractional synthesizer dividers (4 bytes)
    pub const IDX_INTFRAC: usize = 9;

    /// `freqsel` plus module selection bits
    pub const IDX_FREQSEL: usize = 13;

    /// `vcocap` hint plus band and quick-tune bits
    pub const IDX_BANDSEL: usize = 14;

    /// Reserved
    pub const IDX_RESV: usize = 15;

    /// `IDX_FREQSEL`: request targets the receive module
    pub const FLAG_RX: u8 = 1 << 6;

    /// `IDX_FREQSEL`: request targets the transmit module
    pub const FLAG_TX: u8 = 1 << 7;

    /// `IDX_BANDSEL`: use the `vcocap` hint as-is
    pub const FLAG_QUICK_TUNE: u8 = 1 << 6;

    /// `IDX_BANDSEL`: select the low band
    pub const FLAG_LOW_BAND: u8 = 1 << 7;
}

/// Response packet byte offsets
pub mod response {
    //! Byte offsets within a retune response packet

    /// Magic value
    pub const IDX_MAGIC: usize = 0;

    /// Little-endian 64-bit tuning duration in timer ticks
    pub const IDX_TIME: usize = 1;

    /// Capacitance value chosen by the tuning operation
    pub const IDX_VCOCAP: usize = 9;

    /// Status flags
    pub const IDX_FLAGS: usize = 10;

    /// First reserved byte (reserved through the end of the packet)
    pub const IDX_RESV: usize = 11;
}
