//! Peripheral Drivers
//!
//! Drivers for the hardware the retune core switches.
//! These implement the `hal` traits over `embedded-hal` primitives.

pub mod band_switch;
