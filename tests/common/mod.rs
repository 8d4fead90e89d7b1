//! Mock hardware shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;

use retune_firmware::error::HardwareError;
use retune_firmware::hal::{BandSelector, RfFrontend, Synthesizer, TimeTamer};
use retune_firmware::retune::alarm::{RetuneTimer, Ticket};
use retune_firmware::types::{LmsFreq, Module};

/// Synthesizer that records every call
#[derive(Default)]
pub struct MockSynth {
    pub calls: Vec<(Module, LmsFreq)>,
    pub fail: bool,
    /// Capacitance reported when not quick-tuning
    pub tuned_vcocap: u8,
}

impl Synthesizer for MockSynth {
    fn set_precalculated_frequency(
        &mut self,
        module: Module,
        freq: &mut LmsFreq,
    ) -> Result<(), HardwareError> {
        self.calls.push((module, *freq));
        if self.fail {
            return Err(HardwareError::Tuning);
        }
        freq.vcocap_result = if freq.flags.force_vcocap() {
            freq.vcocap
        } else {
            self.tuned_vcocap
        };
        Ok(())
    }
}

/// Band selector that records every call
#[derive(Default)]
pub struct MockBands {
    pub calls: Vec<(Module, bool)>,
    pub fail: bool,
}

impl BandSelector for MockBands {
    fn band_select(&mut self, module: Module, low_band: bool) -> Result<(), HardwareError> {
        self.calls.push((module, low_band));
        if self.fail {
            Err(HardwareError::Bus)
        } else {
            Ok(())
        }
    }
}

/// Counter that advances a fixed amount on every read
pub struct MockClock {
    pub now: u64,
    pub step: u64,
    pub reads: usize,
}

impl MockClock {
    pub fn new(start: u64, step: u64) -> Self {
        Self {
            now: start,
            step,
            reads: 0,
        }
    }
}

impl TimeTamer for MockClock {
    fn timestamp(&mut self, _module: Module) -> u64 {
        let now = self.now;
        self.now = self.now.wrapping_add(self.step);
        self.reads += 1;
        now
    }
}

pub type MockFrontend = RfFrontend<MockSynth, MockBands, MockClock>;

pub fn frontend() -> MockFrontend {
    RfFrontend::new(
        MockSynth {
            tuned_vcocap: 0x1c,
            ..MockSynth::default()
        },
        MockBands::default(),
        MockClock::new(1_000, 250),
    )
}

/// Timer whose alarms fire only when the test says so
#[derive(Default)]
pub struct MockTimer {
    pub armed: Vec<(Module, u64, Ticket)>,
    pub fired: VecDeque<Ticket>,
}

impl MockTimer {
    /// Fire the most recently armed alarm
    pub fn fire_last(&mut self) -> Ticket {
        let (_, _, ticket) = *self.armed.last().expect("no alarm armed");
        self.fired.push_back(ticket);
        ticket
    }

    pub fn fire(&mut self, ticket: Ticket) {
        self.fired.push_back(ticket);
    }
}

impl RetuneTimer for MockTimer {
    fn arm(&mut self, module: Module, at: u64, ticket: Ticket) {
        self.armed.push((module, at, ticket));
    }

    fn fired(&mut self) -> Option<Ticket> {
        self.fired.pop_front()
    }
}
