// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Sinks the emulation driver writes to.
use trigger_shape::MultiWave;

use crate::event::ShaftEvent;

/// Drives the levels of a phase onto physical output pins.
pub trait PinOutput {
    fn apply_pin_state(&mut self, wave: &MultiWave, phase_index: usize);
}

/// Pin output for builds without emulation hardware.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPinOutput;

impl PinOutput for NoPinOutput {
    fn apply_pin_state(&mut self, _wave: &MultiWave, _phase_index: usize) {}
}

/// Input side of the trigger decoder.
pub trait DecoderFeed {
    fn handle_shaft_signal(&mut self, event: ShaftEvent);
}

impl DecoderFeed for Vec<ShaftEvent> {
    fn handle_shaft_signal(&mut self, event: ShaftEvent) {
        self.push(event);
    }
}
