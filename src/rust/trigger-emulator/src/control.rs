// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use trigger_log::info;
use trigger_units::{Frequency, Hertz};

use crate::frequency::FrequencyController;
use crate::state::EmulationState;

/// Runtime operations on a running emulator.
///
/// Cheap to clone; clones can be moved to a command thread while the scheduler keeps
/// running elsewhere.
#[derive(Clone)]
pub struct ControlSurface {
    state: Arc<EmulationState>,
    frequency: FrequencyController,
}

impl ControlSurface {
    pub fn new(state: Arc<EmulationState>, frequency: FrequencyController) -> Self {
        ControlSurface { state, frequency }
    }

    pub fn set_rpm(&self, rpm: u32) -> Option<Frequency<Hertz>> {
        self.frequency.set_rpm(rpm)
    }

    /// Stop emitting once the boundary for `index` is reached.
    ///
    /// An index outside the current cycle never matches.
    pub fn stop_at_index(&self, index: usize) {
        self.state.set_stop_at_index(index);
        info!("Stimulator: stopping at index {}", index);
    }

    /// Emit again and forget any stop index.
    pub fn resume(&self) {
        self.state.resume();
        info!("Stimulator: resumed");
    }

    pub fn state(&self) -> &EmulationState {
        &self.state
    }

    pub fn rate(&self) -> Option<Frequency<Hertz>> {
        self.frequency.rate()
    }
}
