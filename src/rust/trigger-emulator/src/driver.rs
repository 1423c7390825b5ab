// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use trigger_log::diagnostic;
use trigger_shape::{Channel, MultiWave, ShapeSource};

use crate::edge::detect_edge;
use crate::output::{DecoderFeed, PinOutput};
use crate::settings::EngineSettings;
use crate::state::EmulationState;

/// Emits one phase boundary to the pins and, with direct self-stimulation, to the decoder.
pub struct EmulationDriver<P, F> {
    state: Arc<EmulationState>,
    settings: Arc<EngineSettings>,
    pins: P,
    feed: F,
}

impl<P: PinOutput, F: DecoderFeed> EmulationDriver<P, F> {
    pub fn new(
        state: Arc<EmulationState>,
        settings: Arc<EngineSettings>,
        pins: P,
        feed: F,
    ) -> Self {
        EmulationDriver {
            state,
            settings,
            pins,
            feed,
        }
    }

    pub fn handle_boundary(&mut self, wave: &MultiWave, phase_index: usize) {
        if !self.state.check_boundary(phase_index) {
            return;
        }
        if self.settings.pin_output() {
            self.pins.apply_pin_state(wave, phase_index);
        }
        if self.settings.direct_self_stimulation() {
            self.feed_edges(wave, phase_index);
        }
    }

    fn feed_edges(&mut self, wave: &MultiWave, phase_index: usize) {
        let phase_count = wave.phase_count();
        for channel in Channel::ALL {
            if let Some(event) = detect_edge(wave, phase_index, phase_count, channel) {
                diagnostic!("phase {}: {}", phase_index, event);
                self.feed.handle_shaft_signal(event);
            }
        }
    }

    pub fn pins(&self) -> &P {
        &self.pins
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut F {
        &mut self.feed
    }
}
