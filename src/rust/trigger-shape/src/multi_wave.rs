// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use crate::pin_state::{CHANNEL_COUNT, Channel, PinState};
use crate::{MAX_PHASE_COUNT, ShapeSource};

/// Fixed-capacity working copy of a phase table.
///
/// The storage never grows: loading a shape overwrites the first `phase_count` entries.
#[derive(Debug, Clone)]
pub struct MultiWave {
    phase_count: usize,
    switch_times: [f32; MAX_PHASE_COUNT],
    channels: [[PinState; MAX_PHASE_COUNT]; CHANNEL_COUNT],
}

impl Default for MultiWave {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiWave {
    pub fn new() -> Self {
        MultiWave {
            phase_count: 0,
            switch_times: [0.0; MAX_PHASE_COUNT],
            channels: [[PinState::Low; MAX_PHASE_COUNT]; CHANNEL_COUNT],
        }
    }

    pub fn from_source<S: ShapeSource + ?Sized>(source: &S) -> Self {
        let mut wave = Self::new();
        wave.copy_from(source);
        wave
    }

    pub fn is_empty(&self) -> bool {
        self.phase_count == 0
    }

    /// Overwrite the table with the content of `source`.
    ///
    /// Phases beyond [`MAX_PHASE_COUNT`] are dropped.
    pub fn copy_from<S: ShapeSource + ?Sized>(&mut self, source: &S) {
        self.phase_count = source.phase_count().min(MAX_PHASE_COUNT);
        for (dst, src) in self
            .switch_times
            .iter_mut()
            .zip(source.switch_times().iter().take(self.phase_count))
        {
            *dst = *src;
        }
        for channel in Channel::ALL {
            for (dst, src) in self.channels[channel.index()]
                .iter_mut()
                .zip(source.levels(channel).iter().take(self.phase_count))
            {
                *dst = *src;
            }
        }
    }

    /// Cycle fraction at which `phase` starts.
    pub fn phase_start(&self, phase: usize) -> f32 {
        if phase == 0 {
            0.0
        } else {
            self.switch_times[phase - 1]
        }
    }

    /// Levels of all channels during `phase`.
    pub fn phase_states(&self, phase: usize) -> [PinState; CHANNEL_COUNT] {
        Channel::ALL.map(|channel| self.channels[channel.index()][phase])
    }
}

impl ShapeSource for MultiWave {
    fn phase_count(&self) -> usize {
        self.phase_count
    }

    fn switch_times(&self) -> &[f32] {
        &self.switch_times[..self.phase_count]
    }

    fn levels(&self, channel: Channel) -> &[PinState] {
        &self.channels[channel.index()][..self.phase_count]
    }
}
