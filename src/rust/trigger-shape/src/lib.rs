// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Phase model of a trigger wheel.
//!
//! One engine cycle is split into phases. Every phase ends at a switch time (a fraction of
//! the cycle in `(0, 1]`) and carries one pin level per channel.

pub mod error;
mod multi_wave;
mod pin_state;
mod shape;
mod shared;

pub use error::{Error, Result};
pub use multi_wave::MultiWave;
pub use pin_state::{CHANNEL_COUNT, Channel, PinState};
pub use shape::{ShapeDefinition, TriggerShape};
pub use shared::SharedShape;

/// Upper bound on the number of phases in one cycle.
pub const MAX_PHASE_COUNT: usize = 252;

/// Read access to a phase table.
pub trait ShapeSource {
    fn phase_count(&self) -> usize;

    /// Cycle fraction at which each phase ends.
    fn switch_times(&self) -> &[f32];

    fn levels(&self, channel: Channel) -> &[PinState];

    /// Level of `channel` during `phase`.
    ///
    /// Panics if `phase` is outside the table.
    fn channel_state(&self, channel: Channel, phase: usize) -> PinState {
        self.levels(channel)[phase]
    }
}
