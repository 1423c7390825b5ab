// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Trigger waveform emulation.
//!
//! Replays a multi-channel trigger wheel pattern phase by phase at the emulated engine
//! speed, driving output pins and optionally feeding the resulting edges straight into
//! the trigger decoder.
pub mod commands;
pub mod control;
pub mod driver;
pub mod edge;
pub mod emulator;
pub mod error;
pub mod event;
pub mod frequency;
pub mod output;
pub mod scheduler;
pub mod settings;
pub mod state;
pub mod sync;
pub mod trace;

pub use commands::{CommandRegistry, register_emulator_commands};
pub use control::ControlSurface;
pub use emulator::{
    EmulationScheduler, EmulatorParts, SCHEDULER_LABEL, TriggerEmulator, init_trigger_emulator,
};
pub use error::{Error, Result};
pub use event::ShaftEvent;
pub use output::{DecoderFeed, NoPinOutput, PinOutput};
pub use scheduler::{Boundary, BoundaryHandler, PhaseScheduler};
pub use settings::{EmulatorConfig, EngineSettings, OperationMode};
pub use state::EmulationState;
pub use trace::{EventTrace, TraceCollector};
