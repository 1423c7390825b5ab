// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Emulator configuration.
//!
//! [`EmulatorConfig`] is the serialized form, [`EngineSettings`] the runtime view shared
//! between the command context and the boundary callback.
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How the trigger wheel relates to the crankshaft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    TwoStroke,
    #[default]
    FourStrokeCrankSensor,
    FourStrokeCamSensor,
    FourStrokeSymmetricalCrankSensor,
    FourStrokeThreeTimesCrankSensor,
}

impl OperationMode {
    /// Trigger cycles per crank revolution.
    pub fn rpm_multiplier(self) -> f64 {
        match self {
            OperationMode::TwoStroke => 1.0,
            OperationMode::FourStrokeCrankSensor => 1.0,
            OperationMode::FourStrokeCamSensor => 0.5,
            OperationMode::FourStrokeSymmetricalCrankSensor => 2.0,
            OperationMode::FourStrokeThreeTimesCrankSensor => 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmulatorConfig {
    pub operation_mode: OperationMode,
    /// Emulated engine speed at start-up. Zero keeps the emulator idle.
    pub trigger_simulator_rpm: u32,
    /// Feed detected edges straight into the trigger decoder.
    pub direct_self_stimulation: bool,
    /// Drive the emulated levels onto the output pins.
    pub pin_output: bool,
    /// Reset the event trace whenever the speed changes.
    pub test_mode: bool,
    pub diagnostics: bool,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        EmulatorConfig {
            operation_mode: OperationMode::default(),
            trigger_simulator_rpm: 1200,
            direct_self_stimulation: false,
            pin_output: true,
            test_mode: false,
            diagnostics: false,
        }
    }
}

impl EmulatorConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?;
        Self::from_json(&json)
    }
}

/// Runtime settings shared between the command context and the boundary callback.
#[derive(Debug)]
pub struct EngineSettings {
    operation_mode: OperationMode,
    trigger_simulator_rpm: AtomicU32,
    direct_self_stimulation: AtomicBool,
    pin_output: AtomicBool,
    test_mode: AtomicBool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::new(&EmulatorConfig::default())
    }
}

impl EngineSettings {
    pub fn new(config: &EmulatorConfig) -> Self {
        EngineSettings {
            operation_mode: config.operation_mode,
            trigger_simulator_rpm: AtomicU32::new(config.trigger_simulator_rpm),
            direct_self_stimulation: AtomicBool::new(config.direct_self_stimulation),
            pin_output: AtomicBool::new(config.pin_output),
            test_mode: AtomicBool::new(config.test_mode),
        }
    }

    pub fn operation_mode(&self) -> OperationMode {
        self.operation_mode
    }

    pub fn trigger_simulator_rpm(&self) -> u32 {
        self.trigger_simulator_rpm.load(Ordering::Acquire)
    }

    pub(crate) fn set_trigger_simulator_rpm(&self, rpm: u32) {
        self.trigger_simulator_rpm.store(rpm, Ordering::Release);
    }

    pub fn direct_self_stimulation(&self) -> bool {
        self.direct_self_stimulation.load(Ordering::Acquire)
    }

    pub fn set_direct_self_stimulation(&self, enabled: bool) {
        self.direct_self_stimulation.store(enabled, Ordering::Release);
    }

    pub fn pin_output(&self) -> bool {
        self.pin_output.load(Ordering::Acquire)
    }

    pub fn set_pin_output(&self, enabled: bool) {
        self.pin_output.store(enabled, Ordering::Release);
    }

    pub fn is_test_mode(&self) -> bool {
        self.test_mode.load(Ordering::Acquire)
    }

    pub fn set_test_mode(&self, enabled: bool) {
        self.test_mode.store(enabled, Ordering::Release);
    }
}
