// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use trigger_log::info;
use trigger_units::{Frequency, Hertz, rpm};

use crate::settings::{EngineSettings, OperationMode};
use crate::trace::TraceCollector;

/// Trigger cycle rate read by the scheduler.
///
/// `None` means the emulator is not running. It is stored as NaN, never as zero.
#[derive(Debug)]
pub struct SharedRate {
    bits: AtomicU64,
}

impl Default for SharedRate {
    fn default() -> Self {
        SharedRate {
            bits: AtomicU64::new(f64::NAN.to_bits()),
        }
    }
}

impl SharedRate {
    pub fn set(&self, rate: Option<Frequency<Hertz>>) {
        let value = rate.map_or(f64::NAN, Frequency::value);
        self.bits.store(value.to_bits(), Ordering::Release);
    }

    pub fn get(&self) -> Option<Frequency<Hertz>> {
        let value = f64::from_bits(self.bits.load(Ordering::Acquire));
        if value.is_nan() {
            None
        } else {
            Some(value.into())
        }
    }
}

/// Trigger cycles per second at `rpm`, `None` for a stopped engine.
pub fn cycle_rate(engine_rpm: u32, mode: OperationMode) -> Option<Frequency<Hertz>> {
    if engine_rpm == 0 {
        return None;
    }
    Some(rpm(f64::from(engine_rpm)).to_cycle_rate(mode.rpm_multiplier()))
}

/// Turns the requested engine speed into the scheduler's cycle rate.
#[derive(Clone)]
pub struct FrequencyController {
    settings: Arc<EngineSettings>,
    rate: Arc<SharedRate>,
    trace: Option<Arc<dyn TraceCollector>>,
}

impl FrequencyController {
    pub fn new(
        settings: Arc<EngineSettings>,
        rate: Arc<SharedRate>,
        trace: Option<Arc<dyn TraceCollector>>,
    ) -> Self {
        FrequencyController {
            settings,
            rate,
            trace,
        }
    }

    /// Set the emulated engine speed; zero stops the emulator.
    ///
    /// The scheduler picks up the new period at the start of the next cycle.
    pub fn set_rpm(&self, engine_rpm: u32) -> Option<Frequency<Hertz>> {
        self.settings.set_trigger_simulator_rpm(engine_rpm);
        let rate = cycle_rate(engine_rpm, self.settings.operation_mode());
        self.rate.set(rate);
        if let Some(trace) = self.trace.as_ref().filter(|_| self.settings.is_test_mode()) {
            trace.reset();
        }
        info!("Emulating position sensor(s). RPM={}", engine_rpm);
        rate
    }

    pub fn rate(&self) -> Option<Frequency<Hertz>> {
        self.rate.get()
    }
}
