// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Virtual-time scheduler walking a phase table.
//!
//! The scheduler fires one boundary per phase. Before each boundary the handler may swap
//! the phase table; the boundary itself is then handed to the handler together with the
//! current table.
//!
//! The timeline of a cycle is fixed when the cycle starts: a boundary for phase `i` of
//! iteration `n` happens at `cycle_start + (n + phase_start(i)) * period`. A new period
//! only takes effect when phase 0 comes around again, so the phase index is never
//! disturbed by a speed change. A reinitialisation requested mid-cycle (shape reload,
//! resume after a pause) rebuilds the timeline from the upcoming boundary but keeps the
//! period the cycle started with.
use std::sync::Arc;

use trigger_shape::{MultiWave, ShapeSource};
use trigger_units::{Duration, Seconds, seconds};

use crate::frequency::SharedRate;

/// Cycles after which the timeline is restarted to bound accumulated float error.
pub const ITERATION_LIMIT: u32 = 1000;

/// Period the scheduler is currently running with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackedPeriod {
    /// The next boundary starts a fresh timeline from the current rate.
    NeedsReinit,
    Running(Duration<Seconds>),
}

/// The phase table the scheduler walks, together with its period tracking.
#[derive(Debug, Clone)]
pub struct WaveSchedule {
    pub wave: MultiWave,
    period: TrackedPeriod,
}

impl WaveSchedule {
    pub fn new(wave: MultiWave) -> Self {
        WaveSchedule {
            wave,
            period: TrackedPeriod::NeedsReinit,
        }
    }

    /// Discard the current timeline; it is rebuilt on the next boundary.
    pub fn request_reinit(&mut self) {
        self.period = TrackedPeriod::NeedsReinit;
    }

    pub fn tracked_period(&self) -> TrackedPeriod {
        self.period
    }
}

/// Callbacks the scheduler invokes at every phase boundary.
pub trait BoundaryHandler {
    /// Runs first on every boundary; may replace the phase table.
    fn on_reload_check(&mut self, schedule: &mut WaveSchedule);

    fn on_boundary(&mut self, wave: &MultiWave, phase_index: usize);
}

/// A boundary that was fired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    pub phase_index: usize,
    /// Number of completed cycles before this boundary.
    pub cycle: u64,
    pub time: Duration<Seconds>,
}

pub struct PhaseScheduler<H> {
    label: String,
    schedule: WaveSchedule,
    rate: Arc<SharedRate>,
    handler: H,
    phase_index: usize,
    iteration: u32,
    cycle: u64,
    /// Period the current cycle started with; survives a reinitialisation request.
    cycle_period: Option<Duration<Seconds>>,
    cycle_start: Duration<Seconds>,
    /// When the upcoming boundary is due on the current timeline.
    next_time: Duration<Seconds>,
}

impl<H: BoundaryHandler> PhaseScheduler<H> {
    pub fn new(
        label: impl Into<String>,
        wave: MultiWave,
        rate: Arc<SharedRate>,
        handler: H,
    ) -> Self {
        PhaseScheduler {
            label: label.into(),
            schedule: WaveSchedule::new(wave),
            rate,
            handler,
            phase_index: 0,
            iteration: 0,
            cycle: 0,
            cycle_period: None,
            cycle_start: seconds(0.0),
            next_time: seconds(0.0),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn schedule(&self) -> &WaveSchedule {
        &self.schedule
    }

    /// Phase index of the upcoming boundary.
    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Time at which the upcoming boundary is due.
    pub fn next_time(&self) -> Duration<Seconds> {
        self.next_time
    }

    /// Fire the next boundary.
    ///
    /// Returns `None` without advancing while the rate is undefined or the phase table is
    /// empty.
    pub fn step(&mut self) -> Option<Boundary> {
        self.handler.on_reload_check(&mut self.schedule);

        let phase_count = self.schedule.wave.phase_count();
        if phase_count == 0 {
            return None;
        }
        if self.phase_index >= phase_count {
            // The table shrank mid-cycle; start over at the top of a new cycle.
            self.wrap();
        }

        let Some(rate_period) = self.rate.get().and_then(|rate| rate.period()) else {
            self.schedule.request_reinit();
            return None;
        };
        let period = self.resolve_period(rate_period);

        let index = self.phase_index;
        let time = self.boundary_time(index, period);
        self.handler.on_boundary(&self.schedule.wave, index);
        let boundary = Boundary {
            phase_index: index,
            cycle: self.cycle,
            time,
        };

        self.phase_index += 1;
        if self.phase_index == phase_count {
            self.wrap();
        }
        self.next_time = self.boundary_time(self.phase_index, period);
        Some(boundary)
    }

    /// Fire boundaries until `cycles` more cycles completed or the scheduler pauses.
    ///
    /// Returns the boundaries fired.
    pub fn run_cycles(&mut self, cycles: u64) -> Vec<Boundary> {
        let target = self.cycle.saturating_add(cycles);
        let mut fired = Vec::new();
        while self.cycle < target {
            match self.step() {
                Some(boundary) => fired.push(boundary),
                None => break,
            }
        }
        fired
    }

    fn wrap(&mut self) {
        self.phase_index = 0;
        self.iteration += 1;
        self.cycle += 1;
    }

    /// Period to use for the upcoming boundary, restarting the timeline when needed.
    fn resolve_period(&mut self, rate_period: Duration<Seconds>) -> Duration<Seconds> {
        let at_cycle_start = self.phase_index == 0;
        let period = match self.schedule.period {
            TrackedPeriod::Running(active) if !at_cycle_start => return active,
            TrackedPeriod::Running(active)
                if active == rate_period && self.iteration < ITERATION_LIMIT =>
            {
                return active;
            }
            TrackedPeriod::Running(_) => rate_period,
            TrackedPeriod::NeedsReinit if at_cycle_start => rate_period,
            TrackedPeriod::NeedsReinit => self.cycle_period.unwrap_or(rate_period),
        };
        let phase_start = f64::from(self.schedule.wave.phase_start(self.phase_index));
        self.cycle_start = self.next_time - period * phase_start;
        self.iteration = 0;
        self.cycle_period = Some(period);
        self.schedule.period = TrackedPeriod::Running(period);
        period
    }

    fn boundary_time(&self, index: usize, period: Duration<Seconds>) -> Duration<Seconds> {
        let phase_start = f64::from(self.schedule.wave.phase_start(index));
        self.cycle_start + period * (f64::from(self.iteration) + phase_start)
    }
}
