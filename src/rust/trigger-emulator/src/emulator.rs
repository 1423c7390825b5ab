// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Wiring of the trigger emulator.
//!
//! [`init_trigger_emulator`] connects the canonical shape, the engine settings and the
//! output sinks to a [`PhaseScheduler`] and registers the console commands that control
//! it. The returned scheduler is driven by the caller, either in virtual time or paced
//! against a wall clock.
use std::sync::Arc;

use trigger_log::{info, warn};
use trigger_shape::{MultiWave, SharedShape, ShapeSource};

use crate::Result;
use crate::commands::{CommandRegistry, register_emulator_commands};
use crate::control::ControlSurface;
use crate::driver::EmulationDriver;
use crate::frequency::{FrequencyController, SharedRate};
use crate::output::{DecoderFeed, PinOutput};
use crate::scheduler::{BoundaryHandler, PhaseScheduler, WaveSchedule};
use crate::settings::EngineSettings;
use crate::state::EmulationState;
use crate::sync::ShapeSynchronizer;
use crate::trace::TraceCollector;

/// Label of the scheduler driving the position sensor emulation.
pub const SCHEDULER_LABEL: &str = "position sensor";

/// Boundary handler of the emulation scheduler.
pub struct TriggerEmulator<P, F> {
    synchronizer: ShapeSynchronizer,
    driver: EmulationDriver<P, F>,
}

impl<P: PinOutput, F: DecoderFeed> TriggerEmulator<P, F> {
    pub fn new(synchronizer: ShapeSynchronizer, driver: EmulationDriver<P, F>) -> Self {
        TriggerEmulator {
            synchronizer,
            driver,
        }
    }

    pub fn synchronizer(&self) -> &ShapeSynchronizer {
        &self.synchronizer
    }

    pub fn driver(&self) -> &EmulationDriver<P, F> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut EmulationDriver<P, F> {
        &mut self.driver
    }
}

impl<P: PinOutput, F: DecoderFeed> BoundaryHandler for TriggerEmulator<P, F> {
    fn on_reload_check(&mut self, schedule: &mut WaveSchedule) {
        self.synchronizer.update_if_needed(schedule);
    }

    fn on_boundary(&mut self, wave: &MultiWave, phase_index: usize) {
        self.driver.handle_boundary(wave, phase_index);
    }
}

/// Everything the emulator is built from.
pub struct EmulatorParts<P, F> {
    pub shape: Arc<SharedShape>,
    pub settings: Arc<EngineSettings>,
    pub pins: P,
    pub feed: F,
    /// Cleared on every speed change while test mode is on.
    pub trace: Option<Arc<dyn TraceCollector>>,
}

pub type EmulationScheduler<P, F> = PhaseScheduler<TriggerEmulator<P, F>>;

/// Build the emulation scheduler and register its console commands.
///
/// The scheduler starts at the configured engine speed with the current version of the
/// shape already loaded. With a configured speed of zero it stays paused until an `rpm`
/// command starts it.
pub fn init_trigger_emulator<P: PinOutput, F: DecoderFeed>(
    parts: EmulatorParts<P, F>,
    registry: &mut CommandRegistry,
) -> Result<(EmulationScheduler<P, F>, ControlSurface)> {
    let EmulatorParts {
        shape,
        settings,
        pins,
        feed,
        trace,
    } = parts;

    let rate = Arc::new(SharedRate::default());
    let state = Arc::new(EmulationState::new());
    let frequency = FrequencyController::new(Arc::clone(&settings), Arc::clone(&rate), trace);
    let control = ControlSurface::new(Arc::clone(&state), frequency);
    register_emulator_commands(registry, &control)?;

    if control.set_rpm(settings.trigger_simulator_rpm()).is_none() {
        warn!("Emulator idle until an engine speed is set");
    }

    let (version, wave) =
        shape.with_shape(|version, current| (version, MultiWave::from_source(current)));
    info!(
        "Stimulator: loaded trigger shape version {} with {} phases",
        version,
        wave.phase_count()
    );
    let synchronizer = ShapeSynchronizer::loaded(shape, version);
    let driver = EmulationDriver::new(state, settings, pins, feed);
    let scheduler = PhaseScheduler::new(
        SCHEDULER_LABEL,
        wave,
        rate,
        TriggerEmulator::new(synchronizer, driver),
    );
    Ok((scheduler, control))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::event::ShaftEvent;
    use crate::output::NoPinOutput;
    use crate::settings::{EmulatorConfig, OperationMode};
    use crate::trace::EventTrace;
    use trigger_shape::{Channel, PinState, TriggerShape};
    use trigger_units::hertz;

    type TestEmulator = EmulationScheduler<NoPinOutput, Arc<EventTrace>>;

    struct Harness {
        scheduler: TestEmulator,
        control: ControlSurface,
        registry: CommandRegistry,
        shape: Arc<SharedShape>,
        trace: Arc<EventTrace>,
    }

    /// Primary `[L, L, H, H]`.
    fn make_shape() -> TriggerShape {
        TriggerShape::single_channel(
            vec![0.25, 0.5, 0.75, 1.0],
            vec![PinState::Low, PinState::Low, PinState::High, PinState::High],
        )
        .unwrap()
    }

    fn make_harness(config: EmulatorConfig) -> Harness {
        let shape = Arc::new(SharedShape::new(make_shape()));
        let settings = Arc::new(EngineSettings::new(&config));
        let trace = Arc::new(EventTrace::new());
        let mut registry = CommandRegistry::new();
        let parts = EmulatorParts {
            shape: Arc::clone(&shape),
            settings,
            pins: NoPinOutput,
            feed: Arc::clone(&trace),
            trace: Some(Arc::clone(&trace) as Arc<dyn TraceCollector>),
        };
        let (scheduler, control) = init_trigger_emulator(parts, &mut registry).unwrap();
        Harness {
            scheduler,
            control,
            registry,
            shape,
            trace,
        }
    }

    fn self_stimulating(rpm: u32) -> EmulatorConfig {
        EmulatorConfig {
            operation_mode: OperationMode::TwoStroke,
            trigger_simulator_rpm: rpm,
            direct_self_stimulation: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_init_loads_shape_and_rate() {
        let harness = make_harness(self_stimulating(600));
        assert_eq!(harness.scheduler.label(), SCHEDULER_LABEL);
        assert_eq!(harness.scheduler.schedule().wave.phase_count(), 4);
        assert_eq!(harness.control.rate(), Some(hertz(10.0)));
        assert_eq!(harness.scheduler.handler().synchronizer().at_version(), 1);
        assert!(harness.registry.names().any(|name| name == "rpm"));
    }

    #[test]
    fn test_cycle_emits_edges_at_boundaries() {
        let mut harness = make_harness(self_stimulating(600));
        let fired = harness.scheduler.run_cycles(2);
        assert_eq!(fired.len(), 8);
        assert_eq!(
            harness.trace.events(),
            vec![
                ShaftEvent::PrimaryFalling,
                ShaftEvent::PrimaryRising,
                ShaftEvent::PrimaryFalling,
                ShaftEvent::PrimaryRising,
            ]
        );
        assert!((fired[2].time.value() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_stop_and_resume_through_commands() {
        let mut harness = make_harness(self_stimulating(600));
        harness
            .registry
            .execute("stop_stimulator_at_index 2")
            .unwrap();
        harness.scheduler.run_cycles(2);
        // Boundaries keep firing, only phase 0 of the first cycle got through.
        assert_eq!(harness.trace.events(), vec![ShaftEvent::PrimaryFalling]);
        assert!(!harness.control.state().is_emitting());

        harness.registry.execute("resume_stimulator").unwrap();
        harness.scheduler.run_cycles(1);
        assert_eq!(harness.trace.len(), 3);
    }

    #[test]
    fn test_shape_version_bump_reloads_once() {
        let mut harness = make_harness(self_stimulating(600));
        harness.scheduler.step();
        let version = harness.shape.replace(make_shape().inverted());
        assert_eq!(version, 2);
        harness.scheduler.step();
        assert_eq!(harness.scheduler.handler().synchronizer().at_version(), 2);
        harness.scheduler.run_cycles(1);
        assert_eq!(harness.scheduler.handler().synchronizer().at_version(), 2);
        assert_eq!(
            harness.scheduler.schedule().wave.levels(Channel::Primary),
            &[PinState::High, PinState::High, PinState::Low, PinState::Low]
        );
    }

    #[test]
    fn test_zero_rpm_pauses_until_speed_set() {
        let mut harness = make_harness(self_stimulating(0));
        assert_eq!(harness.control.rate(), None);
        assert_eq!(harness.scheduler.step(), None);
        assert!(harness.trace.is_empty());

        harness.registry.execute("rpm 1200").unwrap();
        assert_eq!(harness.control.rate(), Some(hertz(20.0)));
        assert_eq!(harness.scheduler.run_cycles(1).len(), 4);

        harness.registry.execute("rpm 0").unwrap();
        assert_eq!(harness.scheduler.step(), None);
    }

    #[test]
    fn test_test_mode_resets_trace_on_speed_change() {
        let mut harness = make_harness(EmulatorConfig {
            test_mode: true,
            ..self_stimulating(600)
        });
        harness.scheduler.run_cycles(1);
        assert!(!harness.trace.is_empty());
        harness.registry.execute("rpm 900").unwrap();
        assert!(harness.trace.is_empty());
    }

    #[test]
    fn test_pin_output_without_self_stimulation_feeds_nothing() {
        let mut harness = make_harness(EmulatorConfig {
            trigger_simulator_rpm: 600,
            ..Default::default()
        });
        harness.scheduler.run_cycles(3);
        assert!(harness.trace.is_empty());
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let shape = Arc::new(SharedShape::new(make_shape()));
        let settings = Arc::new(EngineSettings::default());
        let mut registry = CommandRegistry::new();
        registry.add_action("rpm", || {}).unwrap();
        let parts = EmulatorParts {
            shape,
            settings,
            pins: NoPinOutput,
            feed: Vec::new(),
            trace: None,
        };
        assert!(matches!(
            init_trigger_emulator(parts, &mut registry),
            Err(Error::DuplicateCommand(_))
        ));
    }
}
