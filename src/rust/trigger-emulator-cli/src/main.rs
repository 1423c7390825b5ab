// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Runs the trigger emulator from the command line and prints every boundary it fires.
//!
//! Without `--realtime` the scheduler runs in virtual time and finishes immediately. With
//! `--realtime` each boundary is paced against the wall clock, and `--commands` reads
//! console commands such as `rpm 3000` from stdin while the emulator is running.
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use trigger_emulator::{
    Boundary, CommandRegistry, EmulationScheduler, EmulatorConfig, EmulatorParts,
    EngineSettings, EventTrace, NoPinOutput, OperationMode, ShaftEvent, TraceCollector,
    init_trigger_emulator,
};
use trigger_log::{info, warn};
use trigger_shape::{SharedShape, TriggerShape};
use trigger_units::rpm;

/// Poll interval while the emulator is paused.
const IDLE_POLL: Duration = Duration::from_millis(50);

type CliScheduler = EmulationScheduler<NoPinOutput, Arc<EventTrace>>;

/// Replay a trigger wheel pattern at an emulated engine speed
#[derive(Parser, Debug)]
#[command(name = "trigger-emulator")]
#[command(version)]
struct Cli {
    /// Trigger shape as JSON (`switch_times`, `primary`, optional `secondary`, `tertiary`)
    #[arg(long, conflicts_with = "wheel")]
    shape: Option<PathBuf>,

    /// Toothed wheel as `<total>-<missing>`, e.g. `60-2`
    #[arg(long, default_value = "60-2")]
    wheel: String,

    /// Emulator configuration as JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Engine speed, overrides the configuration
    #[arg(long)]
    rpm: Option<u32>,

    /// Operation mode, overrides the configuration
    #[arg(long, value_parser = parse_operation_mode)]
    mode: Option<OperationMode>,

    /// Feed detected edges to the decoder trace
    #[arg(long)]
    self_stimulation: bool,

    /// Number of trigger cycles to run
    #[arg(long, default_value_t = 2)]
    cycles: u64,

    /// Pace boundaries against the wall clock
    #[arg(long)]
    realtime: bool,

    /// Read console commands from stdin
    #[arg(long, requires = "realtime")]
    commands: bool,

    /// Log per-boundary diagnostics
    #[arg(long)]
    diagnostics: bool,

    /// Also log informational messages
    #[arg(short, long)]
    verbose: bool,
}

fn log_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

fn parse_operation_mode(value: &str) -> Result<OperationMode, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| format!("unknown operation mode `{value}`"))
}

/// Parse `<total>-<missing>`.
fn parse_wheel(spec: &str) -> Result<(usize, usize)> {
    let Some((total, missing)) = spec.split_once('-') else {
        bail!("Expected `<total>-<missing>`, got `{spec}`");
    };
    let total = total
        .trim()
        .parse()
        .with_context(|| format!("Invalid tooth count in `{spec}`"))?;
    let missing = missing
        .trim()
        .parse()
        .with_context(|| format!("Invalid missing tooth count in `{spec}`"))?;
    Ok((total, missing))
}

fn load_shape(path: &Path) -> Result<TriggerShape> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read trigger shape {}", path.display()))?;
    let shape = serde_json::from_str(&json)
        .with_context(|| format!("Invalid trigger shape {}", path.display()))?;
    Ok(shape)
}

fn resolve_shape(cli: &Cli) -> Result<TriggerShape> {
    match &cli.shape {
        Some(path) => load_shape(path),
        None => {
            let (total, missing) = parse_wheel(&cli.wheel)?;
            Ok(TriggerShape::toothed_wheel(total, missing)?)
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<EmulatorConfig> {
    let mut config = match &cli.config {
        Some(path) => EmulatorConfig::load(path)?,
        None => EmulatorConfig::default(),
    };
    if let Some(rpm) = cli.rpm {
        config.trigger_simulator_rpm = rpm;
    }
    if let Some(mode) = cli.mode {
        config.operation_mode = mode;
    }
    config.direct_self_stimulation |= cli.self_stimulation;
    config.diagnostics |= cli.diagnostics;
    Ok(config)
}

/// Print one boundary with the edges it fed.
fn print_boundary(scheduler: &CliScheduler, boundary: &Boundary, events: &[ShaftEvent]) {
    let states = scheduler.schedule().wave.phase_states(boundary.phase_index);
    let levels = states.map(|state| state.to_string()).join(" ");
    let edges = events
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "{:>14}  cycle {:>4}  phase {:>3}  [{}]  {}",
        boundary.time,
        boundary.cycle,
        boundary.phase_index,
        levels,
        edges
    );
}

/// Events recorded since `seen`; the trace may have been cleared in between.
fn take_new_events(trace: &EventTrace, seen: &mut usize) -> Vec<ShaftEvent> {
    let events = trace.events();
    let fresh = events.get(*seen..).map(<[ShaftEvent]>::to_vec).unwrap_or_default();
    *seen = events.len();
    fresh
}

fn run_virtual(scheduler: &mut CliScheduler, trace: &EventTrace, cycles: u64) {
    let target = scheduler.cycle().saturating_add(cycles);
    let mut seen = trace.len();
    while scheduler.cycle() < target {
        let Some(boundary) = scheduler.step() else {
            warn!("Emulator paused, engine speed is zero");
            return;
        };
        print_boundary(scheduler, &boundary, &take_new_events(trace, &mut seen));
    }
}

fn run_realtime(scheduler: &mut CliScheduler, trace: &EventTrace, cycles: u64) {
    let target = scheduler.cycle().saturating_add(cycles);
    let mut seen = trace.len();
    let mut origin = Instant::now();
    let mut paused = false;
    while scheduler.cycle() < target {
        if !paused {
            let offset =
                Duration::try_from_secs_f64(scheduler.next_time().value()).unwrap_or_default();
            let due = origin + offset;
            thread::sleep(due.saturating_duration_since(Instant::now()));
        }
        match scheduler.step() {
            Some(boundary) => {
                if paused {
                    // Continue the wall clock from the boundary that resumed the timeline.
                    let offset =
                        Duration::try_from_secs_f64(boundary.time.value()).unwrap_or_default();
                    origin = Instant::now().checked_sub(offset).unwrap_or(origin);
                    paused = false;
                }
                print_boundary(scheduler, &boundary, &take_new_events(trace, &mut seen));
            }
            None => {
                paused = true;
                thread::sleep(IDLE_POLL);
            }
        }
    }
}

/// Execute stdin lines as console commands until stdin closes.
fn spawn_console(registry: Arc<CommandRegistry>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if let Err(e) = registry.execute(&line) {
                eprintln!("{e}");
            }
        }
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!(e))
        .context("Failed to install logger")?;

    let config = resolve_config(&cli)?;
    trigger_log::init_logging(config.diagnostics);
    let shape = resolve_shape(&cli)?;
    info!("Trigger shape with {} phases", shape.size());

    let trace = Arc::new(EventTrace::new());
    let parts = EmulatorParts {
        shape: Arc::new(SharedShape::new(shape)),
        settings: Arc::new(EngineSettings::new(&config)),
        pins: NoPinOutput,
        feed: Arc::clone(&trace),
        trace: Some(Arc::clone(&trace) as Arc<dyn TraceCollector>),
    };
    let mut registry = CommandRegistry::new();
    let (mut scheduler, control) = init_trigger_emulator(parts, &mut registry)?;
    if let Some(rate) = control.rate() {
        info!(
            "{} in {:?} mode: {} trigger cycles",
            rpm(f64::from(config.trigger_simulator_rpm)),
            config.operation_mode,
            rate
        );
    }

    if cli.commands {
        let names = registry.names().collect::<Vec<_>>().join(", ");
        eprintln!("Commands: {names}");
        // Detached; the process exits with the scheduler.
        let _console = spawn_console(Arc::new(registry));
    }

    if cli.realtime {
        run_realtime(&mut scheduler, &trace, cli.cycles);
    } else {
        run_virtual(&mut scheduler, &trace, cli.cycles);
    }
    info!(
        "Emulated {} cycles, {} edges fed",
        scheduler.cycle(),
        trace.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wheel() {
        assert_eq!(parse_wheel("60-2").unwrap(), (60, 2));
        assert_eq!(parse_wheel(" 36 - 1 ").unwrap(), (36, 1));
        assert!(parse_wheel("60").is_err());
        assert!(parse_wheel("x-2").is_err());
    }

    #[test]
    fn test_parse_operation_mode() {
        assert_eq!(
            parse_operation_mode("four_stroke_cam_sensor").unwrap(),
            OperationMode::FourStrokeCamSensor
        );
        assert!(parse_operation_mode("rotary").is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "trigger-emulator",
            "--rpm",
            "3000",
            "--mode",
            "two_stroke",
            "--self-stimulation",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.trigger_simulator_rpm, 3000);
        assert_eq!(config.operation_mode, OperationMode::TwoStroke);
        assert!(config.direct_self_stimulation);
        assert!(config.pin_output);
        assert_eq!(resolve_shape(&cli).unwrap().size(), 116);
    }

    #[test]
    fn test_commands_require_realtime() {
        assert!(Cli::try_parse_from(["trigger-emulator", "--commands"]).is_err());
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(true), LevelFilter::INFO);
        assert_eq!(log_level(false), LevelFilter::WARN);
    }

    #[test]
    fn test_unbounded_cycles_stop_when_paused() {
        let config = EmulatorConfig {
            trigger_simulator_rpm: 600,
            ..Default::default()
        };
        let trace = Arc::new(EventTrace::new());
        let parts = EmulatorParts {
            shape: Arc::new(SharedShape::new(TriggerShape::toothed_wheel(4, 1).unwrap())),
            settings: Arc::new(EngineSettings::new(&config)),
            pins: NoPinOutput,
            feed: Arc::clone(&trace),
            trace: None,
        };
        let mut registry = CommandRegistry::new();
        let (mut scheduler, control) = init_trigger_emulator(parts, &mut registry).unwrap();
        run_virtual(&mut scheduler, &trace, 1);
        assert_eq!(scheduler.cycle(), 1);

        control.set_rpm(0);
        run_virtual(&mut scheduler, &trace, u64::MAX);
        assert_eq!(scheduler.cycle(), 1);
        assert_eq!(scheduler.phase_index(), 0);
    }

    #[test]
    fn test_take_new_events_after_reset() {
        let trace = EventTrace::new();
        let mut seen = 0;
        trace.record(ShaftEvent::PrimaryRising);
        assert_eq!(take_new_events(&trace, &mut seen), vec![ShaftEvent::PrimaryRising]);
        trace.reset();
        assert!(take_new_events(&trace, &mut seen).is_empty());
        assert_eq!(seen, 0);
        trace.record(ShaftEvent::PrimaryFalling);
        assert_eq!(take_new_events(&trace, &mut seen), vec![ShaftEvent::PrimaryFalling]);
    }
}
