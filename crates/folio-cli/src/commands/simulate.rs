use std::rc::Rc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::info;

use folio_core::runtime::{Command, PresentationEvent, PresentationRuntime, Renderer};
use folio_core::scene::Stage;
use folio_core::scroll::{ScrollEvent, StepOutcome};
use folio_core::transition::TickOutcome;
use folio_core::{Coordinator, Deck, FolioConfig, ManualClock, TokioClock};

/// Velocity of a scripted scroll sample unless one is given
const DEFAULT_VELOCITY: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputKind {
    Scroll(ScrollEvent),
    GoTo(usize),
}

/// One scripted input and when it arrives
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledInput {
    pub at_ms: u64,
    pub kind: InputKind,
}

impl ScheduledInput {
    fn command(&self) -> Command {
        match self.kind {
            InputKind::Scroll(event) => Command::Scroll(event),
            InputKind::GoTo(index) => Command::GoTo(index),
        }
    }

    fn label(&self) -> String {
        match self.kind {
            InputKind::Scroll(event) if event.direction > 0 => format!("down:{}", event.velocity),
            InputKind::Scroll(event) => format!("up:{}", event.velocity),
            InputKind::GoTo(index) => format!("goto:{}", index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry {
    /// Absent for wall-clock runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_ms: Option<u64>,
    pub event: String,
    pub outcome: String,
    pub section: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub frames: u64,
    pub final_section: usize,
    pub entries: Vec<TraceEntry>,
}

/// Parse `down@0,up:0.5@300,goto:4@900`.
///
/// `down` and `up` take an optional velocity, `goto` a zero-based index.
/// Inputs are returned in time order.
pub fn parse_events(spec: &str) -> Result<Vec<ScheduledInput>> {
    let mut inputs = Vec::new();

    for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (head, at) = item
            .split_once('@')
            .ok_or_else(|| anyhow!("Missing '@time' in event '{}'", item))?;
        let at_ms: u64 = at
            .trim()
            .parse()
            .with_context(|| format!("Invalid time in event '{}'", item))?;

        let (name, arg) = match head.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (head.trim(), None),
        };
        let velocity = || -> Result<f64> {
            match arg {
                Some(v) => v
                    .parse()
                    .with_context(|| format!("Invalid velocity in event '{}'", item)),
                None => Ok(DEFAULT_VELOCITY),
            }
        };

        let kind = match name.to_lowercase().as_str() {
            "down" => InputKind::Scroll(ScrollEvent::down(velocity()?)),
            "up" => InputKind::Scroll(ScrollEvent::up(velocity()?)),
            "goto" => {
                let index = arg
                    .ok_or_else(|| anyhow!("goto needs an index, e.g. goto:3@0"))?
                    .parse()
                    .with_context(|| format!("Invalid index in event '{}'", item))?;
                InputKind::GoTo(index)
            }
            other => bail!("Unknown event '{}' (expected down, up or goto)", other),
        };
        inputs.push(ScheduledInput { at_ms, kind });
    }

    if inputs.is_empty() {
        bail!("No events given");
    }
    inputs.sort_by_key(|input| input.at_ms);
    Ok(inputs)
}

fn describe_step(outcome: StepOutcome) -> String {
    match outcome {
        StepOutcome::Triggered(target) => format!("triggered {}", target),
        StepOutcome::Busy => "busy".to_string(),
        StepOutcome::CoolingDown => "cooling-down".to_string(),
        StepOutcome::BelowThreshold => "below-threshold".to_string(),
        StepOutcome::AtBoundary => "at-boundary".to_string(),
        StepOutcome::Invalid => "invalid".to_string(),
        StepOutcome::Suspended => "suspended".to_string(),
    }
}

/// Replay `inputs` against a simulated clock, one tick every `frame_ms`.
///
/// Runs until every input is delivered and the last transition has ended.
pub fn simulate(
    config: &FolioConfig,
    deck: &Deck,
    inputs: &[ScheduledInput],
    frame_ms: u64,
) -> Result<SimulationReport> {
    if frame_ms == 0 {
        bail!("--frame-ms must be greater than zero");
    }

    let clock = ManualClock::new();
    let coordinator = Coordinator::new(config, deck, Rc::new(clock.clone()))?;
    let frame = Duration::from_millis(frame_ms);

    let mut entries = Vec::new();
    let mut pending = inputs.iter().peekable();
    let mut now = Duration::ZERO;
    let mut frames = 0u64;

    loop {
        while let Some(input) = pending.next_if(|i| Duration::from_millis(i.at_ms) <= now) {
            clock.set_elapsed(Duration::from_millis(input.at_ms));
            let outcome = match input.kind {
                InputKind::Scroll(event) => coordinator.on_scroll_event(event),
                InputKind::GoTo(index) => coordinator.go_to_section(index),
            };
            entries.push(TraceEntry {
                at_ms: Some(input.at_ms),
                event: input.label(),
                outcome: describe_step(outcome),
                section: coordinator.current_section(),
            });
        }

        clock.set_elapsed(now);
        let finished = match coordinator.tick() {
            TickOutcome::Completed { section } => Some((section, "completed".to_string())),
            TickOutcome::ForceCompleted { section, reason } => Some((section, format!("forced ({})", reason))),
            TickOutcome::Idle | TickOutcome::Running(_) => None,
        };
        frames += 1;
        if let Some((section, outcome)) = finished {
            entries.push(TraceEntry {
                at_ms: Some(now.as_millis() as u64),
                event: "transition".to_string(),
                outcome,
                section,
            });
        }

        if pending.peek().is_none() && !coordinator.is_transitioning() {
            break;
        }
        now += frame;
    }

    info!(frames, section = coordinator.current_section(), "Simulation finished");
    Ok(SimulationReport {
        frames,
        final_section: coordinator.current_section(),
        entries,
    })
}

pub fn run(config: &FolioConfig, events: &str, frame_ms: u64, json: bool) -> Result<()> {
    let deck = super::load_deck(config)?;
    let inputs = parse_events(events)?;
    let report = simulate(config, &deck, &inputs, frame_ms)?;
    print_report(&report, json)
}

/// Counts frames; the wall-clock replay has nothing to draw on
#[derive(Default)]
struct FrameCounter {
    frames: u64,
}

impl Renderer for FrameCounter {
    fn render(&mut self, _stage: &Stage) -> anyhow::Result<()> {
        self.frames += 1;
        Ok(())
    }
}

/// Replay `events` in real time through the async presentation runtime
pub async fn run_realtime(config: &FolioConfig, events: &str, frame_ms: u64, json: bool) -> Result<()> {
    let deck = super::load_deck(config)?;
    let inputs = parse_events(events)?;

    let coordinator = Coordinator::new(config, &deck, Rc::new(TokioClock))?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut runtime = PresentationRuntime::new(
        coordinator,
        FrameCounter::default(),
        Duration::from_millis(frame_ms),
    )
    .with_event_sender(event_tx);

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let start = tokio::time::Instant::now();
    let script = inputs.clone();
    let feed = async move {
        for input in &script {
            tokio::time::sleep_until(start + Duration::from_millis(input.at_ms)).await;
            if command_tx.send(input.command()).is_err() {
                break;
            }
        }
    };
    tokio::join!(runtime.run(command_rx, shutdown_rx), feed);

    let mut inputs = inputs.iter();
    let mut entries = Vec::new();
    let mut section = 0;
    while let Ok(event) = event_rx.try_recv() {
        let entry = match event {
            PresentationEvent::Input(outcome) => {
                section = outcome.triggered().unwrap_or(section);
                TraceEntry {
                    at_ms: None,
                    event: inputs.next().map(|i| i.label()).unwrap_or_default(),
                    outcome: describe_step(outcome),
                    section,
                }
            }
            PresentationEvent::TransitionCompleted { section } => TraceEntry {
                at_ms: None,
                event: "transition".to_string(),
                outcome: "completed".to_string(),
                section,
            },
            PresentationEvent::TransitionForced { section, reason } => TraceEntry {
                at_ms: None,
                event: "transition".to_string(),
                outcome: format!("forced ({})", reason),
                section,
            },
            PresentationEvent::RenderHalted { message } => TraceEntry {
                at_ms: None,
                event: "render".to_string(),
                outcome: message,
                section,
            },
        };
        entries.push(entry);
    }

    let report = SimulationReport {
        frames: runtime.renderer().frames,
        final_section: runtime.coordinator().current_section(),
        entries,
    };
    print_report(&report, json)
}

fn print_report(report: &SimulationReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    print!("{}", format_report(report));
    Ok(())
}

/// Plain text trace. Sections are zero-based, like `goto:<index>`.
fn format_report(report: &SimulationReport) -> String {
    let mut out = String::new();
    for entry in &report.entries {
        let at = entry
            .at_ms
            .map(|ms| format!("{:>6}ms", ms))
            .unwrap_or_else(|| "       -".to_string());
        out.push_str(&format!(
            "{}  {:<14} {:<18} section {}\n",
            at, entry.event, entry.outcome, entry.section
        ));
    }
    out.push_str(&format!(
        "\n{} frames, final section {}\n",
        report.frames, report.final_section
    ));
    out
}
