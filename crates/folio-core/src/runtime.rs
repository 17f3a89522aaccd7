//! Animation loop and the async presentation runner.

use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::coordinator::Coordinator;
use crate::scene::Stage;
use crate::scroll::{ScrollEvent, StepOutcome};
use crate::transition::{ForceReason, TickOutcome};

/// Draws the stage once per frame
pub trait Renderer {
    fn render(&mut self, stage: &Stage) -> anyhow::Result<()>;
}

/// Frame-by-frame pump: tick the driver, then render.
///
/// A render failure halts ticking until [`resume`](Self::resume). While
/// halted the watchdog is still polled, so a stuck transition is released
/// even when nothing is drawn.
#[derive(Debug, Default)]
pub struct FrameLoop {
    halted: bool,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pump<R: Renderer + ?Sized>(&mut self, coordinator: &Coordinator, renderer: &mut R) -> TickOutcome {
        if self.halted {
            return coordinator.poll_watchdog().unwrap_or(TickOutcome::Idle);
        }

        let outcome = coordinator.tick();
        let rendered = match coordinator.stage() {
            Some(stage) => renderer.render(&stage),
            None => Ok(()),
        };
        if let Err(e) = rendered {
            error!(error = %e, frame = self.frames, "Render failed, animation loop halted");
            self.halted = true;
        }
        self.frames += 1;
        outcome
    }

    pub fn resume(&mut self) {
        if self.halted {
            info!("Animation loop resumed");
        }
        self.halted = false;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Input delivered to a running presentation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Scroll(ScrollEvent),
    GoTo(usize),
}

/// Events emitted by the runner for observers
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationEvent {
    /// What became of a command
    Input(StepOutcome),
    TransitionCompleted { section: usize },
    TransitionForced { section: usize, reason: ForceReason },
    /// The animation loop halted on a render error
    RenderHalted { message: String },
}

/// Drives a [`Coordinator`] from a command channel and a frame interval.
///
/// The coordinator should run on [`TokioClock`](crate::clock::TokioClock) or
/// [`SystemClock`](crate::clock::SystemClock) so that watchdog deadlines line
/// up with tokio timers.
pub struct PresentationRuntime<R> {
    coordinator: Coordinator,
    renderer: R,
    frame_loop: FrameLoop,
    frame_interval: Duration,
    event_tx: Option<mpsc::UnboundedSender<PresentationEvent>>,
}

impl<R: Renderer> PresentationRuntime<R> {
    pub fn new(coordinator: Coordinator, renderer: R, frame_interval: Duration) -> Self {
        Self {
            coordinator,
            renderer,
            frame_loop: FrameLoop::new(),
            frame_interval: frame_interval.max(Duration::from_millis(1)),
            event_tx: None,
        }
    }

    /// Set the event sender for observers
    pub fn with_event_sender(mut self, tx: mpsc::UnboundedSender<PresentationEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn send_event(&self, event: PresentationEvent) {
        if let Some(ref tx) = self.event_tx {
            if tx.send(event).is_err() {
                warn!("Failed to send presentation event: receiver dropped");
            }
        }
    }

    fn handle_command(&self, command: Command) {
        let outcome = match command {
            Command::Scroll(event) => self.coordinator.on_scroll_event(event),
            Command::GoTo(index) => self.coordinator.go_to_section(index),
        };
        debug!(?command, ?outcome, "Command handled");
        self.send_event(PresentationEvent::Input(outcome));
    }

    fn report(&self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Completed { section } => {
                self.send_event(PresentationEvent::TransitionCompleted { section });
            }
            TickOutcome::ForceCompleted { section, reason } => {
                self.send_event(PresentationEvent::TransitionForced { section, reason });
            }
            TickOutcome::Idle | TickOutcome::Running(_) => {}
        }
    }

    /// Run until shutdown, or until the command channel closes and the last
    /// transition has finished.
    pub async fn run(
        &mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(
            frame_ms = self.frame_interval.as_millis() as u64,
            "Presentation runtime started"
        );

        let mut frames = tokio::time::interval(self.frame_interval);
        frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut input_closed = false;

        loop {
            let deadline = self.coordinator.watchdog_deadline();

            // Input before the watchdog before frames when several are ready
            tokio::select! {
                biased;

                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Presentation runtime received shutdown signal");
                        break;
                    }
                }

                command = commands.recv(), if !input_closed => {
                    match command {
                        Some(command) => self.handle_command(command),
                        None => {
                            debug!("Command channel closed");
                            input_closed = true;
                        }
                    }
                }

                _ = wait_for(deadline) => {
                    if let Some(outcome) = self.coordinator.poll_watchdog() {
                        self.report(outcome);
                    }
                }

                _ = frames.tick() => {
                    let was_halted = self.frame_loop.is_halted();
                    let outcome = self.frame_loop.pump(&self.coordinator, &mut self.renderer);
                    self.report(outcome);
                    if !was_halted && self.frame_loop.is_halted() {
                        self.send_event(PresentationEvent::RenderHalted {
                            message: format!("halted after {} frames", self.frame_loop.frames()),
                        });
                    }
                    if input_closed && !self.coordinator.is_transitioning() {
                        break;
                    }
                }
            }
        }

        info!(section = self.coordinator.current_section(), "Presentation runtime stopped");
    }
}

/// Sleep until `deadline`, or forever without one
async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use anyhow::bail;

    use super::*;
    use crate::clock::{ManualClock, TokioClock};
    use crate::config::FolioConfig;
    use crate::deck::Deck;

    #[derive(Default)]
    struct CountingRenderer {
        frames: usize,
        max_opacity_seen: Vec<f32>,
    }

    impl Renderer for CountingRenderer {
        fn render(&mut self, stage: &Stage) -> anyhow::Result<()> {
            self.frames += 1;
            let max = stage
                .pages()
                .iter()
                .map(|p| p.opacity())
                .fold(0.0_f32, f32::max);
            self.max_opacity_seen.push(max);
            Ok(())
        }
    }

    struct FailingRenderer;

    impl Renderer for FailingRenderer {
        fn render(&mut self, _stage: &Stage) -> anyhow::Result<()> {
            bail!("surface lost")
        }
    }

    fn manual_coordinator() -> (Coordinator, ManualClock) {
        let clock = ManualClock::new();
        let coordinator =
            Coordinator::new(&FolioConfig::default(), &Deck::builtin(), Rc::new(clock.clone())).unwrap();
        (coordinator, clock)
    }

    #[test]
    fn test_pump_renders_every_frame() {
        let (c, clock) = manual_coordinator();
        let mut renderer = CountingRenderer::default();
        let mut frame_loop = FrameLoop::new();

        c.on_scroll_event(ScrollEvent::down(1.0));
        let mut last = TickOutcome::Idle;
        for _ in 0..60 {
            clock.advance_ms(16);
            last = frame_loop.pump(&c, &mut renderer);
            if matches!(last, TickOutcome::Completed { .. }) {
                break;
            }
        }

        assert_eq!(last, TickOutcome::Completed { section: 1 });
        assert_eq!(renderer.frames as u64, frame_loop.frames());
        assert!(!frame_loop.is_halted());
    }

    #[test]
    fn test_render_failure_halts_but_watchdog_fires() {
        let (c, clock) = manual_coordinator();
        let mut frame_loop = FrameLoop::new();

        c.on_scroll_event(ScrollEvent::down(1.0));
        clock.advance_ms(16);
        frame_loop.pump(&c, &mut FailingRenderer);
        assert!(frame_loop.is_halted());

        // Ticking stopped: the transition cannot complete on its own
        clock.set_elapsed(Duration::from_millis(1200));
        assert_eq!(frame_loop.pump(&c, &mut FailingRenderer), TickOutcome::Idle);
        assert!(c.is_transitioning());

        clock.set_elapsed(Duration::from_millis(1601));
        assert_eq!(
            frame_loop.pump(&c, &mut FailingRenderer),
            TickOutcome::ForceCompleted {
                section: 1,
                reason: ForceReason::Watchdog
            }
        );
        assert!(!c.is_transitioning());
        assert_eq!(c.stage().unwrap().focused_pages(), vec![1]);

        frame_loop.resume();
        assert!(!frame_loop.is_halted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_runtime_replays_timeline() {
        let coordinator =
            Coordinator::new(&FolioConfig::default(), &Deck::builtin(), Rc::new(TokioClock)).unwrap();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let mut runtime = PresentationRuntime::new(coordinator, CountingRenderer::default(), Duration::from_millis(16))
            .with_event_sender(event_tx);

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let input = async move {
            command_tx.send(Command::Scroll(ScrollEvent::down(1.0))).unwrap();
            tokio::time::sleep(Duration::from_millis(500)).await;
            command_tx.send(Command::Scroll(ScrollEvent::down(1.0))).unwrap();
            tokio::time::sleep(Duration::from_millis(350)).await;
            command_tx.send(Command::Scroll(ScrollEvent::down(1.0))).unwrap();
        };
        tokio::join!(runtime.run(command_rx, shutdown_rx), input);

        let mut events = Vec::new();
        while let Ok(event) = event_rx.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                PresentationEvent::Input(StepOutcome::Triggered(1)),
                PresentationEvent::Input(StepOutcome::Busy),
                PresentationEvent::TransitionCompleted { section: 1 },
                PresentationEvent::Input(StepOutcome::Triggered(2)),
                PresentationEvent::TransitionCompleted { section: 2 },
            ]
        );
        assert_eq!(runtime.coordinator().current_section(), 2);
        assert!(runtime.renderer().max_opacity_seen.iter().all(|o| *o <= 1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_runtime_watchdog_without_frames() {
        let coordinator =
            Coordinator::new(&FolioConfig::default(), &Deck::builtin(), Rc::new(TokioClock)).unwrap();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let mut runtime = PresentationRuntime::new(coordinator, FailingRenderer, Duration::from_millis(16))
            .with_event_sender(event_tx);

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        command_tx.send(Command::GoTo(4)).unwrap();
        drop(command_tx);

        runtime.run(command_rx, shutdown_rx).await;

        let mut events = Vec::new();
        while let Ok(event) = event_rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events[0], PresentationEvent::Input(StepOutcome::Triggered(4)));
        assert!(matches!(events[1], PresentationEvent::RenderHalted { .. }));
        assert_eq!(
            events[2],
            PresentationEvent::TransitionForced {
                section: 4,
                reason: ForceReason::Watchdog
            }
        );
        assert!(!runtime.coordinator().is_transitioning());
    }

    #[tokio::test(start_paused = true)]
    async fn test_runtime_stops_on_shutdown() {
        let coordinator =
            Coordinator::new(&FolioConfig::default(), &Deck::builtin(), Rc::new(TokioClock)).unwrap();
        let mut runtime = PresentationRuntime::new(coordinator, CountingRenderer::default(), Duration::from_millis(16));

        let (_command_tx, command_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let stop = async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            shutdown_tx.send(true).unwrap();
        };
        tokio::join!(runtime.run(command_rx, shutdown_rx), stop);

        assert_eq!(runtime.coordinator().current_section(), 0);
        assert!(runtime.renderer().frames > 0);
    }
}
