//! Transition driver: owns the stage and animates it between sections.
//!
//! One transition at a time. Each frame interpolates the camera pose and
//! every page's opacity, scale and depth, then resyncs the page overlays.
//! A transition ends in exactly one of three ways, and each of them settles
//! the stage at its end values and calls the completion handler once:
//! normal completion, the watchdog deadline passing, or a frame failing.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::config::{EasingType, TransitionTiming};
use crate::error::{SceneError, TransitionError};
use crate::scene::{PageVisual, Stage};

use super::record::{ActiveTransition, VisualTrack};

/// Called once each time a transition finishes, normally or forced
pub type CompletionHandler = Box<dyn FnMut()>;

/// Why a transition was force-completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceReason {
    Watchdog,
    FrameError,
}

impl fmt::Display for ForceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForceReason::Watchdog => f.write_str("watchdog"),
            ForceReason::FrameError => f.write_str("frame error"),
        }
    }
}

/// Result of advancing the driver by one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Nothing in flight
    Idle,
    /// Frame written at this raw progress
    Running(f64),
    Completed { section: usize },
    ForceCompleted { section: usize, reason: ForceReason },
}

pub struct TransitionDriver {
    clock: Rc<dyn Clock>,
    timing: TransitionTiming,
    easing: EasingType,
    stage: Option<Stage>,
    on_complete: Option<CompletionHandler>,
    current: usize,
    active: Option<ActiveTransition>,
}

impl fmt::Debug for TransitionDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionDriver")
            .field("timing", &self.timing)
            .field("easing", &self.easing)
            .field("initialized", &self.stage.is_some())
            .field("current", &self.current)
            .field("active", &self.active)
            .finish()
    }
}

impl TransitionDriver {
    pub fn new(timing: TransitionTiming, easing: EasingType, clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            timing,
            easing,
            stage: None,
            on_complete: None,
            current: 0,
            active: None,
        }
    }

    /// Hand over the stage and the completion handler.
    ///
    /// The section in focus is taken from the stage: the first visible page,
    /// or 0.
    pub fn initialize(&mut self, stage: Stage, on_complete: impl FnMut() + 'static) {
        self.current = stage
            .pages()
            .iter()
            .position(|p| p.is_visible())
            .unwrap_or(0);
        info!(pages = stage.len(), section = self.current, "Transition driver initialized");
        self.stage = Some(stage);
        self.on_complete = Some(Box::new(on_complete));
        self.active = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.stage.is_some()
    }

    pub fn stage(&self) -> Option<&Stage> {
        self.stage.as_ref()
    }

    pub fn stage_mut(&mut self) -> Option<&mut Stage> {
        self.stage.as_mut()
    }

    /// Section in focus, or being moved into focus while a transition runs
    pub fn current_section(&self) -> usize {
        self.current
    }

    pub fn is_transitioning(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveTransition> {
        self.active.as_ref()
    }

    pub fn watchdog_deadline(&self) -> Option<Instant> {
        self.active.as_ref().map(|a| a.deadline)
    }

    pub fn timing(&self) -> TransitionTiming {
        self.timing
    }

    /// Start animating towards `target`.
    ///
    /// Refused requests change nothing and are logged. A transition already
    /// in flight is cancelled first; pages it left half-faded are faded out
    /// by the new one.
    pub fn transition_to_section(&mut self, target: usize) -> Result<(), TransitionError> {
        let Some(stage) = self.stage.as_mut() else {
            warn!(target, "Transition requested before the driver was initialized");
            return Err(TransitionError::NotInitialized);
        };
        if target >= stage.len() {
            warn!(target, pages = stage.len(), "Invalid transition target");
            return Err(TransitionError::InvalidTarget {
                target,
                len: stage.len(),
            });
        }
        if target == self.current && self.active.is_none() {
            debug!(target, "Already at target section");
            return Err(TransitionError::AlreadyAtTarget(target));
        }

        let start = self.clock.now();
        let Some(deadline) = start.checked_add(self.timing.watchdog) else {
            error!(
                target,
                watchdog = ?self.timing.watchdog,
                "Watchdog deadline out of range, transition refused"
            );
            return Err(TransitionError::DeadlineOverflow(self.timing.watchdog));
        };

        if let Some(stale) = self.active.take() {
            warn!(from = stale.from, to = stale.to, "Cancelling transition still in flight");
        }

        let camera_end = stage
            .camera_pose_for(target)
            .ok_or(TransitionError::InvalidTarget {
                target,
                len: stage.len(),
            })?;
        let camera_start = stage.camera().pose();

        let inactive = PageVisual::inactive(stage.layout());
        let tracks: BTreeMap<_, _> = stage
            .pages()
            .iter()
            .map(|page| {
                let end = if page.index() == target {
                    PageVisual::ACTIVE
                } else {
                    inactive
                };
                let track = VisualTrack {
                    index: page.index(),
                    start: page.visual(),
                    end,
                };
                (page.id(), track)
            })
            .collect();

        if let Some(page) = stage.page_mut(target) {
            page.show();
        }

        let from = self.current;
        self.active = Some(ActiveTransition {
            from,
            to: target,
            start,
            duration: self.timing.duration,
            easing: self.easing,
            deadline,
            camera_start,
            camera_end,
            tracks,
        });
        self.current = target;

        info!(
            from,
            to = target,
            duration_ms = self.timing.duration.as_millis() as u64,
            "Transition started"
        );
        Ok(())
    }

    /// Advance the transition by one frame
    pub fn tick(&mut self) -> TickOutcome {
        let now = self.clock.now();
        let Some(active) = self.active.as_ref() else {
            return TickOutcome::Idle;
        };

        // A finished tween completes normally even when its frame comes late
        let t = active.progress(now);
        if t >= 1.0 {
            return self.finish(None);
        }
        if let Some(outcome) = self.poll_watchdog() {
            return outcome;
        }

        let (Some(stage), Some(active)) = (self.stage.as_mut(), self.active.as_ref()) else {
            return TickOutcome::Idle;
        };

        let eased = active.eased(now);
        match write_frame(stage, active, eased) {
            Ok(()) => TickOutcome::Running(t),
            Err(e) => {
                error!(error = %e, to = active.to, "Transition frame failed");
                self.finish(Some(ForceReason::FrameError))
            }
        }
    }

    /// Force-complete the transition if its watchdog deadline has passed.
    ///
    /// [`tick`](Self::tick) checks it for unfinished tweens; call it on its
    /// own when frames are not being produced.
    pub fn poll_watchdog(&mut self) -> Option<TickOutcome> {
        let deadline = self.active.as_ref()?.deadline;
        if self.clock.now() < deadline {
            return None;
        }
        Some(self.finish(Some(ForceReason::Watchdog)))
    }

    /// Drop the transition in flight without settling or notifying
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(from = active.from, to = active.to, "Transition cancelled");
        }
    }

    fn finish(&mut self, forced: Option<ForceReason>) -> TickOutcome {
        let Some(active) = self.active.take() else {
            return TickOutcome::Idle;
        };
        if let Some(stage) = self.stage.as_mut() {
            settle(stage, &active);
        }
        let section = active.to;

        match forced {
            None => info!(section, "Transition complete"),
            Some(reason) => error!(
                section,
                %reason,
                "Transition force-completed"
            ),
        }

        match self.on_complete.as_mut() {
            Some(handler) => handler(),
            None => warn!("No completion handler registered"),
        }

        match forced {
            None => TickOutcome::Completed { section },
            Some(reason) => TickOutcome::ForceCompleted { section, reason },
        }
    }
}

/// Write camera and page state for one eased fraction
fn write_frame(stage: &mut Stage, active: &ActiveTransition, eased: f64) -> Result<(), SceneError> {
    stage.camera_mut().set_pose(active.camera_at(eased))?;

    for page in stage.pages_mut() {
        let track = active
            .tracks
            .get(&page.id())
            .ok_or(SceneError::PageMissing(page.index()))?;
        page.apply_visual(track.at(eased));
        page.update_transform_sync()?;
    }
    Ok(())
}

/// Snap to the exact end values and hide every page but the target
fn settle(stage: &mut Stage, active: &ActiveTransition) {
    if let Err(e) = stage.camera_mut().set_pose(active.camera_end) {
        error!(error = %e, "Failed to place camera at transition end");
    }

    for page in stage.pages_mut() {
        if let Some(track) = active.tracks.get(&page.id()) {
            page.apply_visual(track.end);
        }
        if page.index() != active.to {
            page.hide();
        }
        if let Err(e) = page.update_transform_sync() {
            error!(error = %e, page = page.id(), "Failed to sync overlay at transition end");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use glam::Vec3;

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::{FolioConfig, LayoutConfig};
    use crate::deck::Deck;

    struct Harness {
        driver: TransitionDriver,
        clock: ManualClock,
        completions: Rc<Cell<u32>>,
    }

    fn harness() -> Harness {
        harness_with(FolioConfig::default())
    }

    fn harness_with(config: FolioConfig) -> Harness {
        let clock = ManualClock::new();
        let mut driver = TransitionDriver::new(
            config.timing(),
            config.transition.easing,
            Rc::new(clock.clone()),
        );
        let stage = Stage::new(&Deck::builtin(), config.layout.clone()).unwrap();
        let completions = Rc::new(Cell::new(0));
        let counter = completions.clone();
        driver.initialize(stage, move || counter.set(counter.get() + 1));
        Harness {
            driver,
            clock,
            completions,
        }
    }

    /// Tick at ~60fps until the driver goes idle
    fn run_to_end(h: &mut Harness) -> TickOutcome {
        for _ in 0..200 {
            h.clock.advance_ms(16);
            match h.driver.tick() {
                TickOutcome::Running(_) => continue,
                outcome => return outcome,
            }
        }
        panic!("transition did not finish");
    }

    fn visuals(driver: &TransitionDriver) -> Vec<(bool, PageVisual)> {
        driver
            .stage()
            .unwrap()
            .pages()
            .iter()
            .map(|p| (p.is_visible(), p.visual()))
            .collect()
    }

    #[test]
    fn test_uninitialized_driver_refuses() {
        let config = FolioConfig::default();
        let mut driver = TransitionDriver::new(
            config.timing(),
            EasingType::QuadraticInOut,
            Rc::new(ManualClock::new()),
        );
        assert_eq!(driver.transition_to_section(1), Err(TransitionError::NotInitialized));
        assert_eq!(driver.tick(), TickOutcome::Idle);
    }

    #[test]
    fn test_invalid_target_is_noop() {
        let mut h = harness();
        let before = visuals(&h.driver);
        assert_eq!(
            h.driver.transition_to_section(10),
            Err(TransitionError::InvalidTarget { target: 10, len: 10 })
        );
        assert_eq!(
            h.driver.transition_to_section(0),
            Err(TransitionError::AlreadyAtTarget(0))
        );
        assert!(!h.driver.is_transitioning());
        assert_eq!(visuals(&h.driver), before);
    }

    #[test]
    fn test_transition_ends_with_single_focused_page() {
        for (from, to) in [(0, 1), (0, 9), (2, 7), (9, 0)] {
            let mut h = harness();
            if from != 0 {
                h.driver.transition_to_section(from).unwrap();
                run_to_end(&mut h);
            }
            h.driver.transition_to_section(to).unwrap();
            assert_eq!(run_to_end(&mut h), TickOutcome::Completed { section: to });

            let stage = h.driver.stage().unwrap();
            assert_eq!(stage.focused_pages(), vec![to]);
            assert_eq!(stage.pages().iter().filter(|p| p.is_visible()).count(), 1);
            assert_eq!(stage.camera().pose(), stage.camera_pose_for(to).unwrap());
            assert_eq!(h.driver.current_section(), to);
            assert!(!h.driver.is_transitioning());
        }
    }

    #[test]
    fn test_midway_both_pages_visible() {
        let mut h = harness();
        h.driver.transition_to_section(1).unwrap();
        h.clock.advance_ms(400);
        assert!(matches!(h.driver.tick(), TickOutcome::Running(t) if (t - 0.5).abs() < 1e-9));

        let stage = h.driver.stage().unwrap();
        let outgoing = stage.page(0).unwrap();
        let incoming = stage.page(1).unwrap();
        assert!(outgoing.is_visible() && incoming.is_visible());
        assert!((outgoing.opacity() - 0.5).abs() < 1e-5);
        assert!((incoming.opacity() - 0.5).abs() < 1e-5);
        // Overlay follows the node every frame
        assert_eq!(incoming.overlay().position, incoming.node().translation);
        assert!((stage.camera().position() - Vec3::new(0.0, -9.0, 12.0)).length() < 1e-4);
    }

    #[test]
    fn test_round_trip_restores_rest_state() {
        let mut h = harness();
        let initial = visuals(&h.driver);

        h.driver.transition_to_section(3).unwrap();
        run_to_end(&mut h);
        h.driver.transition_to_section(0).unwrap();
        run_to_end(&mut h);

        for ((vis_a, a), (vis_b, b)) in initial.iter().zip(visuals(&h.driver)) {
            assert_eq!(*vis_a, vis_b);
            assert!(a.approx_eq(&b, f32::EPSILON));
        }
        assert_eq!(h.completions.get(), 2);
    }

    #[test]
    fn test_completion_notified_exactly_once() {
        let mut h = harness();
        h.driver.transition_to_section(2).unwrap();
        run_to_end(&mut h);
        for _ in 0..10 {
            h.clock.advance_ms(500);
            assert_eq!(h.driver.tick(), TickOutcome::Idle);
        }
        assert_eq!(h.driver.poll_watchdog(), None);
        assert_eq!(h.completions.get(), 1);
    }

    #[test]
    fn test_new_request_cancels_transition_in_flight() {
        let mut h = harness();
        h.driver.transition_to_section(1).unwrap();
        h.clock.advance_ms(400);
        h.driver.tick();

        h.driver.transition_to_section(2).unwrap();
        assert_eq!(h.driver.active().map(|a| a.from), Some(1));
        assert_eq!(run_to_end(&mut h), TickOutcome::Completed { section: 2 });

        let stage = h.driver.stage().unwrap();
        assert_eq!(stage.focused_pages(), vec![2]);
        let inactive = PageVisual::inactive(&LayoutConfig::default());
        for index in [0, 1] {
            let page = stage.page(index).unwrap();
            assert!(!page.is_visible());
            assert!(page.visual().approx_eq(&inactive, 1e-6));
        }
        assert_eq!(h.completions.get(), 1);
    }

    #[test]
    fn test_watchdog_force_completes_stalled_transition() {
        let mut h = harness();
        h.driver.transition_to_section(1).unwrap();
        let deadline = h.driver.watchdog_deadline().unwrap();

        // No frames at all: the tween is stalled
        h.clock.advance(Duration::from_millis(1599));
        assert_eq!(h.driver.poll_watchdog(), None);
        assert!(h.driver.is_transitioning());

        h.clock.advance(Duration::from_millis(2));
        assert!(h.clock.now() >= deadline);
        assert_eq!(
            h.driver.poll_watchdog(),
            Some(TickOutcome::ForceCompleted {
                section: 1,
                reason: ForceReason::Watchdog
            })
        );
        assert!(!h.driver.is_transitioning());
        assert_eq!(h.completions.get(), 1);
        assert_eq!(h.driver.stage().unwrap().focused_pages(), vec![1]);
    }

    #[test]
    fn test_late_frame_completes_normally() {
        let mut h = harness();
        h.driver.transition_to_section(1).unwrap();

        // First frame after a stall lands past the watchdog deadline
        h.clock.advance_ms(2000);
        assert_eq!(h.driver.tick(), TickOutcome::Completed { section: 1 });
        assert_eq!(h.completions.get(), 1);
        assert_eq!(h.driver.stage().unwrap().focused_pages(), vec![1]);
    }

    #[test]
    fn test_unrepresentable_deadline_refused() {
        for factor in [f64::INFINITY, 1.2e19] {
            let mut config = FolioConfig::default();
            config.transition.watchdog_factor = factor;
            let mut h = harness_with(config);

            assert!(matches!(
                h.driver.transition_to_section(1),
                Err(TransitionError::DeadlineOverflow(_))
            ));
            assert!(!h.driver.is_transitioning());
            assert_eq!(h.driver.current_section(), 0);
            assert_eq!(h.driver.stage().unwrap().focused_pages(), vec![0]);

            h.clock.advance_ms(16);
            assert_eq!(h.driver.tick(), TickOutcome::Idle);
            assert_eq!(h.completions.get(), 0);
        }
    }

    #[test]
    fn test_frame_error_force_completes() {
        let mut h = harness();
        h.driver.transition_to_section(1).unwrap();
        h.driver.stage_mut().unwrap().page_mut(4).unwrap().node_mut().translation.x = f32::NAN;

        h.clock.advance_ms(16);
        assert_eq!(
            h.driver.tick(),
            TickOutcome::ForceCompleted {
                section: 1,
                reason: ForceReason::FrameError
            }
        );
        assert!(!h.driver.is_transitioning());
        assert_eq!(h.completions.get(), 1);

        h.clock.advance_ms(2000);
        assert_eq!(h.driver.tick(), TickOutcome::Idle);
        assert_eq!(h.completions.get(), 1);
    }

    #[test]
    fn test_cancel_does_not_notify() {
        let mut h = harness();
        h.driver.transition_to_section(1).unwrap();
        h.driver.cancel();
        assert!(!h.driver.is_transitioning());
        h.clock.advance_ms(5000);
        assert_eq!(h.driver.tick(), TickOutcome::Idle);
        assert_eq!(h.completions.get(), 0);
    }
}
