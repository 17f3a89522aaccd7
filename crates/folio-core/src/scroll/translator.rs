//! Turns smoothed scroll input into discrete section steps.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, error, info, trace, warn};

use crate::clock::Clock;

use super::gate::ScrollGate;

/// Receives the target section of every accepted step
pub type Listener = Rc<dyn Fn(usize) -> anyhow::Result<()>>;

/// Handle returned by [`ScrollTranslator::add_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// One smoothed scroll sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    /// -1 = up, 0 = none, +1 = down
    pub direction: i8,
    /// Non-negative speed
    pub velocity: f64,
}

impl ScrollEvent {
    pub fn new(direction: i8, velocity: f64) -> Self {
        let velocity = if velocity.is_nan() { 0.0 } else { velocity.abs() };
        Self {
            direction: direction.signum(),
            velocity,
        }
    }

    pub fn down(velocity: f64) -> Self {
        Self::new(1, velocity)
    }

    pub fn up(velocity: f64) -> Self {
        Self::new(-1, velocity)
    }
}

/// What became of a scroll event or navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Listeners were notified with this target
    Triggered(usize),
    /// A transition is still running
    Busy,
    /// Too soon after the previous step
    CoolingDown,
    /// No direction or too slow
    BelowThreshold,
    /// Would leave the first or last section
    AtBoundary,
    /// Navigation target out of range or already current
    Invalid,
    /// Scroll handling is stopped
    Suspended,
}

impl StepOutcome {
    pub fn triggered(&self) -> Option<usize> {
        match self {
            StepOutcome::Triggered(target) => Some(*target),
            _ => None,
        }
    }
}

pub struct ScrollTranslator {
    gate: ScrollGate,
    clock: Rc<dyn Clock>,
    velocity_threshold: f64,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_listener: Cell<u64>,
    suspended: Cell<bool>,
}

impl fmt::Debug for ScrollTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollTranslator")
            .field("gate", &self.gate.snapshot())
            .field("velocity_threshold", &self.velocity_threshold)
            .field("listeners", &self.listeners.borrow().len())
            .field("suspended", &self.suspended.get())
            .finish()
    }
}

impl ScrollTranslator {
    pub fn new(
        total_sections: usize,
        cooldown: Duration,
        velocity_threshold: f64,
        clock: Rc<dyn Clock>,
    ) -> Self {
        debug!(
            total_sections,
            cooldown_ms = cooldown.as_millis() as u64,
            velocity_threshold,
            "Scroll translator created"
        );
        Self {
            gate: ScrollGate::new(total_sections, cooldown),
            clock,
            velocity_threshold,
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            suspended: Cell::new(false),
        }
    }

    /// Shared gate handle, for wiring the driver's completion signal
    pub fn gate(&self) -> &ScrollGate {
        &self.gate
    }

    pub fn current_section(&self) -> usize {
        self.gate.current_section()
    }

    pub fn is_transitioning(&self) -> bool {
        self.gate.is_transitioning()
    }

    /// Interpret one smoothed scroll sample
    pub fn on_scroll_event(&self, event: ScrollEvent) -> StepOutcome {
        if self.suspended.get() {
            return StepOutcome::Suspended;
        }
        let now = self.clock.now();
        if let Err(outcome) = self.gate.check_ready(now) {
            trace!(?outcome, "Scroll event dropped");
            return outcome;
        }

        if event.direction == 0 || event.velocity <= self.velocity_threshold {
            return StepOutcome::BelowThreshold;
        }

        let current = self.gate.current_section();
        let total = self.gate.total_sections();
        let target = if event.direction > 0 && current + 1 < total {
            current + 1
        } else if event.direction < 0 && current > 0 {
            current - 1
        } else {
            trace!(current, direction = event.direction, "Scroll step at boundary dropped");
            return StepOutcome::AtBoundary;
        };

        self.trigger(current, target, now)
    }

    /// Navigate directly to `index`, bypassing the velocity check
    pub fn go_to_section(&self, index: usize) -> StepOutcome {
        let current = self.gate.current_section();
        if index >= self.gate.total_sections() || index == current {
            warn!(index, current, "Invalid or current section requested");
            return StepOutcome::Invalid;
        }
        if self.gate.is_transitioning() {
            warn!(index, "Transition already in progress");
            return StepOutcome::Busy;
        }
        self.trigger(current, index, self.clock.now())
    }

    pub fn notify_transition_complete(&self) {
        self.gate.notify_transition_complete();
    }

    fn trigger(&self, from: usize, target: usize, now: std::time::Instant) -> StepOutcome {
        self.gate.claim(target, now);
        info!(from, to = target, "Section step accepted");
        self.notify_listeners(target);
        StepOutcome::Triggered(target)
    }

    /// Call every listener with `target`.
    ///
    /// Iterates a snapshot, so listeners may add or remove listeners while
    /// being notified. A failing or panicking listener is logged and skipped.
    fn notify_listeners(&self, target: usize) {
        let snapshot: Vec<(ListenerId, Listener)> = self.listeners.borrow().clone();
        if snapshot.is_empty() {
            warn!(target, "No scroll listeners registered");
            return;
        }

        for (id, listener) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| listener(target))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(listener = id.0, target, error = %e, "Scroll listener failed");
                }
                Err(_) => {
                    error!(listener = id.0, target, "Scroll listener panicked");
                }
            }
        }
    }

    pub fn add_listener(&self, listener: impl Fn(usize) -> anyhow::Result<()> + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        debug!(listener = id.0, total = self.listener_count(), "Scroll listener added");
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        let removed = listeners.len() < before;
        if !removed {
            warn!(listener = id.0, "Scroll listener not found");
        }
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn clear_listeners(&self) {
        self.listeners.borrow_mut().clear();
    }

    /// Ignore scroll events until [`start`](Self::start)
    pub fn stop(&self) {
        debug!("Scroll input stopped");
        self.suspended.set(true);
    }

    pub fn start(&self) {
        debug!("Scroll input started");
        self.suspended.set(false);
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.get()
    }
}
