use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::debug;

use super::translator::StepOutcome;

/// Mutual exclusion and cooldown state shared by the translator and the driver
#[derive(Debug, Clone)]
pub struct GateState {
    pub current_section: usize,
    pub total_sections: usize,
    pub is_transitioning: bool,
    pub last_trigger: Option<Instant>,
    pub cooldown: Duration,
}

/// Cloneable handle to the gate. Clones share state.
#[derive(Debug, Clone)]
pub struct ScrollGate {
    state: Rc<RefCell<GateState>>,
}

impl ScrollGate {
    pub fn new(total_sections: usize, cooldown: Duration) -> Self {
        Self {
            state: Rc::new(RefCell::new(GateState {
                current_section: 0,
                total_sections,
                is_transitioning: false,
                last_trigger: None,
                cooldown,
            })),
        }
    }

    pub fn snapshot(&self) -> GateState {
        self.state.borrow().clone()
    }

    pub fn current_section(&self) -> usize {
        self.state.borrow().current_section
    }

    pub fn total_sections(&self) -> usize {
        self.state.borrow().total_sections
    }

    pub fn is_transitioning(&self) -> bool {
        self.state.borrow().is_transitioning
    }

    /// Release the busy flag. The only way input is unblocked after a step.
    pub fn notify_transition_complete(&self) {
        let mut state = self.state.borrow_mut();
        state.is_transitioning = false;
        debug!(section = state.current_section, "Scroll gate released");
    }

    /// Undo a claimed step the driver refused
    pub fn rollback(&self, section: usize) {
        let mut state = self.state.borrow_mut();
        debug!(from = state.current_section, to = section, "Scroll gate rolled back");
        state.current_section = section;
        state.is_transitioning = false;
    }

    /// Busy and cooldown checks for scroll input
    pub(crate) fn check_ready(&self, now: Instant) -> Result<(), StepOutcome> {
        let state = self.state.borrow();
        if state.is_transitioning {
            return Err(StepOutcome::Busy);
        }
        if let Some(last) = state.last_trigger {
            if now.saturating_duration_since(last) < state.cooldown {
                return Err(StepOutcome::CoolingDown);
            }
        }
        Ok(())
    }

    /// Mark a step as accepted: busy, cooldown restarted, section moved
    pub(crate) fn claim(&self, target: usize, now: Instant) {
        let mut state = self.state.borrow_mut();
        state.is_transitioning = true;
        state.last_trigger = Some(now);
        state.current_section = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_and_release() {
        let gate = ScrollGate::new(3, Duration::from_millis(800));
        let now = Instant::now();
        assert!(gate.check_ready(now).is_ok());

        gate.claim(1, now);
        assert!(gate.is_transitioning());
        assert_eq!(gate.current_section(), 1);
        assert_eq!(gate.check_ready(now), Err(StepOutcome::Busy));

        gate.notify_transition_complete();
        assert_eq!(
            gate.check_ready(now + Duration::from_millis(500)),
            Err(StepOutcome::CoolingDown)
        );
        assert!(gate.check_ready(now + Duration::from_millis(800)).is_ok());
    }

    #[test]
    fn test_rollback() {
        let gate = ScrollGate::new(3, Duration::from_millis(800));
        gate.claim(2, Instant::now());
        gate.rollback(0);
        assert_eq!(gate.current_section(), 0);
        assert!(!gate.is_transitioning());
    }
}
