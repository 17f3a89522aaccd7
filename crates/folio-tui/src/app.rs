use folio_core::scroll::{ScrollEvent, StepOutcome, WheelSmoother};
use folio_core::transition::TickOutcome;
use folio_core::{Coordinator, FolioConfig};
use tracing::debug;

use crate::input::Action;
use crate::theme::Theme;

/// Keyboard steps bypass smoothing and always clear the velocity threshold
const KEY_STEP_VELOCITY: f64 = f64::INFINITY;

/// Everything the widgets need besides the stage itself
#[derive(Debug, Clone)]
pub struct ViewState {
    pub theme: Theme,
    pub show_nav: bool,
    pub section: usize,
    pub total: usize,
    pub transitioning: bool,
    pub status_message: Option<String>,
}

pub struct App {
    pub coordinator: Coordinator,
    pub smoother: WheelSmoother,
    pub theme: Theme,
    pub show_nav: bool,
    pub status_message: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(coordinator: Coordinator, config: &FolioConfig, theme: Theme) -> Self {
        Self {
            coordinator,
            smoother: WheelSmoother::new(config.scroll.smoothing_lerp, config.scroll.wheel_multiplier),
            theme,
            show_nav: true,
            status_message: None,
            should_quit: false,
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        let outcome = match action {
            Action::Quit => {
                self.should_quit = true;
                return;
            }
            Action::ToggleNav => {
                self.show_nav = !self.show_nav;
                return;
            }
            Action::TogglePause => {
                self.toggle_pause();
                return;
            }
            Action::None => return,
            Action::NextSection => self.step(1),
            Action::PrevSection => self.step(-1),
            Action::FirstSection => self.coordinator.go_to_section(0),
            Action::LastSection => {
                let last = self.coordinator.total_sections().saturating_sub(1);
                self.coordinator.go_to_section(last)
            }
            Action::GoTo(index) => self.coordinator.go_to_section(index),
        };
        self.report(outcome);
    }

    /// Queue a mouse wheel movement
    pub fn on_wheel(&mut self, lines: f64) {
        self.smoother.push_lines(lines);
    }

    /// Feed one frame of smoothed wheel motion to the coordinator
    pub fn update_smoothing(&mut self) {
        if let Some(event) = self.smoother.tick() {
            let outcome = self.coordinator.on_scroll_event(event);
            if outcome.triggered().is_some() {
                self.report(outcome);
            }
        }
    }

    /// Record the result of one animation frame
    pub fn on_tick(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Completed { .. } => self.status_message = None,
            TickOutcome::ForceCompleted { section, reason } => {
                self.status_message = Some(format!("Transition to {} forced ({})", section + 1, reason));
            }
            TickOutcome::Idle | TickOutcome::Running(_) => {}
        }
    }

    /// Stop or restart scroll input. Pending wheel motion is dropped.
    fn toggle_pause(&mut self) {
        let translator = self.coordinator.translator();
        if translator.is_suspended() {
            translator.start();
            self.status_message = None;
        } else {
            translator.stop();
            self.smoother.reset();
            self.status_message = Some("Input paused (p to resume)".to_string());
        }
    }

    /// Frames are needed faster while anything is moving
    pub fn needs_fast_update(&self) -> bool {
        self.coordinator.is_transitioning() || !self.smoother.is_settled()
    }

    pub fn view(&self) -> ViewState {
        ViewState {
            theme: self.theme.clone(),
            show_nav: self.show_nav,
            section: self.coordinator.current_section(),
            total: self.coordinator.total_sections(),
            transitioning: self.coordinator.is_transitioning(),
            status_message: self.status_message.clone(),
        }
    }

    fn step(&mut self, direction: i8) -> StepOutcome {
        self.coordinator
            .on_scroll_event(ScrollEvent::new(direction, KEY_STEP_VELOCITY))
    }

    fn report(&mut self, outcome: StepOutcome) {
        debug!(?outcome, "Navigation input handled");
        self.status_message = match outcome {
            StepOutcome::Triggered(_) | StepOutcome::BelowThreshold => None,
            StepOutcome::Busy => Some("Transition in progress".to_string()),
            StepOutcome::CoolingDown => Some("Slow down".to_string()),
            StepOutcome::AtBoundary => Some("No more sections".to_string()),
            StepOutcome::Invalid => Some("Already there".to_string()),
            StepOutcome::Suspended => Some("Input paused".to_string()),
        };
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use folio_core::{Deck, ManualClock};

    use super::*;

    fn app() -> (App, ManualClock) {
        let clock = ManualClock::new();
        let config = FolioConfig::default();
        let coordinator = Coordinator::new(&config, &Deck::builtin(), Rc::new(clock.clone())).unwrap();
        (App::new(coordinator, &config, Theme::default()), clock)
    }

    fn finish_transition(app: &mut App, clock: &ManualClock) {
        for _ in 0..200 {
            clock.advance_ms(16);
            let outcome = app.coordinator.tick();
            app.on_tick(outcome);
            if !app.coordinator.is_transitioning() {
                return;
            }
        }
        panic!("transition did not finish");
    }

    #[test]
    fn test_key_step_and_busy() {
        let (mut app, _) = app();
        app.handle_action(Action::NextSection);
        assert_eq!(app.coordinator.current_section(), 1);
        assert!(app.needs_fast_update());

        app.handle_action(Action::NextSection);
        assert_eq!(app.coordinator.current_section(), 1);
        assert_eq!(app.status_message.as_deref(), Some("Transition in progress"));
    }

    #[test]
    fn test_jumps() {
        let (mut app, clock) = app();
        app.handle_action(Action::LastSection);
        assert_eq!(app.coordinator.current_section(), 9);
        finish_transition(&mut app, &clock);

        app.handle_action(Action::GoTo(9));
        assert_eq!(app.status_message.as_deref(), Some("Already there"));

        app.handle_action(Action::FirstSection);
        assert_eq!(app.coordinator.current_section(), 0);
    }

    #[test]
    fn test_wheel_notch_moves_one_section() {
        let (mut app, clock) = app();
        app.on_wheel(1.0);
        for _ in 0..200 {
            clock.advance_ms(16);
            app.update_smoothing();
            let outcome = app.coordinator.tick();
            app.on_tick(outcome);
        }
        assert_eq!(app.coordinator.current_section(), 1);
        assert!(!app.needs_fast_update());
    }

    #[test]
    fn test_pause_blocks_scroll_input() {
        let (mut app, _) = app();
        app.on_wheel(2.0);
        app.handle_action(Action::TogglePause);
        assert!(app.smoother.is_settled());

        app.handle_action(Action::NextSection);
        assert_eq!(app.coordinator.current_section(), 0);
        assert_eq!(app.status_message.as_deref(), Some("Input paused"));

        app.handle_action(Action::TogglePause);
        app.handle_action(Action::NextSection);
        assert_eq!(app.coordinator.current_section(), 1);
    }

    #[test]
    fn test_quit_and_nav_toggle() {
        let (mut app, _) = app();
        app.handle_action(Action::ToggleNav);
        assert!(!app.view().show_nav);
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }
}
