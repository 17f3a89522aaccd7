//! Wires scroll input to the transition driver and back.

use std::cell::{Ref, RefCell};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;
use std::time::Instant;

use anyhow::anyhow;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::config::FolioConfig;
use crate::deck::Deck;
use crate::scene::Stage;
use crate::scroll::{ListenerId, ScrollEvent, ScrollTranslator, StepOutcome};
use crate::transition::{TickOutcome, TransitionDriver};

/// Owns the translator and the driver of one presentation.
///
/// Accepted steps reach the driver through a translator listener; the
/// driver's completion handler releases the translator's gate.
pub struct Coordinator {
    translator: Rc<ScrollTranslator>,
    driver: Rc<RefCell<TransitionDriver>>,
    driver_listener: ListenerId,
}

impl Coordinator {
    pub fn new(config: &FolioConfig, deck: &Deck, clock: Rc<dyn Clock>) -> crate::Result<Self> {
        config.validate()?;
        let timing = config.timing();
        let stage = Stage::new(deck, config.layout.clone())?;

        let translator = Rc::new(ScrollTranslator::new(
            stage.len(),
            timing.cooldown,
            config.scroll.velocity_threshold,
            clock.clone(),
        ));
        let driver = Rc::new(RefCell::new(TransitionDriver::new(
            timing,
            config.transition.easing,
            clock,
        )));

        let gate = translator.gate().clone();
        driver
            .borrow_mut()
            .initialize(stage, move || gate.notify_transition_complete());

        let target_driver = driver.clone();
        let gate = translator.gate().clone();
        let driver_listener = translator.add_listener(move |target| {
            let Ok(mut driver) = target_driver.try_borrow_mut() else {
                gate.notify_transition_complete();
                return Err(anyhow!("transition driver busy, step to {} dropped", target));
            };
            // Any way out other than Ok leaves the gate following the driver
            match catch_unwind(AssertUnwindSafe(|| driver.transition_to_section(target))) {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => {
                    gate.rollback(driver.current_section());
                    Err(e.into())
                }
                Err(_) => {
                    error!(target, "Transition driver panicked, step rolled back");
                    driver.cancel();
                    gate.rollback(driver.current_section());
                    Err(anyhow!("transition driver panicked, step to {} dropped", target))
                }
            }
        });

        info!(sections = deck.len(), "Presentation ready");
        Ok(Self {
            translator,
            driver,
            driver_listener,
        })
    }

    pub fn on_scroll_event(&self, event: ScrollEvent) -> StepOutcome {
        self.translator.on_scroll_event(event)
    }

    pub fn go_to_section(&self, index: usize) -> StepOutcome {
        self.translator.go_to_section(index)
    }

    /// Advance the running transition by one frame
    pub fn tick(&self) -> TickOutcome {
        match self.driver.try_borrow_mut() {
            Ok(mut driver) => driver.tick(),
            Err(_) => {
                warn!("Frame skipped: transition driver already borrowed");
                TickOutcome::Idle
            }
        }
    }

    pub fn poll_watchdog(&self) -> Option<TickOutcome> {
        self.driver.try_borrow_mut().ok()?.poll_watchdog()
    }

    pub fn watchdog_deadline(&self) -> Option<Instant> {
        self.driver.borrow().watchdog_deadline()
    }

    pub fn stage(&self) -> Option<Ref<'_, Stage>> {
        Ref::filter_map(self.driver.borrow(), |driver| driver.stage()).ok()
    }

    /// Logical section: the target of the last accepted step
    pub fn current_section(&self) -> usize {
        self.translator.current_section()
    }

    pub fn total_sections(&self) -> usize {
        self.translator.gate().total_sections()
    }

    /// True from the moment a step is accepted until its transition ends
    pub fn is_transitioning(&self) -> bool {
        self.translator.is_transitioning()
    }

    pub fn translator(&self) -> &Rc<ScrollTranslator> {
        &self.translator
    }

    pub fn driver(&self) -> &Rc<RefCell<TransitionDriver>> {
        &self.driver
    }

    pub fn add_listener(&self, listener: impl Fn(usize) -> anyhow::Result<()> + 'static) -> ListenerId {
        self.translator.add_listener(listener)
    }

    /// Remove a listener. The driver's own listener cannot be removed.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        if id == self.driver_listener {
            warn!("Refusing to remove the transition driver listener");
            return false;
        }
        self.translator.remove_listener(id)
    }
}
