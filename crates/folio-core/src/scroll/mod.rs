//! Scroll input handling
//!
//! - `smoothing` - Raw wheel deltas to smoothed per-frame scroll events
//! - `gate` - Busy flag and cooldown shared with the transition driver
//! - `translator` - Scroll events to discrete section steps, listener fan-out
//!
//! # Usage
//!
//! ```ignore
//! use folio_core::scroll::{ScrollEvent, ScrollTranslator};
//!
//! let translator = ScrollTranslator::new(10, cooldown, 0.2, clock);
//! translator.add_listener(|target| {
//!     println!("move to {target}");
//!     Ok(())
//! });
//!
//! translator.on_scroll_event(ScrollEvent::down(1.0));
//! // ... once the animation has finished:
//! translator.notify_transition_complete();
//! ```

pub mod gate;
pub mod smoothing;
pub mod translator;

pub use gate::{GateState, ScrollGate};
pub use smoothing::WheelSmoother;
pub use translator::{Listener, ListenerId, ScrollEvent, ScrollTranslator, StepOutcome};
