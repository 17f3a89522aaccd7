//! Section transitions
//!
//! - `easing` - Pure easing curves
//! - `timing` - Progress and interpolation helpers
//! - `record` - The in-flight transition record
//! - `driver` - State machine that runs transitions to completion

pub mod driver;
pub mod easing;
pub mod record;
pub mod timing;

pub use driver::{CompletionHandler, ForceReason, TickOutcome, TransitionDriver};
pub use easing::{EasingType, EasingTypeExt};
pub use record::{ActiveTransition, VisualTrack};
