pub mod clock;
pub mod config;
pub mod coordinator;
pub mod deck;
pub mod error;
pub mod runtime;
pub mod scene;
pub mod scroll;
pub mod transition;

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use config::{EasingType, FolioConfig, LayoutConfig, ScrollConfig, TransitionTiming};
pub use coordinator::Coordinator;
pub use deck::{Deck, PageDefinition};
pub use error::{Error, Result, SceneError, TransitionError};
pub use runtime::{Command, FrameLoop, PresentationEvent, PresentationRuntime, Renderer};
