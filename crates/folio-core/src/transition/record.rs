use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::config::EasingType;
use crate::scene::{CameraPose, PageId, PageVisual};

use super::easing::EasingTypeExt;
use super::timing::{lerp_vec3, lerp_visual, progress};

/// Start and end visual of one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualTrack {
    pub index: usize,
    pub start: PageVisual,
    pub end: PageVisual,
}

impl VisualTrack {
    pub fn at(&self, eased: f64) -> PageVisual {
        lerp_visual(self.start, self.end, eased)
    }
}

/// The one in-flight transition
#[derive(Debug, Clone)]
pub struct ActiveTransition {
    pub from: usize,
    pub to: usize,
    pub start: Instant,
    pub duration: Duration,
    pub easing: EasingType,
    /// Force-completion time if the tween never finishes on its own
    pub deadline: Instant,
    pub camera_start: CameraPose,
    pub camera_end: CameraPose,
    pub tracks: BTreeMap<PageId, VisualTrack>,
}

impl ActiveTransition {
    /// Raw progress in [0, 1]
    pub fn progress(&self, now: Instant) -> f64 {
        progress(self.start, self.duration, now)
    }

    pub fn camera_at(&self, eased: f64) -> CameraPose {
        CameraPose {
            position: lerp_vec3(self.camera_start.position, self.camera_end.position, eased),
            target: lerp_vec3(self.camera_start.target, self.camera_end.target, eased),
        }
    }

    pub fn eased(&self, now: Instant) -> f64 {
        self.easing.apply(self.progress(now))
    }
}
