//! Time calculation and interpolation helpers for transitions

use std::time::{Duration, Instant};

use glam::Vec3;

use crate::scene::PageVisual;

/// Calculate animation progress (0.0 to 1.0) at `now`
///
/// # Arguments
/// * `start` - Animation start time
/// * `duration` - Total animation duration
/// * `now` - Current time
///
/// # Returns
/// Progress value clamped to [0.0, 1.0]
#[inline]
pub fn progress(start: Instant, duration: Duration, now: Instant) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(start);
    let ratio = elapsed.as_secs_f64() / duration.as_secs_f64();
    ratio.clamp(0.0, 1.0)
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(from: f32, to: f32, t: f64) -> f32 {
    from + (to - from) * t as f32
}

#[inline]
pub fn lerp_vec3(from: Vec3, to: Vec3, t: f64) -> Vec3 {
    from.lerp(to, t as f32)
}

pub fn lerp_visual(from: PageVisual, to: PageVisual, t: f64) -> PageVisual {
    PageVisual {
        opacity: lerp(from.opacity, to.opacity, t),
        scale: lerp(from.scale, to.scale, t),
        depth: lerp(from.depth, to.depth, t),
    }
}
