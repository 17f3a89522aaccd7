//! Wheel smoothing: turns raw wheel notches into per-frame scroll events.
//!
//! Each notch moves a target offset. Every frame the animated offset covers a
//! fixed fraction of the remaining distance, and the distance covered that
//! frame is reported as the velocity. One notch therefore produces a burst of
//! events that starts fast and decays.

use super::translator::ScrollEvent;

/// Offset units moved by one wheel line at multiplier 1.0
pub const PIXELS_PER_LINE: f64 = 100.0;

/// Distance below which the animation snaps onto its target
const SETTLE_DISTANCE: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct WheelSmoother {
    target: f64,
    animated: f64,
    velocity: f64,
    lerp: f64,
    multiplier: f64,
}

impl WheelSmoother {
    pub fn new(lerp: f64, multiplier: f64) -> Self {
        Self {
            target: 0.0,
            animated: 0.0,
            velocity: 0.0,
            lerp: lerp.clamp(0.01, 1.0),
            multiplier,
        }
    }

    /// Queue a wheel movement in lines (positive = down)
    pub fn push_lines(&mut self, lines: f64) {
        self.target += lines * PIXELS_PER_LINE * self.multiplier;
    }

    /// Advance one frame. Returns an event while the offset is still moving.
    pub fn tick(&mut self) -> Option<ScrollEvent> {
        let previous = self.animated;
        self.animated += (self.target - self.animated) * self.lerp;
        if (self.target - self.animated).abs() < SETTLE_DISTANCE {
            self.animated = self.target;
        }
        self.velocity = self.animated - previous;

        if self.velocity == 0.0 {
            return None;
        }
        let direction = if self.velocity > 0.0 { 1 } else { -1 };
        Some(ScrollEvent::new(direction, self.velocity.abs()))
    }

    /// Signed distance covered in the last frame
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn is_settled(&self) -> bool {
        self.animated == self.target
    }

    /// Drop any pending movement
    pub fn reset(&mut self) {
        self.target = self.animated;
        self.velocity = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_notch_decays_then_settles() {
        let mut smoother = WheelSmoother::new(0.08, 1.0);
        smoother.push_lines(1.0);

        let first = smoother.tick().unwrap();
        assert_eq!(first.direction, 1);
        assert!((first.velocity - 8.0).abs() < 1e-9);

        let mut frames = 1;
        while let Some(event) = smoother.tick() {
            assert_eq!(event.direction, 1);
            assert!(event.velocity < first.velocity);
            frames += 1;
            assert!(frames < 1000);
        }
        assert!(smoother.is_settled());
        assert_eq!(smoother.tick(), None);
    }

    #[test]
    fn test_upward_notch() {
        let mut smoother = WheelSmoother::new(0.5, 2.0);
        smoother.push_lines(-1.0);
        let event = smoother.tick().unwrap();
        assert_eq!(event.direction, -1);
        assert!((event.velocity - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_drops_pending_motion() {
        let mut smoother = WheelSmoother::new(0.08, 1.0);
        smoother.push_lines(3.0);
        smoother.tick();
        smoother.reset();
        assert_eq!(smoother.tick(), None);
        assert!(smoother.is_settled());
    }
}
