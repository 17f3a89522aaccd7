//! Pure easing functions mapping progress [0, 1] to eased progress [0, 1]

pub use crate::config::EasingType;

/// Extension trait for EasingType with calculation methods
pub trait EasingTypeExt {
    /// Apply the easing function to a progress value
    ///
    /// # Arguments
    /// * `t` - Progress value in range [0, 1]
    ///
    /// # Returns
    /// Eased value in range [0, 1]
    fn apply(&self, t: f64) -> f64;
}

impl EasingTypeExt for EasingType {
    #[inline]
    fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::Linear => t,
            EasingType::QuadraticInOut => quadratic_in_out(t),
            EasingType::CubicInOut => cubic_in_out(t),
            EasingType::CubicOut => cubic_out(t),
        }
    }
}

/// 2t² for the first half, 1 - 2(1-t)² for the second
#[inline]
fn quadratic_in_out(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        let inv = 1.0 - t;
        1.0 - 2.0 * inv * inv
    }
}

#[inline]
fn cubic_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let inv = 1.0 - t;
        1.0 - 4.0 * inv * inv * inv
    }
}

/// f(t) = 1 - (1-t)³
#[inline]
fn cubic_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}
