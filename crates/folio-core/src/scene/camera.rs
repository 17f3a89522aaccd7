use glam::{Mat3, Quat, Vec3};

use crate::error::SceneError;

/// Position and look-at point of the camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

/// Perspective camera handle. Orientation is derived from the look-at target.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    rotation: Quat,
    /// Vertical field of view in degrees
    pub fov_y: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            up: Vec3::Y,
            rotation: Quat::IDENTITY,
            fov_y: 60.0,
        }
    }
}

impl Camera {
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            target: self.target,
        }
    }

    /// Unit vector the camera looks along
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn set_position(&mut self, position: Vec3) -> Result<(), SceneError> {
        if !position.is_finite() {
            return Err(SceneError::NonFinite {
                what: "camera position".to_string(),
            });
        }
        self.position = position;
        Ok(())
    }

    /// Orient the camera towards `target`
    pub fn look_at(&mut self, target: Vec3) -> Result<(), SceneError> {
        if !target.is_finite() {
            return Err(SceneError::NonFinite {
                what: "camera target".to_string(),
            });
        }
        let forward = (target - self.position).try_normalize().ok_or(SceneError::DegenerateLookAt)?;

        // Looking straight along the up axis leaves the roll undefined
        let up = if forward.cross(self.up).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            self.up
        };
        let right = forward.cross(up).normalize();
        let true_up = right.cross(forward);

        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, true_up, -forward));
        self.target = target;
        Ok(())
    }

    pub fn set_pose(&mut self, pose: CameraPose) -> Result<(), SceneError> {
        self.set_position(pose.position)?;
        self.look_at(pose.target)
    }
}
