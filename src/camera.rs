/// Camera panning along the entry strip
///
/// The camera only ever moves on the X axis. Setting a target starts an
/// animation; each tick moves the camera a fraction of the remaining
/// distance until it is close enough to snap.

use cgmath::{InnerSpace, Vector3, VectorSpace};

/// Distance under which the camera snaps onto its target
const SNAP_DISTANCE: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    position: Vector3<f32>,
    target: Vector3<f32>,
    pan_speed: f32,
    animating: bool,
}

impl CameraRig {
    pub fn new(position: Vector3<f32>, pan_speed: f32) -> Self {
        Self {
            position,
            target: position,
            pan_speed,
            animating: false,
        }
    }

    /// Target X position the camera should tween to
    pub fn set_target_x(&mut self, x: f32) {
        self.target = Vector3::new(x, self.position.y, self.position.z);
        self.animating = true;
    }

    /// Advance the tween by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        if !self.animating {
            return;
        }

        if (self.target - self.position).magnitude() > SNAP_DISTANCE {
            let t = (dt * self.pan_speed).clamp(0.0, 1.0);
            self.position = self.position.lerp(self.target, t);
        } else {
            self.position = self.target;
            self.animating = false;
        }
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn target_x(&self) -> f32 {
        self.target.x
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.0, -10.0), 10.0)
    }
}
