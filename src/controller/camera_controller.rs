use glam::Vec3;
use crate::config::CameraConfig;
use crate::model::Camera;

/// Spherical placement of the camera around a fixed target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitRig {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
}

const PITCH_LIMIT: f32 = 1.5;

impl OrbitRig {
    /// Rig that reproduces `eye` looking at `target` (distance clamped later by the controller)
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length();
        let (yaw, pitch) = if distance > f32::EPSILON {
            (offset.x.atan2(offset.z), (offset.y / distance).asin())
        } else {
            (0.0, 0.0)
        };
        Self {
            target,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            distance,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(sy * cp, sp, cy * cp) * self.distance
    }

    pub fn is_settled(&self) -> bool {
        self.yaw_velocity.abs() < 1e-6 && self.pitch_velocity.abs() < 1e-6
    }
}

/// Drag-to-orbit and wheel zoom with damped motion
pub struct CameraController {
    pub rotate_sensitivity: f32,
    pub zoom_sensitivity: f32,
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl CameraController {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            rotate_sensitivity: config.rotate_sensitivity,
            zoom_sensitivity: config.zoom_sensitivity,
            damping: config.damping,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
        }
    }

    /// Queue a pointer drag; applied gradually by `update`
    pub fn apply_look(&self, rig: &mut OrbitRig, dx: f32, dy: f32) {
        rig.yaw_velocity -= dx * self.rotate_sensitivity;
        rig.pitch_velocity += dy * self.rotate_sensitivity;
    }

    /// Wheel zoom; positive delta moves away from the target
    pub fn apply_zoom(&self, rig: &mut OrbitRig, delta: f32) {
        if delta != 0.0 {
            rig.distance *= (delta * self.zoom_sensitivity).exp();
        }
    }

    /// Apply a damped share of the queued rotation and place the camera
    pub fn update(&self, rig: &mut OrbitRig, camera: &mut Camera) {
        rig.yaw += rig.yaw_velocity * self.damping;
        rig.pitch = (rig.pitch + rig.pitch_velocity * self.damping).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        rig.yaw_velocity *= 1.0 - self.damping;
        rig.pitch_velocity *= 1.0 - self.damping;
        rig.distance = rig.distance.clamp(self.min_distance, self.max_distance);

        camera.eye = rig.eye();
        camera.set_look_at(rig.target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (CameraController, OrbitRig, Camera) {
        let config = CameraConfig::default();
        let rig = OrbitRig::looking_at(config.eye, config.target);
        (CameraController::new(&config), rig, Camera::new(800, 600, &config))
    }

    #[test]
    fn test_rig_reproduces_eye() {
        let eye = Vec3::new(1.0, 2.0, 6.0);
        let rig = OrbitRig::looking_at(eye, Vec3::ZERO);
        assert!(rig.eye().abs_diff_eq(eye, 1e-4));
    }

    #[test]
    fn test_distance_is_clamped() {
        let (ctl, mut rig, mut cam) = setup();
        ctl.apply_zoom(&mut rig, 10_000.0);
        ctl.update(&mut rig, &mut cam);
        assert!((rig.distance - ctl.max_distance).abs() < 1e-5);
        assert!((cam.eye.distance(rig.target) - ctl.max_distance).abs() < 1e-3);

        ctl.apply_zoom(&mut rig, -10_000.0);
        ctl.update(&mut rig, &mut cam);
        assert!((rig.distance - ctl.min_distance).abs() < 1e-5);
    }

    #[test]
    fn test_drag_is_damped_and_settles() {
        let (ctl, mut rig, mut cam) = setup();
        ctl.update(&mut rig, &mut cam);
        let start = rig.yaw;

        ctl.apply_look(&mut rig, 100.0, 0.0);
        ctl.update(&mut rig, &mut cam);
        let first_step = (rig.yaw - start).abs();
        assert!(first_step > 0.0);

        let total = 100.0 * ctl.rotate_sensitivity;
        assert!(first_step < total, "only part of the drag lands in one frame");

        for _ in 0..1000 {
            ctl.update(&mut rig, &mut cam);
        }
        assert!(rig.is_settled());
        assert!(((rig.yaw - start).abs() - total).abs() < 1e-3);
    }

    #[test]
    fn test_camera_keeps_looking_at_target() {
        let (ctl, mut rig, mut cam) = setup();
        ctl.apply_look(&mut rig, 40.0, 25.0);
        for _ in 0..10 {
            ctl.update(&mut rig, &mut cam);
        }
        let to_target = (rig.target - cam.eye).normalize();
        assert!(cam.forward().abs_diff_eq(to_target, 1e-3));
    }
}
