use glam::{Mat4, Vec2, Vec3};

use crate::config::CameraConfig;
use crate::model::ray::Ray;

pub struct Camera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32, config: &CameraConfig) -> Self {
        let mut camera = Self {
            eye: config.eye,
            yaw: 0.0,
            pitch: 0.0,
            up: Vec3::Y,
            fov_y: config.fov_y_deg.to_radians(),
            aspect: 1.0,
            z_near: config.z_near,
            z_far: config.z_far,
        };
        camera.set_aspect(width, height);
        camera.set_look_at(config.target);
        camera
    }

    pub fn forward(&self) -> Vec3 {
        let cy = self.yaw;
        let cp = self.pitch.clamp(-1.5533, 1.5533); // Slightly less than π/2 to avoid gimbal lock
        Vec3::new(cy.cos() * cp.cos(), cp.sin(), cy.sin() * cp.cos()).normalize()
    }

    pub fn target(&self) -> Vec3 { self.eye + self.forward() }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target(), self.up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }

    pub fn set_look_at(&mut self, target: Vec3) {
        let dir = (target - self.eye).normalize_or_zero();
        if dir == Vec3::ZERO {
            return;
        }
        self.yaw = dir.z.atan2(dir.x);
        self.pitch = dir.y.asin().clamp(-1.4, 1.4);
    }

    /// World-space ray from the eye through a point given in normalized device coordinates
    pub fn ray_through_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_proj().inverse();
        // wgpu clip space: depth 0 at the near plane, 1 at the far plane
        let near = inv.project_point3(ndc.extend(0.0));
        let far = inv.project_point3(ndc.extend(1.0));
        Ray::new(near, far - near)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(eye: Vec3, target: Vec3) -> Camera {
        let config = CameraConfig { eye, target, ..CameraConfig::default() };
        Camera::new(800, 600, &config)
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let cam = camera_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let ray = cam.ray_through_ndc(Vec2::ZERO);
        assert!(ray.direction.abs_diff_eq(Vec3::NEG_Z, 1e-4), "got {:?}", ray.direction);
        assert!((ray.origin.z - (10.0 - cam.z_near)).abs() < 1e-3);
    }

    #[test]
    fn test_corner_ray_diverges_from_center() {
        let cam = camera_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let right = cam.ray_through_ndc(Vec2::new(1.0, 0.0));
        let up = cam.ray_through_ndc(Vec2::new(0.0, 1.0));
        assert!(right.direction.x > 0.0);
        assert!(up.direction.y > 0.0);
        // Vertical half-angle equals half the field of view
        let half = up.direction.angle_between(Vec3::NEG_Z);
        assert!((half - cam.fov_y / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_sized_viewport_keeps_aspect() {
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let before = cam.aspect;
        cam.set_aspect(0, 0);
        assert_eq!(cam.aspect, before);
    }
}
