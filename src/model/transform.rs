use glam::{EulerRot, Mat4, Quat, Vec3};

/// Position, Euler rotation (XYZ, radians) and scale of a scene object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Self::default() }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }

    /// Heading around the vertical axis
    pub fn yaw(&self) -> f32 {
        self.rotation.y
    }

    /// Unit vector the object faces in the ground plane (local +Z rotated by yaw)
    pub fn forward(&self) -> Vec3 {
        let yaw = self.yaw();
        Vec3::new(yaw.sin(), 0.0, yaw.cos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_follows_yaw() {
        let mut t = Transform::default();
        assert!(t.forward().abs_diff_eq(Vec3::Z, 1e-6));

        t.rotation.y = std::f32::consts::FRAC_PI_2;
        assert!(t.forward().abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn test_matrix_applies_scale_before_translation() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0)).with_scale(Vec3::splat(2.0));
        let p = t.matrix().transform_point3(Vec3::new(0.5, 0.0, 0.0));
        assert!(p.abs_diff_eq(Vec3::new(2.0, 2.0, 3.0), 1e-6));
    }
}
