use glam::{Mat4, Vec3};

/// Half extent of the unit box every box mesh is built from
const UNIT_HALF: f32 = 0.5;

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }

    /// Distance along the ray to the box `[-0.5, 0.5]^3` placed by `model`,
    /// or `None` if the ray misses it or the box is degenerate.
    pub fn intersect_unit_box(&self, model: Mat4) -> Option<f32> {
        if model.determinant().abs() <= f32::EPSILON {
            return None;
        }
        // Affine map keeps the ray parameter, so the local t is the world t
        let inv = model.inverse();
        let origin = inv.transform_point3(self.origin);
        let dir = inv.transform_vector3(self.direction);

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            if d.abs() < 1e-8 {
                if !(-UNIT_HALF..=UNIT_HALF).contains(&o) {
                    return None;
                }
                continue;
            }
            let t1 = (-UNIT_HALF - o) / d;
            let t2 = (UNIT_HALF - o) / d;
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
        }

        if t_max < t_min.max(0.0) {
            return None;
        }
        Some(if t_min >= 0.0 { t_min } else { t_max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn test_hits_box_in_front() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -3.0));
        let t = ray.intersect_unit_box(Mat4::IDENTITY).expect("should hit");
        assert!((t - 9.5).abs() < 1e-5);
        assert!(ray.at(t).abs_diff_eq(Vec3::new(0.0, 0.0, 0.5), 1e-5));
    }

    #[test]
    fn test_misses_box_to_the_side_and_behind() {
        let side = Ray::new(Vec3::new(2.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!(side.intersect_unit_box(Mat4::IDENTITY).is_none());

        let behind = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
        assert!(behind.intersect_unit_box(Mat4::IDENTITY).is_none());
    }

    #[test]
    fn test_respects_scale_and_rotation() {
        // Stretched to 3 wide: a ray at x = 1.2 now hits
        let stretched = Mat4::from_scale(Vec3::new(3.0, 1.0, 1.0));
        let ray = Ray::new(Vec3::new(1.2, 0.0, 5.0), Vec3::NEG_Z);
        assert!(ray.intersect_unit_box(Mat4::IDENTITY).is_none());
        assert!(ray.intersect_unit_box(stretched).is_some());

        // Rotated 90 degrees about Y: the long side now lies along Z
        let rotated = Mat4::from_quat(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)) * stretched;
        assert!(ray.intersect_unit_box(rotated).is_none());
    }

    #[test]
    fn test_origin_inside_box_reports_exit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = ray.intersect_unit_box(Mat4::IDENTITY).expect("inside counts as hit");
        assert!((t - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_box_never_hits() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(ray.intersect_unit_box(Mat4::from_scale(Vec3::ZERO)).is_none());
    }
}
