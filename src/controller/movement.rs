use crate::config::MovementConfig;
use crate::controller::input::DriveFlags;
use crate::model::Transform;

/// How the drive flags move the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementMode {
    /// Circle the origin at a fixed radius while "forward" is held
    Orbit,
    /// Turn with left/right, drive along the heading with forward/back
    FreeDrive,
}

impl MovementMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "orbit" => Some(MovementMode::Orbit),
            "drive" | "free" | "freedrive" => Some(MovementMode::FreeDrive),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MovementMode::Orbit => "orbit",
            MovementMode::FreeDrive => "drive",
        }
    }
}

/// Advances the vehicle transform each frame
pub struct MovementController {
    pub mode: MovementMode,
    config: MovementConfig,
    angle: f32,
}

impl MovementController {
    pub fn new(config: MovementConfig) -> Self {
        Self {
            mode: config.mode,
            config,
            angle: 0.0,
        }
    }

    /// Accumulated orbit angle in radians
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn toggle_mode(&mut self) -> MovementMode {
        self.mode = match self.mode {
            MovementMode::Orbit => MovementMode::FreeDrive,
            MovementMode::FreeDrive => MovementMode::Orbit,
        };
        tracing::info!(mode = self.mode.label(), "movement mode changed");
        self.mode
    }

    /// Move `vehicle` by `dt` seconds of input. Does nothing while the vehicle is absent.
    pub fn update(&mut self, vehicle: Option<&mut Transform>, flags: &DriveFlags, dt: f32) {
        let Some(vehicle) = vehicle else {
            return;
        };
        let dt = dt.max(0.0);
        match self.mode {
            MovementMode::Orbit => self.orbit(vehicle, flags, dt),
            MovementMode::FreeDrive => self.drive(vehicle, flags, dt),
        }
    }

    fn orbit(&mut self, vehicle: &mut Transform, flags: &DriveFlags, dt: f32) {
        if !flags.forward {
            return;
        }
        let orbit = &self.config.orbit;
        self.angle += orbit.angular_speed * dt;
        vehicle.position.x = orbit.radius * self.angle.cos();
        vehicle.position.z = orbit.radius * self.angle.sin();
        vehicle.rotation.y = -self.angle;
    }

    fn drive(&mut self, vehicle: &mut Transform, flags: &DriveFlags, dt: f32) {
        let drive = &self.config.drive;

        let turn = f32::from(u8::from(flags.turn_left)) - f32::from(u8::from(flags.turn_right));
        vehicle.rotation.y += turn * drive.turn_rate * dt;

        let throttle = f32::from(u8::from(flags.forward)) - f32::from(u8::from(flags.backward));
        if throttle != 0.0 {
            vehicle.position += vehicle.forward() * (throttle * drive.speed * dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MovementConfig;
    use glam::{Vec2, Vec3};

    fn controller(mode: MovementMode) -> MovementController {
        MovementController::new(MovementConfig { mode, ..MovementConfig::default() })
    }

    fn vehicle() -> Transform {
        Transform::from_position(Vec3::new(0.0, 1.0, 0.0))
    }

    #[test]
    fn test_orbit_angle_monotonic_and_radius_fixed() {
        let mut ctl = controller(MovementMode::Orbit);
        let radius = MovementConfig::default().orbit.radius;
        let mut car = vehicle();
        let flags = DriveFlags { forward: true, ..DriveFlags::default() };

        let mut last = ctl.angle();
        for dt in [0.0, 0.016, 0.1, 0.0, 0.033, 0.5, 0.001] {
            ctl.update(Some(&mut car), &flags, dt);
            assert!(ctl.angle() >= last);
            if dt > 0.0 {
                assert!(ctl.angle() > last);
            }
            last = ctl.angle();

            let horizontal = Vec2::new(car.position.x, car.position.z).length();
            assert!((horizontal - radius).abs() < 1e-4);
            assert_eq!(car.position.y, 1.0, "orbit leaves height alone");
            assert!((car.rotation.y + ctl.angle()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_orbit_idle_without_forward_flag() {
        let mut ctl = controller(MovementMode::Orbit);
        let mut car = vehicle();
        ctl.update(Some(&mut car), &DriveFlags { turn_left: true, ..DriveFlags::default() }, 1.0);
        assert_eq!(ctl.angle(), 0.0);
        assert_eq!(car, vehicle());
    }

    #[test]
    fn test_absent_vehicle_is_noop() {
        let mut ctl = controller(MovementMode::Orbit);
        let flags = DriveFlags { forward: true, ..DriveFlags::default() };
        ctl.update(None, &flags, 1.0);
        assert_eq!(ctl.angle(), 0.0);
    }

    #[test]
    fn test_turn_left_one_second_independent_of_frame_count() {
        let rate = MovementConfig::default().drive.turn_rate;
        let flags = DriveFlags { turn_left: true, ..DriveFlags::default() };

        for frames in [1usize, 10, 60, 144] {
            let mut ctl = controller(MovementMode::FreeDrive);
            let mut car = vehicle();
            let dt = 1.0 / frames as f32;
            for _ in 0..frames {
                ctl.update(Some(&mut car), &flags, dt);
            }
            assert!((car.rotation.y - rate).abs() < 1e-4, "{frames} frames gave {}", car.rotation.y);
            assert_eq!(car.position, vehicle().position, "turning alone does not translate");
        }
    }

    #[test]
    fn test_drive_moves_along_heading() {
        let speed = MovementConfig::default().drive.speed;
        let mut ctl = controller(MovementMode::FreeDrive);
        let mut car = vehicle();
        car.rotation.y = std::f32::consts::FRAC_PI_2;

        ctl.update(Some(&mut car), &DriveFlags { forward: true, ..DriveFlags::default() }, 1.0);
        assert!(car.position.abs_diff_eq(Vec3::new(speed, 1.0, 0.0), 1e-5));

        ctl.update(Some(&mut car), &DriveFlags { backward: true, ..DriveFlags::default() }, 0.5);
        assert!(car.position.abs_diff_eq(Vec3::new(speed * 0.5, 1.0, 0.0), 1e-5));

        let both = DriveFlags { forward: true, backward: true, ..DriveFlags::default() };
        let before = car.position;
        ctl.update(Some(&mut car), &both, 1.0);
        assert_eq!(car.position, before);
    }

    #[test]
    fn test_toggle_keeps_orbit_angle() {
        let mut ctl = controller(MovementMode::Orbit);
        let mut car = vehicle();
        ctl.update(Some(&mut car), &DriveFlags { forward: true, ..DriveFlags::default() }, 1.0);
        let angle = ctl.angle();
        assert_eq!(ctl.toggle_mode(), MovementMode::FreeDrive);
        assert_eq!(ctl.toggle_mode(), MovementMode::Orbit);
        assert_eq!(ctl.angle(), angle);
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(MovementMode::parse("Orbit"), Some(MovementMode::Orbit));
        assert_eq!(MovementMode::parse(" drive "), Some(MovementMode::FreeDrive));
        assert_eq!(MovementMode::parse("fly"), None);
    }
}
