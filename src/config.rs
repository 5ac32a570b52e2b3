//! Scene configuration. Every tunable lives here with the values the scene ships with.

use glam::Vec3;

use crate::controller::input::KeyBindings;
use crate::controller::movement::MovementMode;
use crate::controller::proximity::{PanelPolicy, Smoothing};
use crate::controller::tween::Ease;
use crate::model::{Material, MeshKind};

const BLUE: Material = Material::solid(0.0, 0.0, 1.0);
const RED: Material = Material::solid(1.0, 0.0, 0.0);
const YELLOW: Material = Material::solid(1.0, 1.0, 0.0);
const ROAD_GREY: Material = Material::solid(0.2, 0.2, 0.2);
const SILVER: Material = Material::solid(0.75, 0.75, 0.78);
const ORANGE: Material = Material::solid(1.0, 0.65, 0.0);

#[derive(Debug, Clone)]
pub struct OrbitConfig {
    pub radius: f32,
    /// Radians per second
    pub angular_speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self { radius: 5.0, angular_speed: 0.6 }
    }
}

#[derive(Debug, Clone)]
pub struct DriveConfig {
    /// Units per second
    pub speed: f32,
    /// Radians per second
    pub turn_rate: f32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self { speed: 3.0, turn_rate: 1.5 }
    }
}

#[derive(Debug, Clone)]
pub struct MovementConfig {
    pub mode: MovementMode,
    pub orbit: OrbitConfig,
    pub drive: DriveConfig,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            mode: MovementMode::Orbit,
            orbit: OrbitConfig::default(),
            drive: DriveConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProximityConfig {
    pub near_threshold: f32,
    pub near_scale: f32,
    pub far_scale: f32,
    pub smoothing: Smoothing,
    pub panel_policy: PanelPolicy,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            near_threshold: 1.5,
            near_scale: 1.8,
            far_scale: 1.0,
            // 0.1 per frame at 60 Hz, independent of the actual frame rate
            smoothing: Smoothing::matching(0.1, 60.0),
            panel_policy: PanelPolicy::HideWhenFar,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HoverConfig {
    pub hover_scale: Vec3,
    pub rest_scale: Vec3,
    /// Seconds
    pub duration: f32,
    pub ease: Ease,
    pub original_material: Material,
    pub highlight_material: Material,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            hover_scale: Vec3::new(3.0, 1.5, 1.0),
            rest_scale: Vec3::ONE,
            duration: 1.5,
            ease: Ease::Power1Out,
            original_material: RED,
            highlight_material: YELLOW.glowing([1.0, 1.0, 1.0], 0.5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov_y_deg: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians per pixel dragged
    pub rotate_sensitivity: f32,
    /// Log-distance per wheel unit
    pub zoom_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(1.0, 2.0, 10.0),
            target: Vec3::ZERO,
            fov_y_deg: 40.0,
            z_near: 0.1,
            z_far: 100.0,
            damping: 0.05,
            min_distance: 2.0,
            max_distance: 10.0,
            rotate_sensitivity: 0.005,
            zoom_sensitivity: 0.001,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PointConfig {
    pub position: Vec3,
    pub message: String,
}

impl PointConfig {
    pub fn new(position: Vec3, message: &str) -> Self {
        Self { position, message: message.to_string() }
    }
}

#[derive(Debug, Clone)]
pub struct HoverTargetConfig {
    pub position: Vec3,
    pub extent: Vec3,
}

impl Default for HoverTargetConfig {
    fn default() -> Self {
        Self { position: Vec3::new(0.0, 0.5, -6.0), extent: Vec3::ONE }
    }
}

#[derive(Debug, Clone)]
pub struct VehicleConfig {
    pub position: Vec3,
    pub scale: f32,
    /// Size of the proxy body before `scale`
    pub extent: Vec3,
    pub material: Material,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.0, 0.0),
            scale: 0.5,
            extent: Vec3::new(1.8, 1.2, 4.0),
            material: SILVER,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroundConfig {
    /// Width along X and depth along Z
    pub size: [f32; 2],
    pub material: Material,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self { size: [25.0, 45.0], material: ROAD_GREY }
    }
}

#[derive(Debug, Clone)]
pub struct PropConfig {
    pub mesh: MeshKind,
    pub position: Vec3,
    pub extent: Vec3,
    pub material: Material,
    /// Radians per second around each axis
    pub spin: Vec3,
}

#[derive(Debug, Clone)]
pub struct LightingConfig {
    pub ambient: f32,
    pub sun_position: Vec3,
    pub sun_intensity: f32,
    pub point_position: Vec3,
    pub point_intensity: f32,
    /// Distance at which the point light fades to nothing
    pub point_range: f32,
    pub clear_color: [f64; 4],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient: 0.45,
            sun_position: Vec3::new(5.0, 5.0, 5.0),
            sun_intensity: 0.8,
            point_position: Vec3::new(-1.0, 2.0, 2.0),
            point_intensity: 4.0,
            point_range: 100.0,
            // lightblue
            clear_color: [0.678, 0.847, 0.902, 1.0],
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub movement: MovementConfig,
    pub proximity: ProximityConfig,
    pub hover: HoverConfig,
    pub camera: CameraConfig,
    pub bindings: KeyBindings,
    pub points: Vec<PointConfig>,
    pub marker_material: Material,
    pub hover_target: HoverTargetConfig,
    pub vehicle: VehicleConfig,
    pub ground: GroundConfig,
    pub props: Vec<PropConfig>,
    pub lighting: LightingConfig,
    /// Vehicle asset; `builtin:` paths need no I/O
    pub model_path: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            movement: MovementConfig::default(),
            proximity: ProximityConfig::default(),
            hover: HoverConfig::default(),
            camera: CameraConfig::default(),
            bindings: KeyBindings::default(),
            points: vec![
                PointConfig::new(Vec3::new(5.0, 0.0, 0.0), "Первая точка"),
                PointConfig::new(Vec3::new(-5.0, 0.0, 0.0), "Вторая точка"),
                PointConfig::new(Vec3::new(0.0, 0.0, 0.0), "Третья точка"),
            ],
            marker_material: BLUE,
            hover_target: HoverTargetConfig::default(),
            vehicle: VehicleConfig::default(),
            ground: GroundConfig::default(),
            props: vec![
                PropConfig {
                    mesh: MeshKind::Sphere,
                    position: Vec3::new(-4.0, 1.5, -6.0),
                    extent: Vec3::new(1.4, 0.4, 1.4),
                    material: ORANGE,
                    spin: Vec3::new(0.6, 0.6, 0.0),
                },
                PropConfig {
                    mesh: MeshKind::Box,
                    position: Vec3::new(4.0, 1.5, -6.0),
                    extent: Vec3::splat(0.8),
                    material: BLUE.glowing([0.3, 0.3, 1.0], 0.4),
                    spin: Vec3::new(0.6, 0.6, 0.0),
                },
            ],
            lighting: LightingConfig::default(),
            model_path: "builtin:vehicle".to_string(),
        }
    }
}

impl SceneConfig {
    /// Defaults with `WAYPOINT_MODEL` and `WAYPOINT_MOVEMENT` applied when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("WAYPOINT_MODEL") {
            if !path.trim().is_empty() {
                config.model_path = path;
            }
        }
        if let Ok(mode) = std::env::var("WAYPOINT_MOVEMENT") {
            match MovementMode::parse(&mode) {
                Some(mode) => config.movement.mode = mode,
                None => tracing::warn!(value = %mode, "unknown WAYPOINT_MOVEMENT, keeping default"),
            }
        }
        config
    }
}
