use glam::{Mat4, Vec3};

use crate::config::{LightingConfig, SceneConfig};
use crate::model::transform::Transform;

/// Procedural meshes the renderer knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    /// Unit cube centered at the origin
    Box,
    /// Unit-diameter UV sphere
    Sphere,
    /// Unit square in the XZ plane, facing +Y
    Plane,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: [f32; 4],
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
}

impl Material {
    pub const fn solid(r: f32, g: f32, b: f32) -> Self {
        Self {
            color: [r, g, b, 1.0],
            emissive: [0.0, 0.0, 0.0],
            emissive_intensity: 0.0,
        }
    }

    pub const fn glowing(self, emissive: [f32; 3], intensity: f32) -> Self {
        Self {
            emissive,
            emissive_intensity: intensity,
            ..self
        }
    }
}

/// A drawable node: transform, mesh shape and material.
///
/// `extent` is the size of the mesh in local space and is kept apart from
/// `transform.scale`, so animations on scale stay relative to 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub transform: Transform,
    pub mesh: MeshKind,
    pub extent: Vec3,
    pub material: Material,
}

impl SceneObject {
    pub fn new(mesh: MeshKind, position: Vec3, extent: Vec3, material: Material) -> Self {
        Self {
            transform: Transform::from_position(position),
            mesh,
            extent,
            material,
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.transform.matrix() * Mat4::from_scale(self.extent)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointOfInterest {
    pub position: Vec3,
    pub message: String,
    pub marker: SceneObject,
}

/// Decorative object turning at a constant angular velocity (radians per second)
#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    pub object: SceneObject,
    pub spin: Vec3,
}

/// The single text surface shown when the vehicle reaches a point
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoPanel {
    pub visible: bool,
    pub text: String,
}

impl InfoPanel {
    pub fn show(&mut self, message: &str) {
        if !self.visible || self.text != message {
            tracing::debug!(message, "info panel shown");
        }
        self.visible = true;
        self.text.clear();
        self.text.push_str(message);
    }

    pub fn hide(&mut self) {
        if self.visible {
            tracing::debug!("info panel hidden");
        }
        self.visible = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub sun_dir: Vec3,
    pub sun_intensity: f32,
    pub point_position: Vec3,
    pub point_intensity: f32,
    pub point_range: f32,
    pub ambient: f32,
    pub clear_color: [f64; 4],
}

impl From<&LightingConfig> for Lighting {
    fn from(config: &LightingConfig) -> Self {
        Self {
            sun_dir: config.sun_position.normalize_or_zero(),
            sun_intensity: config.sun_intensity,
            point_position: config.point_position,
            point_intensity: config.point_intensity,
            point_range: config.point_range.max(f32::EPSILON),
            ambient: config.ambient,
            clear_color: config.clear_color,
        }
    }
}

/// Everything drawn each frame. The vehicle slot stays empty until the loader delivers.
pub struct Scene {
    pub ground: SceneObject,
    pub vehicle: Option<SceneObject>,
    pub points: Vec<PointOfInterest>,
    pub hover_target: SceneObject,
    pub props: Vec<Prop>,
    pub lighting: Lighting,
}

/// Marker spheres float above the ground at this height
const MARKER_HEIGHT: f32 = 0.5;
const MARKER_DIAMETER: f32 = 0.4;

impl Scene {
    pub fn new(config: &SceneConfig) -> Self {
        let ground = SceneObject::new(
            MeshKind::Plane,
            Vec3::ZERO,
            Vec3::new(config.ground.size[0], 1.0, config.ground.size[1]),
            config.ground.material,
        );

        let points = config
            .points
            .iter()
            .map(|p| PointOfInterest {
                position: p.position,
                message: p.message.clone(),
                marker: SceneObject::new(
                    MeshKind::Sphere,
                    Vec3::new(p.position.x, MARKER_HEIGHT, p.position.z),
                    Vec3::splat(MARKER_DIAMETER),
                    config.marker_material,
                ),
            })
            .collect();

        let hover_target = SceneObject::new(
            MeshKind::Box,
            config.hover_target.position,
            config.hover_target.extent,
            config.hover.original_material,
        );

        let props = config
            .props
            .iter()
            .map(|p| Prop {
                object: SceneObject::new(p.mesh, p.position, p.extent, p.material),
                spin: p.spin,
            })
            .collect();

        Self {
            ground,
            vehicle: None,
            points,
            hover_target,
            props,
            lighting: Lighting::from(&config.lighting),
        }
    }

    /// Place the vehicle once its asset arrived. Later calls are ignored.
    pub fn spawn_vehicle(&mut self, config: &SceneConfig) -> bool {
        if self.vehicle.is_some() {
            tracing::warn!("vehicle already spawned, ignoring second spawn");
            return false;
        }
        let spec = &config.vehicle;
        let mut vehicle = SceneObject::new(MeshKind::Box, spec.position, spec.extent, spec.material);
        vehicle.transform.scale = Vec3::splat(spec.scale);
        self.vehicle = Some(vehicle);
        true
    }

    pub fn vehicle_position(&self) -> Option<Vec3> {
        self.vehicle.as_ref().map(|v| v.transform.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_starts_without_vehicle() {
        let config = SceneConfig::default();
        let scene = Scene::new(&config);
        assert!(scene.vehicle.is_none());
        assert_eq!(scene.points.len(), config.points.len());
        for point in &scene.points {
            assert_eq!(point.marker.transform.scale, Vec3::ONE);
            assert_eq!(point.marker.transform.position.y, MARKER_HEIGHT);
        }
    }

    #[test]
    fn test_spawn_vehicle_only_once() {
        let config = SceneConfig::default();
        let mut scene = Scene::new(&config);
        assert!(scene.spawn_vehicle(&config));
        scene.vehicle.as_mut().unwrap().transform.position.x = 3.0;

        assert!(!scene.spawn_vehicle(&config));
        assert_eq!(scene.vehicle_position().unwrap().x, 3.0);
    }

    #[test]
    fn test_panel_show_and_hide() {
        let mut panel = InfoPanel::default();
        panel.show("Первая точка");
        assert!(panel.visible);
        assert_eq!(panel.text, "Первая точка");
        panel.hide();
        assert!(!panel.visible);
        // Text survives hiding; only visibility changes
        assert_eq!(panel.text, "Первая точка");
    }
}
