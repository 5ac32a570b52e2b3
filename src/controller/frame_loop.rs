use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::Rc;

use glam::Vec3;

use crate::config::SceneConfig;
use crate::controller::camera_controller::{CameraController, OrbitRig};
use crate::controller::hover::HoverHighlight;
use crate::controller::input::InputState;
use crate::controller::loader::{LoadSlot, LoadedAsset};
use crate::controller::movement::{MovementController, MovementMode};
use crate::controller::proximity;
use crate::model::{Camera, InfoPanel, Scene};

/// Longest step a single frame may advance, so a backgrounded tab does not teleport the car
const MAX_FRAME_DT: f64 = 0.1;

/// Status numbers shown by the debug overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudInfo {
    pub mode: MovementMode,
    pub fps: f32,
    pub hovered: bool,
    pub vehicle_loaded: bool,
    pub load_failed: bool,
}

/// Everything the renderer needs for one frame
pub struct FrameView<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub panel: &'a InfoPanel,
    pub hud: HudInfo,
}

/// Draws a finished frame. The wgpu renderer implements it; tests use recorders.
pub trait SceneRenderer {
    fn draw(&mut self, frame: &FrameView<'_>);
}

/// Main loop state and per-frame update logic
pub struct FrameLoopContext {
    pub config: SceneConfig,
    pub scene: Scene,
    pub camera: Camera,
    pub rig: OrbitRig,
    pub camera_controller: CameraController,
    pub movement: MovementController,
    pub hover: HoverHighlight,
    pub panel: InfoPanel,
    pub input_state: Rc<RefCell<InputState>>,
    vehicle_slot: LoadSlot<LoadedAsset>,
    last_time: Option<f64>,
    fps: f32,
}

impl FrameLoopContext {
    pub fn new(
        config: SceneConfig,
        width: u32,
        height: u32,
        input_state: Rc<RefCell<InputState>>,
        vehicle_slot: LoadSlot<LoadedAsset>,
    ) -> Self {
        let scene = Scene::new(&config);
        let mut camera = Camera::new(width, height, &config.camera);
        let mut rig = OrbitRig::looking_at(config.camera.eye, config.camera.target);
        let camera_controller = CameraController::new(&config.camera);
        // Settle the rig once so the first frame starts from a clamped distance
        camera_controller.update(&mut rig, &mut camera);

        Self {
            scene,
            camera,
            rig,
            camera_controller,
            movement: MovementController::new(config.movement.clone()),
            hover: HoverHighlight::new(config.hover.clone()),
            panel: InfoPanel::default(),
            input_state,
            vehicle_slot,
            last_time: None,
            fps: 0.0,
            config,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    pub fn hud(&self) -> HudInfo {
        HudInfo {
            mode: self.movement.mode,
            fps: self.fps,
            hovered: self.hover.is_hovered(),
            vehicle_loaded: self.scene.vehicle.is_some(),
            load_failed: self.vehicle_slot.error().is_some(),
        }
    }

    /// One display refresh: time step, update, then draw
    pub fn frame(&mut self, now_ms: f64, renderer: &mut dyn SceneRenderer) {
        let dt = match self.last_time {
            Some(last) => ((now_ms - last) / 1000.0).clamp(0.0, MAX_FRAME_DT) as f32,
            None => 0.0,
        };
        self.last_time = Some(now_ms);

        self.update(dt);

        let frame = FrameView {
            scene: &self.scene,
            camera: &self.camera,
            panel: &self.panel,
            hud: self.hud(),
        };
        renderer.draw(&frame);
    }

    /// Advance the scene by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        if dt > 0.0 {
            let instant = 1.0 / dt;
            self.fps = if self.fps == 0.0 { instant } else { self.fps * 0.9 + instant * 0.1 };
        }

        self.adopt_vehicle();

        // Snapshot input in a minimal scope so event handlers are never blocked
        let (flags, toggle, (dx, dy), zoom, pointer) = {
            let mut input = self.input_state.borrow_mut();
            (
                input.drive,
                input.take_mode_toggle(),
                input.consume_look(),
                input.consume_zoom(),
                input.pointer_ndc,
            )
        };

        if toggle {
            self.movement.toggle_mode();
        }

        self.movement.update(
            self.scene.vehicle.as_mut().map(|v| &mut v.transform),
            &flags,
            dt,
        );

        let vehicle_pos = self.scene.vehicle_position();
        proximity::update_markers(
            &mut self.scene.points,
            vehicle_pos,
            &self.config.proximity,
            dt,
            &mut self.panel,
        );

        self.camera_controller.apply_look(&mut self.rig, dx, dy);
        self.camera_controller.apply_zoom(&mut self.rig, zoom);
        self.camera_controller.update(&mut self.rig, &mut self.camera);

        self.hover.animate(&mut self.scene.hover_target, dt);
        for prop in &mut self.scene.props {
            let rotation = prop.object.transform.rotation + prop.spin * dt;
            prop.object.transform.rotation = Vec3::new(
                rotation.x.rem_euclid(TAU),
                rotation.y.rem_euclid(TAU),
                rotation.z.rem_euclid(TAU),
            );
        }

        let ray = self.camera.ray_through_ndc(pointer);
        self.hover.update(&mut self.scene.hover_target, &ray);
    }

    fn adopt_vehicle(&mut self) {
        if self.scene.vehicle.is_some() {
            return;
        }
        if let Some(asset) = self.vehicle_slot.poll() {
            if self.scene.spawn_vehicle(&self.config) {
                tracing::info!(path = %asset.path, bytes = asset.bytes.len(), meshes = asset.meshes, "vehicle ready");
            }
        }
    }
}
