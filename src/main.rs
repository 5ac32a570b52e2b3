use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition},
    event::{MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use waypoint_drive::config::SceneConfig;
use waypoint_drive::controller::input::{self, InputEvent, InputState};
use waypoint_drive::controller::loader::{self, AssetLoader, FileLoader};
use waypoint_drive::controller::FrameLoopContext;
use waypoint_drive::logging;
use waypoint_drive::view::{GpuContext, Renderer};

/// Browser wheel events report roughly this many pixels per line
const PIXELS_PER_LINE: f32 = 100.0;

/// Window-bound state, created once the event loop is running
struct Running {
    window: Arc<Window>,
    renderer: Renderer,
    frame_ctx: FrameLoopContext,
    egui_state: egui_winit::State,
    started: Instant,
    last_cursor: Option<PhysicalPosition<f64>>,
}

impl Running {
    fn new(event_loop: &ActiveEventLoop, config: SceneConfig) -> anyhow::Result<Self> {
        let attributes = Window::default_attributes()
            .with_title("Waypoint Drive")
            .with_inner_size(LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(attributes).context("failed to create window")?);

        let gpu = pollster::block_on(GpuContext::new_native(window.clone()))
            .map_err(|e| anyhow!("GPU init failed: {e}"))?;
        let renderer = Renderer::new(gpu);
        let (width, height) = renderer.size();

        let egui_state = egui_winit::State::new(
            renderer.egui_ctx().clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        let (publisher, vehicle_slot) = loader::load_slot();
        FileLoader::default().load(&config.model_path, loader::log_progress(&config.model_path), publisher);

        let input_state = std::rc::Rc::new(std::cell::RefCell::new(InputState::new()));
        let frame_ctx = FrameLoopContext::new(config, width, height, input_state, vehicle_slot);
        tracing::info!(width, height, "scene ready");

        Ok(Self {
            window,
            renderer,
            frame_ctx,
            egui_state,
            started: Instant::now(),
            last_cursor: None,
        })
    }

    fn push(&self, event: InputEvent) {
        self.frame_ctx
            .input_state
            .borrow_mut()
            .process_event(&event, &self.frame_ctx.config.bindings);
    }

    fn input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(event) = input::native::key_event_to_input(event) {
                    self.push(event);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(event) = input::native::mouse_button_to_input(*button, *state) {
                    self.push(event);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (width, height) = self.renderer.size();
                self.push(InputEvent::PointerMove {
                    x: position.x as f32,
                    y: position.y as f32,
                    width: width as f32,
                    height: height as f32,
                });
                if let Some(last) = self.last_cursor {
                    self.push(InputEvent::MouseMove {
                        dx: (position.x - last.x) as f32,
                        dy: (position.y - last.y) as f32,
                    });
                }
                self.last_cursor = Some(*position);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // Browser convention: positive delta scrolls down, i.e. zooms out
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * PIXELS_PER_LINE,
                    MouseScrollDelta::PixelDelta(p) => -p.y as f32,
                };
                self.push(InputEvent::Wheel { delta_y });
            }
            WindowEvent::Focused(false) => self.push(InputEvent::FocusLost),
            WindowEvent::Occluded(occluded) => {
                self.push(InputEvent::VisibilityChanged { visible: !occluded });
            }
            _ => {}
        }
    }

    fn redraw(&mut self) {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        self.renderer.set_ui_input(raw_input, self.window.scale_factor() as f32);

        let now_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.frame_ctx.frame(now_ms, &mut self.renderer);

        if let Some(output) = self.renderer.take_platform_output() {
            self.egui_state.handle_platform_output(&self.window, output);
        }
        self.window.request_redraw();
    }
}

struct App {
    config: SceneConfig,
    running: Option<Running>,
    error: Option<anyhow::Error>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match Running::new(event_loop, self.config.clone()) {
            Ok(running) => self.running = Some(running),
            Err(e) => {
                tracing::error!(error = %e, "startup failed");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(app) = self.running.as_mut() else {
            return;
        };
        let response = app.egui_state.on_window_event(&app.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                app.renderer.resize(size.width, size.height);
                app.frame_ctx.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => app.redraw(),
            other => {
                if !response.consumed {
                    app.input(&other);
                }
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        config: SceneConfig::from_env(),
        running: None,
        error: None,
    };
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
