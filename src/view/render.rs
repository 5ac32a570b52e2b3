use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use wgpu::*;

use crate::controller::frame_loop::{FrameView, SceneRenderer};
use crate::model::{Lighting, MeshKind, Scene, SceneObject};
use crate::ui;
use crate::view::gpu_init::GpuContext;
use crate::view::mesh::{Mesh, MeshBuffer, Vertex};

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightingUniform {
    pub sun_dir: [f32; 3],
    pub sun_intensity: f32,
    pub point_pos: [f32; 3],
    pub point_intensity: f32,
    pub ambient: f32,
    pub point_range: f32,
    pub _pad1: f32,
    pub _pad2: f32,
}

impl From<&Lighting> for LightingUniform {
    fn from(lighting: &Lighting) -> Self {
        Self {
            sun_dir: lighting.sun_dir.to_array(),
            sun_intensity: lighting.sun_intensity,
            point_pos: lighting.point_position.to_array(),
            point_intensity: lighting.point_intensity,
            ambient: lighting.ambient,
            point_range: lighting.point_range,
            _pad1: 0.0,
            _pad2: 0.0,
        }
    }
}

/// Per-object transform and material
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// rgb emissive colour, w intensity
    pub emissive: [f32; 4],
}

impl From<&SceneObject> for ObjectUniform {
    fn from(object: &SceneObject) -> Self {
        let [r, g, b] = object.material.emissive;
        Self {
            model: object.model_matrix().to_cols_array_2d(),
            color: object.material.color,
            emissive: [r, g, b, object.material.emissive_intensity],
        }
    }
}

/// Stable identity of a drawn object, so its uniform buffer survives across frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawKey {
    Ground,
    Vehicle,
    Marker(usize),
    HoverTarget,
    Prop(usize),
}

/// Everything visible this frame, in draw order
pub fn draw_list(scene: &Scene) -> Vec<(DrawKey, &SceneObject)> {
    let mut items = Vec::with_capacity(3 + scene.points.len() + scene.props.len());
    items.push((DrawKey::Ground, &scene.ground));
    if let Some(vehicle) = &scene.vehicle {
        items.push((DrawKey::Vehicle, vehicle));
    }
    items.extend(scene.points.iter().enumerate().map(|(i, p)| (DrawKey::Marker(i), &p.marker)));
    items.push((DrawKey::HoverTarget, &scene.hover_target));
    items.extend(scene.props.iter().enumerate().map(|(i, p)| (DrawKey::Prop(i), &p.object)));
    items
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

fn uniform_entry(binding: u32, visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_buffer(device: &Device, label: &str, size: usize) -> Buffer {
    device.create_buffer(&BufferDescriptor {
        label: Some(label),
        size: size as BufferAddress,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

struct CameraResources {
    camera_buffer: Buffer,
    lighting_buffer: Buffer,
    bind_group_layout: BindGroupLayout,
    bind_group: BindGroup,
}

fn create_camera_resources(device: &Device) -> CameraResources {
    let camera_buffer = uniform_buffer(device, "camera_buffer", std::mem::size_of::<CameraUniform>());
    let lighting_buffer = uniform_buffer(device, "lighting_buffer", std::mem::size_of::<LightingUniform>());

    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
        entries: &[uniform_entry(0, ShaderStages::VERTEX), uniform_entry(1, ShaderStages::FRAGMENT)],
    });

    let bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[
            BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() },
            BindGroupEntry { binding: 1, resource: lighting_buffer.as_entire_binding() },
        ],
    });

    CameraResources { camera_buffer, lighting_buffer, bind_group_layout, bind_group }
}

struct ObjectSlot {
    buffer: Buffer,
    bind_group: BindGroup,
}

fn create_object_slot(device: &Device, layout: &BindGroupLayout) -> ObjectSlot {
    let buffer = uniform_buffer(device, "object_buffer", std::mem::size_of::<ObjectUniform>());
    let bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("object_bind_group"),
        layout,
        entries: &[BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() }],
    });
    ObjectSlot { buffer, bind_group }
}

fn create_scene_pipeline(
    device: &Device,
    format: TextureFormat,
    camera_layout: &BindGroupLayout,
    object_layout: &BindGroupLayout,
) -> RenderPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("scene_shader"),
        source: ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("scene_pipeline_layout"),
        bind_group_layouts: &[camera_layout, object_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("scene_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format,
                blend: Some(BlendState::ALPHA_BLENDING),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            // The ground is seen from below when the camera dips under it
            cull_mode: None,
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

/// Owns the GPU and draws the scene plus the egui overlay
pub struct Renderer {
    gpu: GpuContext,
    pipeline: RenderPipeline,
    camera: CameraResources,
    object_layout: BindGroupLayout,
    objects: HashMap<DrawKey, ObjectSlot>,
    meshes: HashMap<MeshKind, MeshBuffer>,
    _depth_texture: Texture,
    depth_view: TextureView,

    egui_ctx: egui::Context,
    egui_renderer: egui_wgpu::Renderer,
    ui_input: Option<egui::RawInput>,
    pixels_per_point: f32,
    platform_output: Option<egui::PlatformOutput>,
}

impl Renderer {
    pub fn new(gpu: GpuContext) -> Self {
        let device = gpu.device.as_ref();
        let camera = create_camera_resources(device);
        let object_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[uniform_entry(0, ShaderStages::VERTEX | ShaderStages::FRAGMENT)],
        });
        let pipeline = create_scene_pipeline(device, gpu.format, &camera.bind_group_layout, &object_layout);

        let meshes = [MeshKind::Box, MeshKind::Sphere, MeshKind::Plane]
            .into_iter()
            .map(|kind| (kind, Mesh::for_kind(kind).upload(device)))
            .collect();

        let (depth_texture, depth_view) = create_depth_texture(device, gpu.config.width, gpu.config.height);
        let egui_renderer = egui_wgpu::Renderer::new(device, gpu.format, egui_wgpu::RendererOptions::default());

        Self {
            pipeline,
            camera,
            object_layout,
            objects: HashMap::new(),
            meshes,
            _depth_texture: depth_texture,
            depth_view,
            egui_ctx: egui::Context::default(),
            egui_renderer,
            ui_input: None,
            pixels_per_point: 1.0,
            platform_output: None,
            gpu,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.gpu.config.width, self.gpu.config.height)
    }

    pub fn egui_ctx(&self) -> &egui::Context {
        &self.egui_ctx
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        let (texture, view) = create_depth_texture(self.gpu.device.as_ref(), width, height);
        self._depth_texture = texture;
        self.depth_view = view;
        tracing::debug!(width, height, "surface resized");
    }

    /// Input for the next overlay pass
    pub fn set_ui_input(&mut self, raw_input: egui::RawInput, pixels_per_point: f32) {
        self.ui_input = Some(raw_input);
        self.pixels_per_point = pixels_per_point;
    }

    /// Clipboard, cursor and similar requests from the last overlay pass
    pub fn take_platform_output(&mut self) -> Option<egui::PlatformOutput> {
        self.platform_output.take()
    }

    fn default_ui_input(&self) -> egui::RawInput {
        let (width, height) = self.size();
        egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(width as f32, height as f32) / self.pixels_per_point,
            )),
            ..Default::default()
        }
    }

    fn write_uniforms(&mut self, frame: &FrameView<'_>) {
        let queue = self.gpu.queue.as_ref();
        let camera = CameraUniform { view_proj: frame.camera.view_proj().to_cols_array_2d() };
        queue.write_buffer(&self.camera.camera_buffer, 0, bytemuck::bytes_of(&camera));
        let lighting = LightingUniform::from(&frame.scene.lighting);
        queue.write_buffer(&self.camera.lighting_buffer, 0, bytemuck::bytes_of(&lighting));

        for (key, object) in draw_list(frame.scene) {
            let slot = self
                .objects
                .entry(key)
                .or_insert_with(|| create_object_slot(self.gpu.device.as_ref(), &self.object_layout));
            queue.write_buffer(&slot.buffer, 0, bytemuck::bytes_of(&ObjectUniform::from(object)));
        }
    }

    fn acquire_frame(&self) -> Option<SurfaceTexture> {
        match self.gpu.surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                tracing::warn!("surface lost, reconfiguring");
                self.gpu.reconfigure();
                None
            }
            Err(e) => {
                tracing::error!(error = ?e, "failed to acquire frame");
                None
            }
        }
    }
}

impl SceneRenderer for Renderer {
    fn draw(&mut self, frame: &FrameView<'_>) {
        self.write_uniforms(frame);

        let Some(surface_frame) = self.acquire_frame() else {
            return;
        };

        let raw_input = self.ui_input.take().unwrap_or_else(|| self.default_ui_input());
        let full_output = ui::build_ui(&self.egui_ctx, raw_input, frame.panel, &frame.hud);
        let primitives = self.egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let device = self.gpu.device.as_ref();
        let queue = self.gpu.queue.as_ref();
        let view = surface_frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor { label: Some("encoder") });

        let [r, g, b, a] = frame.scene.lighting.clear_color;
        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations { load: LoadOp::Clear(Color { r, g, b, a }), store: StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations { load: LoadOp::Clear(1.0), store: StoreOp::Store }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.camera.bind_group, &[]);

            for (key, object) in draw_list(frame.scene) {
                let (Some(slot), Some(mesh)) = (self.objects.get(&key), self.meshes.get(&object.mesh)) else {
                    continue;
                };
                rp.set_bind_group(1, &slot.bind_group, &[]);
                rp.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                rp.set_index_buffer(mesh.index_buffer.slice(..), IndexFormat::Uint32);
                rp.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        self.egui_renderer
            .update_buffers(device, queue, &mut encoder, &primitives, &screen_descriptor);

        {
            let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations { load: LoadOp::Load, store: StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &primitives, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        queue.submit(std::iter::once(encoder.finish()));
        surface_frame.present();
        self.platform_output = Some(full_output.platform_output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    #[test]
    fn test_uniform_sizes_match_shader() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 64);
        assert_eq!(std::mem::size_of::<LightingUniform>(), 48);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 96);
    }

    #[test]
    fn test_lighting_uniform_carries_point_light() {
        let config = SceneConfig::default();
        let uniform = LightingUniform::from(&Scene::new(&config).lighting);
        assert_eq!(uniform.point_pos, [-1.0, 2.0, 2.0]);
        assert_eq!(uniform.point_intensity, config.lighting.point_intensity);
        assert_eq!(uniform.point_range, 100.0);
        let sun = glam::Vec3::from(uniform.sun_dir);
        assert!((sun.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_draw_list_skips_absent_vehicle() {
        let config = SceneConfig::default();
        let mut scene = Scene::new(&config);
        let items = draw_list(&scene);
        assert_eq!(items.len(), 1 + config.points.len() + 1 + config.props.len());
        assert!(items.iter().all(|(key, _)| *key != DrawKey::Vehicle));

        scene.spawn_vehicle(&config);
        let keys: Vec<_> = draw_list(&scene).into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys[..2], [DrawKey::Ground, DrawKey::Vehicle]);
        assert!(keys.contains(&DrawKey::Marker(2)));
    }

    #[test]
    fn test_object_uniform_carries_material() {
        let config = SceneConfig::default();
        let mut target = Scene::new(&config).hover_target;
        target.material = config.hover.highlight_material;
        let uniform = ObjectUniform::from(&target);
        assert_eq!(uniform.color, config.hover.highlight_material.color);
        assert_eq!(uniform.emissive[3], 0.5);
        assert_eq!(uniform.model, target.model_matrix().to_cols_array_2d());
    }
}
