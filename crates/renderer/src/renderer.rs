//! wgpu implementation of the graphics device.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use engine_core::{
    Frame, Geometry, GeometryId, GraphicsDevice, GraphicsError, Material, MaterialId, Mount,
    SurfaceId, Viewport,
};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    batch::{plan_overlay, plan_scene, PlannedDraw},
    camera::SceneUniform,
    mesh::{Mesh, MeshData},
    pipeline::{create_scene_bind_group_layout, PipelineKind, Pipelines},
    texture::Texture,
    vertex::InstanceData,
};

/// Instances the shared instance buffer starts with; it grows on demand.
const INITIAL_INSTANCES: u64 = 256;

/// A window as an attachment target for a rendering surface.
#[derive(Debug, Clone)]
pub struct WindowMount {
    window: Arc<Window>,
    attached: Arc<AtomicBool>,
}

impl WindowMount {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window, attached: Arc::new(AtomicBool::new(true)) }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// The window is closing; surfaces can no longer be detached from it.
    pub fn mark_detached(&self) {
        self.attached.store(false, Ordering::Release);
    }
}

impl Mount for WindowMount {
    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }
}

struct SurfaceTarget {
    /// `None` once detached from its window.
    surface: Option<wgpu::Surface<'static>>,
    config: wgpu::SurfaceConfiguration,
    depth: Texture,
    clear: wgpu::Color,
    viewport: Viewport,
}

/// GPU context shared by every surface, geometry and material it hands out.
pub struct Renderer {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,

    scene_layout: wgpu::BindGroupLayout,
    scene_uniform: SceneUniform,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    overlay_buffer: wgpu::Buffer,
    overlay_bind_group: wgpu::BindGroup,

    instance_buffer: wgpu::Buffer,
    instance_capacity: u64,

    pipelines: HashMap<wgpu::TextureFormat, Pipelines>,
    surfaces: HashMap<SurfaceId, SurfaceTarget>,
    geometries: HashMap<GeometryId, Mesh>,
    materials: HashMap<MaterialId, Material>,
    next_id: u64,
}

impl Renderer {
    /// Create a renderer whose adapter can present to `window`.
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Throwaway surface, only used to pick a compatible adapter
        let adapter_surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&adapter_surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;
        drop(adapter_surface);

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let scene_layout = create_scene_bind_group_layout(&device);
        let scene_uniform = SceneUniform::new();
        let (scene_buffer, scene_bind_group) =
            uniform_binding(&device, &scene_layout, "Scene", &scene_uniform);
        let (overlay_buffer, overlay_bind_group) =
            uniform_binding(&device, &scene_layout, "Overlay", &SceneUniform::new());
        let instance_buffer = create_instance_buffer(&device, INITIAL_INSTANCES);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            scene_layout,
            scene_uniform,
            scene_buffer,
            scene_bind_group,
            overlay_buffer,
            overlay_bind_group,
            instance_buffer,
            instance_capacity: INITIAL_INSTANCES,
            pipelines: HashMap::new(),
            surfaces: HashMap::new(),
            geometries: HashMap::new(),
            materials: HashMap::new(),
            next_id: 0,
        })
    }

    /// Access the device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Live geometry, material and surface counts.
    pub fn resource_counts(&self) -> (usize, usize, usize) {
        (self.geometries.len(), self.materials.len(), self.surfaces.len())
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn ensure_instance_capacity(&mut self, needed: u64) {
        if needed <= self.instance_capacity {
            return;
        }
        let capacity = needed.next_power_of_two();
        log::debug!("Growing instance buffer to {} instances", capacity);
        self.instance_buffer = create_instance_buffer(&self.device, capacity);
        self.instance_capacity = capacity;
    }
}

impl GraphicsDevice for Renderer {
    type Mount = WindowMount;

    fn create_surface(
        &mut self,
        mount: &WindowMount,
        viewport: Viewport,
        clear: [f32; 4],
    ) -> Result<SurfaceId, GraphicsError> {
        let surface = self
            .instance
            .create_surface(mount.window().clone())
            .map_err(|e| GraphicsError::Surface(e.to_string()))?;

        let caps = surface.get_capabilities(&self.adapter);
        // Palette colors are display-space hex values, so prefer a non-sRGB target
        let format = caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| GraphicsError::Surface("surface not supported by adapter".into()))?;
        let alpha_mode = [wgpu::CompositeAlphaMode::PostMultiplied, wgpu::CompositeAlphaMode::PreMultiplied]
            .into_iter()
            .find(|m| caps.alpha_modes.contains(m))
            .or_else(|| caps.alpha_modes.first().copied())
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let (width, height) = viewport.surface_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&self.device, &config);

        let [r, g, b, a] = clear.map(f64::from);
        let clear = if alpha_mode == wgpu::CompositeAlphaMode::PreMultiplied {
            wgpu::Color { r: r * a, g: g * a, b: b * a, a }
        } else {
            wgpu::Color { r, g, b, a }
        };

        let device = &self.device;
        let layout = &self.scene_layout;
        self.pipelines.entry(format).or_insert_with(|| Pipelines::new(device, layout, format));

        let id = SurfaceId(self.next_id());
        let depth = Texture::create_depth_texture(&self.device, width, height, "Depth Texture");
        self.surfaces.insert(id, SurfaceTarget { surface: Some(surface), config, depth, clear, viewport });
        log::info!("Surface {:?} created at {}x{} ({:?})", id, width, height, format);
        Ok(id)
    }

    fn resize_surface(&mut self, surface: SurfaceId, viewport: Viewport) {
        let Some(target) = self.surfaces.get_mut(&surface) else {
            return;
        };
        let (width, height) = viewport.surface_size();
        target.viewport = viewport;
        target.config.width = width;
        target.config.height = height;
        if let Some(s) = &target.surface {
            s.configure(&self.device, &target.config);
        }
        target.depth = Texture::create_depth_texture(&self.device, width, height, "Depth Texture");
    }

    fn detach_surface(&mut self, surface: SurfaceId, _mount: &WindowMount) {
        if let Some(target) = self.surfaces.get_mut(&surface) {
            // Dropping the wgpu surface releases the window's swapchain
            target.surface = None;
        }
    }

    fn release_surface(&mut self, surface: SurfaceId) {
        if self.surfaces.remove(&surface).is_some() {
            log::debug!("Surface {:?} released", surface);
        }
    }

    fn create_geometry(&mut self, geometry: &Geometry) -> Result<GeometryId, GraphicsError> {
        let mesh = MeshData::from_geometry(geometry).upload(&self.device);
        let id = GeometryId(self.next_id());
        self.geometries.insert(id, mesh);
        Ok(id)
    }

    fn release_geometry(&mut self, geometry: GeometryId) {
        if let Some(mesh) = self.geometries.remove(&geometry) {
            mesh.vertex_buffer.destroy();
        }
    }

    fn create_material(&mut self, material: &Material) -> Result<MaterialId, GraphicsError> {
        let id = MaterialId(self.next_id());
        self.materials.insert(id, *material);
        Ok(id)
    }

    fn release_material(&mut self, material: MaterialId) {
        self.materials.remove(&material);
    }

    fn render(&mut self, surface: SurfaceId, frame: &Frame<'_>) -> Result<(), GraphicsError> {
        let viewport = self
            .surfaces
            .get(&surface)
            .map(|t| t.viewport)
            .ok_or(GraphicsError::UnknownSurface(surface))?;

        let scene_draws = plan_scene(frame.draws, &self.materials, frame.camera.position());
        let overlay_draws = plan_overlay(frame.overlay, &self.materials);
        let instances: Vec<InstanceData> =
            scene_draws.iter().chain(&overlay_draws).map(|d| d.instance).collect();
        self.ensure_instance_capacity(instances.len() as u64);
        if !instances.is_empty() {
            self.queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        self.scene_uniform.update(frame.camera, frame.lights);
        self.scene_uniform.set_time(frame.time);
        self.queue.write_buffer(&self.scene_buffer, 0, bytemuck::cast_slice(&[self.scene_uniform]));
        let overlay_uniform = SceneUniform::overlay(viewport.width, viewport.height);
        self.queue.write_buffer(&self.overlay_buffer, 0, bytemuck::cast_slice(&[overlay_uniform]));

        let target = self
            .surfaces
            .get(&surface)
            .ok_or(GraphicsError::UnknownSurface(surface))?;
        let Some(wgpu_surface) = target.surface.as_ref() else {
            return Err(GraphicsError::UnknownSurface(surface));
        };
        let output = match wgpu_surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface {:?} lost, reconfiguring", surface);
                wgpu_surface.configure(&self.device, &target.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface {:?} timed out, skipping frame", surface);
                return Ok(());
            }
            Err(e) => return Err(GraphicsError::Present(e.to_string())),
        };
        let pipelines = self
            .pipelines
            .get(&target.config.format)
            .ok_or_else(|| GraphicsError::Present("no pipelines for surface format".into()))?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(target.clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &target.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.scene_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            encode_draws(&mut pass, pipelines, &self.geometries, &scene_draws, 0);
        }

        if !overlay_draws.is_empty() {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.overlay_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            encode_draws(&mut pass, pipelines, &self.geometries, &overlay_draws, scene_draws.len() as u32);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Record `draws`, whose instances start at `first_instance` in the instance buffer.
fn encode_draws(
    pass: &mut wgpu::RenderPass<'_>,
    pipelines: &Pipelines,
    geometries: &HashMap<GeometryId, Mesh>,
    draws: &[PlannedDraw],
    first_instance: u32,
) {
    let mut bound = None;
    for (i, draw) in draws.iter().enumerate() {
        let Some(mesh) = geometries.get(&draw.geometry) else {
            continue;
        };
        if bound != Some(draw.kind) {
            pass.set_pipeline(pipelines.get(draw.kind));
            bound = Some(draw.kind);
        }
        let instance = first_instance + i as u32;
        let instances = instance..instance + 1;
        pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        match draw.kind {
            PipelineKind::Opaque
            | PipelineKind::Translucent
            | PipelineKind::Additive
            | PipelineKind::Overlay => {
                if let Some(tris) = &mesh.triangles {
                    pass.set_index_buffer(tris.buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..tris.count, 0, instances);
                }
            }
            PipelineKind::Lines => {
                if let Some(lines) = &mesh.lines {
                    pass.set_index_buffer(lines.buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..lines.count, 0, instances);
                }
            }
            PipelineKind::Points => {
                if mesh.vertex_count > 0 {
                    pass.draw(0..mesh.vertex_count, instances);
                }
            }
        }
    }
}

fn uniform_binding(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    label: &str,
    uniform: &SceneUniform,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} Uniform Buffer")),
        contents: bytemuck::cast_slice(&[*uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label} Bind Group")),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });
    (buffer, bind_group)
}

fn create_instance_buffer(device: &wgpu::Device, capacity: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        size: capacity * std::mem::size_of::<InstanceData>() as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
