//! Render pipelines, one set per surface format.

use crate::texture::Texture;
use crate::vertex::{InstanceData, Vertex};

const SHADER: &str = include_str!("shaders/scene.wgsl");

/// `src * src_alpha + dst`
const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Which pipeline a draw goes through. Draws run in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineKind {
    /// Triangles, depth write on.
    Opaque,
    /// Triangles, alpha blended, depth write off.
    Translucent,
    /// Triangles added onto the target, depth write off.
    Additive,
    /// Line list (wireframes, spokes).
    Lines,
    /// Point list.
    Points,
    /// Screen-space triangles, no depth.
    Overlay,
}

pub fn create_scene_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Scene Bind Group Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// All pipelines for one surface format.
pub struct Pipelines {
    opaque: wgpu::RenderPipeline,
    translucent: wgpu::RenderPipeline,
    additive: wgpu::RenderPipeline,
    lines: wgpu::RenderPipeline,
    points: wgpu::RenderPipeline,
    overlay: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[layout],
            push_constant_ranges: &[],
        });

        let build = |label: &str,
                     topology: wgpu::PrimitiveTopology,
                     depth: Option<bool>,
                     blend: wgpu::BlendState| {
            create_pipeline(device, &pipeline_layout, &shader, format, label, topology, depth, blend)
        };
        let alpha = wgpu::BlendState::ALPHA_BLENDING;
        let triangles = wgpu::PrimitiveTopology::TriangleList;

        Self {
            opaque: build("Opaque Pipeline", triangles, Some(true), alpha),
            translucent: build("Translucent Pipeline", triangles, Some(false), alpha),
            additive: build("Additive Pipeline", triangles, Some(false), ADDITIVE_BLENDING),
            lines: build("Line Pipeline", wgpu::PrimitiveTopology::LineList, Some(false), alpha),
            points: build("Point Pipeline", wgpu::PrimitiveTopology::PointList, Some(false), alpha),
            overlay: build("Overlay Pipeline", triangles, None, alpha),
        }
    }

    pub fn get(&self, kind: PipelineKind) -> &wgpu::RenderPipeline {
        match kind {
            PipelineKind::Opaque => &self.opaque,
            PipelineKind::Translucent => &self.translucent,
            PipelineKind::Additive => &self.additive,
            PipelineKind::Lines => &self.lines,
            PipelineKind::Points => &self.points,
            PipelineKind::Overlay => &self.overlay,
        }
    }
}

/// `depth`: `None` for no depth attachment, otherwise whether depth is written.
#[allow(clippy::too_many_arguments)]
fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
    topology: wgpu::PrimitiveTopology,
    depth: Option<bool>,
    blend: wgpu::BlendState,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout(), InstanceData::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            front_face: wgpu::FrontFace::Ccw,
            // Rings and cards are seen from both sides
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: depth.map(|write| wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
