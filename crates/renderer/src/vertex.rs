//! Vertex types and layouts for rendering.

use bytemuck::{Pod, Zeroable};

/// Mesh vertex: position and normal.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Normal
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Per-draw instance data.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// Model matrix (4x4, column major)
    pub model: [[f32; 4]; 4],
    /// Color and opacity
    pub color: [f32; 4],
    /// x = shading mode; for beams y = speed, z/w = horizontal/vertical offset
    pub params: [f32; 4],
}

/// Shading modes understood by scene.wgsl.
pub const MODE_FLAT: f32 = 0.0;
pub const MODE_LIT: f32 = 1.0;
pub const MODE_BEAM: f32 = 2.0;

impl InstanceData {
    pub fn new(model: glam::Mat4, color: [f32; 4], lit: bool) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
            params: [if lit { MODE_LIT } else { MODE_FLAT }, 0.0, 0.0, 0.0],
        }
    }

    pub fn beam(model: glam::Mat4, color: [f32; 4], flow: &engine_core::BeamFlow) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
            params: [MODE_BEAM, flow.speed, flow.horizontal_offset, flow.vertical_offset],
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ROW: wgpu::BufferAddress = std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress;
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // Model matrix columns
                wgpu::VertexAttribute { offset: 0, shader_location: 2, format: wgpu::VertexFormat::Float32x4 },
                wgpu::VertexAttribute { offset: ROW, shader_location: 3, format: wgpu::VertexFormat::Float32x4 },
                wgpu::VertexAttribute { offset: ROW * 2, shader_location: 4, format: wgpu::VertexFormat::Float32x4 },
                wgpu::VertexAttribute { offset: ROW * 3, shader_location: 5, format: wgpu::VertexFormat::Float32x4 },
                // Color
                wgpu::VertexAttribute { offset: ROW * 4, shader_location: 6, format: wgpu::VertexFormat::Float32x4 },
                // Params
                wgpu::VertexAttribute { offset: ROW * 5, shader_location: 7, format: wgpu::VertexFormat::Float32x4 },
            ],
        }
    }
}

impl Default for InstanceData {
    fn default() -> Self {
        Self::new(glam::Mat4::IDENTITY, [1.0; 4], false)
    }
}
