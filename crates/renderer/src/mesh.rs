//! Mesh data structures and primitive generation.

use std::collections::HashSet;
use std::f32::consts::{PI, TAU};

use crate::vertex::Vertex;
use engine_core::Geometry;
use glam::Vec3;
use wgpu::util::DeviceExt;

/// An index buffer and how many indices it holds.
pub struct IndexBuffer {
    pub buffer: wgpu::Buffer,
    pub count: u32,
}

/// A GPU mesh: one vertex buffer, with triangle and edge index lists where the shape has them.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
    pub triangles: Option<IndexBuffer>,
    pub lines: Option<IndexBuffer>,
}

impl Mesh {
    fn index_buffer(device: &wgpu::Device, label: &str, indices: &[u32]) -> Option<IndexBuffer> {
        if indices.is_empty() {
            return None;
        }
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Some(IndexBuffer { buffer, count: indices.len() as u32 })
    }
}

/// Mesh data before GPU upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
    /// Line list indices.
    pub lines: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_geometry(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Sphere { radius, segments, rings } => Self::sphere(*radius, *segments, *rings),
            Geometry::Ring { inner_radius, outer_radius, segments } => {
                Self::ring(*inner_radius, *outer_radius, *segments)
            }
            Geometry::Quad { width, height } => Self::quad(*width, *height),
            Geometry::Points(points) => Self::points(points),
            Geometry::Polyline(points) => Self::polyline(points),
        }
    }

    /// UV sphere with its triangle edges as a line list.
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut data = Self::new();

        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            let y = radius * phi.cos();
            let ring_radius = radius * phi.sin();

            for segment in 0..=segments {
                let theta = TAU * segment as f32 / segments as f32;
                let x = ring_radius * theta.cos();
                let z = ring_radius * theta.sin();
                let normal = Vec3::new(x, y, z).normalize_or_zero();
                data.vertices.push(Vertex::new([x, y, z], normal.into()));
            }
        }

        for ring in 0..rings {
            for segment in 0..segments {
                let current = ring * (segments + 1) + segment;
                let next = current + segments + 1;
                data.indices.extend_from_slice(&[current, next, current + 1]);
                data.indices.extend_from_slice(&[current + 1, next, next + 1]);
            }
        }
        data.lines = edges(&data.indices);
        data
    }

    /// Flat annulus in the XY plane facing +Z.
    pub fn ring(inner_radius: f32, outer_radius: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let mut data = Self::new();
        for segment in 0..=segments {
            let theta = TAU * segment as f32 / segments as f32;
            let (sin, cos) = theta.sin_cos();
            data.vertices.push(Vertex::new([cos * inner_radius, sin * inner_radius, 0.0], [0.0, 0.0, 1.0]));
            data.vertices.push(Vertex::new([cos * outer_radius, sin * outer_radius, 0.0], [0.0, 0.0, 1.0]));
        }
        for segment in 0..segments {
            let inner = segment * 2;
            let outer = inner + 1;
            let next_inner = inner + 2;
            let next_outer = inner + 3;
            data.indices.extend_from_slice(&[inner, outer, next_outer]);
            data.indices.extend_from_slice(&[inner, next_outer, next_inner]);
        }
        data.lines = edges(&data.indices);
        data
    }

    /// Quad in the XY plane centred on the origin, facing +Z.
    pub fn quad(width: f32, height: f32) -> Self {
        let (w, h) = (width / 2.0, height / 2.0);
        let n = [0.0, 0.0, 1.0];
        let vertices = vec![
            Vertex::new([-w, -h, 0.0], n),
            Vertex::new([w, -h, 0.0], n),
            Vertex::new([w, h, 0.0], n),
            Vertex::new([-w, h, 0.0], n),
        ];
        let indices = vec![0, 1, 2, 2, 3, 0];
        let lines = edges(&indices);
        Self { vertices, indices, lines }
    }

    pub fn points(points: &[Vec3]) -> Self {
        Self {
            vertices: points.iter().map(|p| Vertex::new((*p).into(), [0.0, 1.0, 0.0])).collect(),
            ..Self::default()
        }
    }

    /// Consecutive points joined by line segments.
    pub fn polyline(points: &[Vec3]) -> Self {
        let count = points.len() as u32;
        Self {
            vertices: points.iter().map(|p| Vertex::new((*p).into(), [0.0, 1.0, 0.0])).collect(),
            lines: (1..count).flat_map(|i| [i - 1, i]).collect(),
            ..Self::default()
        }
    }

    pub fn upload(&self, device: &wgpu::Device) -> Mesh {
        // Zero-length buffers are not allowed; pad empty meshes with one vertex
        let fallback = [Vertex::new([0.0; 3], [0.0, 1.0, 0.0])];
        let vertices: &[Vertex] = if self.vertices.is_empty() { &fallback } else { &self.vertices };
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Mesh {
            vertex_buffer,
            vertex_count: self.vertices.len() as u32,
            triangles: Mesh::index_buffer(device, "Index Buffer", &self.indices),
            lines: Mesh::index_buffer(device, "Edge Index Buffer", &self.lines),
        }
    }
}

/// Unique triangle edges as a line list, skipping collapsed edges at the poles.
fn edges(triangles: &[u32]) -> Vec<u32> {
    let mut seen = HashSet::new();
    let mut lines = Vec::new();
    for tri in triangles.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            if a != b && seen.insert((a.min(b), a.max(b))) {
                lines.extend_from_slice(&[a, b]);
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let data = MeshData::sphere(2.5, 32, 32);
        assert_eq!(data.vertices.len(), 33 * 33);
        assert_eq!(data.indices.len(), 32 * 32 * 6);
        for v in &data.vertices {
            assert!((Vec3::from(v.position).length() - 2.5).abs() < 1e-4);
        }
    }

    #[test]
    fn edges_are_unique() {
        let data = MeshData::sphere(1.0, 8, 6);
        let mut pairs: Vec<(u32, u32)> = data
            .lines
            .chunks_exact(2)
            .map(|l| (l[0].min(l[1]), l[0].max(l[1])))
            .collect();
        let total = pairs.len();
        pairs.sort_unstable();
        pairs.dedup();
        assert_eq!(pairs.len(), total);
        assert!(total > 0);
    }

    #[test]
    fn ring_spans_inner_to_outer() {
        let data = MeshData::ring(5.8, 6.2, 64);
        for v in &data.vertices {
            let r = Vec3::from(v.position).length();
            assert!((5.8 - 1e-4..=6.2 + 1e-4).contains(&r));
            assert_eq!(v.position[2], 0.0);
        }
        assert_eq!(data.indices.len(), 64 * 6);
    }

    #[test]
    fn polyline_joins_neighbours() {
        let data = MeshData::polyline(&[Vec3::ZERO, Vec3::X, Vec3::Y]);
        assert_eq!(data.lines, vec![0, 1, 1, 2]);
        assert!(data.indices.is_empty());
    }

    #[test]
    fn points_have_no_indices() {
        let data = MeshData::from_geometry(&Geometry::Points(vec![Vec3::ONE; 5]));
        assert_eq!(data.vertices.len(), 5);
        assert!(data.indices.is_empty() && data.lines.is_empty());
    }
}
