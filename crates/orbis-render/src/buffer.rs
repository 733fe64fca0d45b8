//! Vertex, index and uniform buffer creation for GPU rendering.

use bytemuck::{Pod, Zeroable};
use orbis_geometry::MeshData;
use wgpu::util::DeviceExt;

use crate::program::{ATTR_NOR, ATTR_POS};

/// Interleaved vertex with homogeneous position and normal.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexPositionNormal {
    pub position: [f32; 4],
    pub normal: [f32; 4],
}

impl VertexPositionNormal {
    /// Vertex buffer layout: `pos` at [`ATTR_POS`], `nor` at [`ATTR_NOR`].
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: ATTR_POS,
                format: wgpu::VertexFormat::Float32x4,
            },
            wgpu::VertexAttribute {
                offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                shader_location: ATTR_NOR,
                format: wgpu::VertexFormat::Float32x4,
            },
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<VertexPositionNormal>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }

    /// Interleave the position and normal streams of a [`MeshData`].
    pub fn interleave(mesh: &MeshData) -> Vec<Self> {
        mesh.positions
            .iter()
            .zip(&mesh.normals)
            .map(|(&position, &normal)| Self { position, normal })
            .collect()
    }
}

/// Vertex and index buffers for one mesh, drawn with `u32` indices.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub vertex_count: u32,
}

impl MeshBuffer {
    /// Bind vertex and index buffers to a render pass.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    /// Draw the entire mesh using indexed rendering.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// GPU buffer allocator for mesh and uniform buffers.
pub struct BufferAllocator<'a> {
    device: &'a wgpu::Device,
}

impl<'a> BufferAllocator<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    /// Upload a generated mesh: one vertex buffer and one index buffer.
    pub fn create_mesh(&self, label: &str, mesh: &MeshData) -> MeshBuffer {
        let vertices = VertexPositionNormal::interleave(mesh);
        let vertex_buffer =
            self.create_vertex_buffer(&format!("{label}-vertices"), bytemuck::cast_slice(&vertices));
        let index_buffer = self.create_index_buffer(&format!("{label}-indices"), &mesh.indices);

        log::debug!(
            "Uploaded mesh '{}': {} vertices, {} indices",
            label,
            vertices.len(),
            mesh.indices.len()
        );

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            vertex_count: vertices.len() as u32,
        }
    }

    /// Create a vertex buffer from raw byte data.
    pub fn create_vertex_buffer(&self, label: &str, data: &[u8]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            })
    }

    /// Create a `u32` index buffer.
    pub fn create_index_buffer(&self, label: &str, data: &[u32]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            })
    }

    /// Create a uniform buffer initialised with `value`.
    pub fn create_uniform_buffer<T: Pod>(&self, label: &str, value: &T) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(value),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::create_test_device;
    use glam::Vec3;

    #[test]
    fn test_vertex_layout_stride_and_locations() {
        let layout = VertexPositionNormal::layout();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[0].shader_location, ATTR_POS);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].shader_location, ATTR_NOR);
        assert_eq!(layout.attributes[1].offset, 16);
        assert_eq!(layout.attributes[1].format, wgpu::VertexFormat::Float32x4);
    }

    #[test]
    fn test_interleave_keeps_streams_paired() {
        let mesh = orbis_geometry::square(Vec3::ZERO);
        let vertices = VertexPositionNormal::interleave(&mesh);
        assert_eq!(vertices.len(), 4);
        for (v, (p, n)) in vertices.iter().zip(mesh.positions.iter().zip(&mesh.normals)) {
            assert_eq!(&v.position, p);
            assert_eq!(&v.normal, n);
        }
    }

    #[test]
    fn test_create_mesh_counts() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let allocator = BufferAllocator::new(&device);
        let mesh = orbis_geometry::cube(Vec3::ZERO);
        let buffer = allocator.create_mesh("cube", &mesh);
        assert_eq!(buffer.index_count, 36);
        assert_eq!(buffer.vertex_count, 24);
        assert_eq!(buffer.vertex_buffer.size(), 24 * 32);
        assert_eq!(buffer.index_buffer.size(), 36 * 4);
    }

    #[test]
    fn test_uniform_buffer_size_matches_value() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let allocator = BufferAllocator::new(&device);
        let buffer = allocator.create_uniform_buffer("test-uniform", &[0.0f32; 8]);
        assert_eq!(buffer.size(), 32);
        assert!(buffer.usage().contains(wgpu::BufferUsages::UNIFORM));
    }
}
