//! CPU-side mesh container shared by all generators.

use glam::{Vec3, Vec4};

/// Vertex, normal and index buffers for one primitive, ready for GPU upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Homogeneous vertex positions (`w = 1`).
    pub positions: Vec<[f32; 4]>,
    /// Homogeneous vertex normals (`w = 0`).
    pub normals: Vec<[f32; 4]>,
    /// Triangle list indices into `positions` / `normals`.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Create an empty mesh with room for `vertices` vertices and `indices` indices.
    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    /// Append a vertex and return its index.
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.extend(1.0).to_array());
        self.normals.push(normal.extend(0.0).to_array());
        index
    }

    /// Append one triangle.
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Position of vertex `index` as a 3-vector.
    pub fn position(&self, index: u32) -> Vec3 {
        Vec4::from_array(self.positions[index as usize]).truncate()
    }

    /// Normal of vertex `index` as a 3-vector.
    pub fn normal(&self, index: u32) -> Vec3 {
        Vec4::from_array(self.normals[index as usize]).truncate()
    }

    /// Iterate the triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Geometric (unnormalized) face normal of a triangle.
    pub fn face_normal(&self, triangle: [u32; 3]) -> Vec3 {
        let [a, b, c] = triangle.map(|i| self.position(i));
        (b - a).cross(c - a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_vertex_sets_homogeneous_w() {
        let mut mesh = MeshData::default();
        let idx = mesh.push_vertex(Vec3::new(1.0, 2.0, 3.0), Vec3::Z);
        assert_eq!(idx, 0);
        assert_eq!(mesh.positions[0], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(mesh.normals[0], [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_counts() {
        let mut mesh = MeshData::with_capacity(3, 3);
        let a = mesh.push_vertex(Vec3::ZERO, Vec3::Z);
        let b = mesh.push_vertex(Vec3::X, Vec3::Z);
        let c = mesh.push_vertex(Vec3::Y, Vec3::Z);
        mesh.push_triangle(a, b, c);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.triangles().next(), Some([0, 1, 2]));
    }

    #[test]
    fn test_face_normal_follows_winding() {
        let mut mesh = MeshData::default();
        let a = mesh.push_vertex(Vec3::ZERO, Vec3::Z);
        let b = mesh.push_vertex(Vec3::X, Vec3::Z);
        let c = mesh.push_vertex(Vec3::Y, Vec3::Z);
        assert!(mesh.face_normal([a, b, c]).z > 0.0);
        assert!(mesh.face_normal([a, c, b]).z < 0.0);
    }
}
