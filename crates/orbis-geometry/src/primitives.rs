//! Flat-shaded primitives: a unit square and a unit cube.

use glam::Vec3;

use crate::error::GeometryError;
use crate::icosphere::icosphere;
use crate::mesh::MeshData;

/// Append one quad of half-extent 1 spanned by `u` and `v`, facing `u × v`.
fn push_quad(mesh: &mut MeshData, center: Vec3, u: Vec3, v: Vec3) {
    let normal = u.cross(v);
    let base = mesh.push_vertex(center - u - v, normal);
    mesh.push_vertex(center + u - v, normal);
    mesh.push_vertex(center + u + v, normal);
    mesh.push_vertex(center - u + v, normal);
    mesh.push_triangle(base, base + 1, base + 2);
    mesh.push_triangle(base, base + 2, base + 3);
}

/// A 2×2 square in the XY plane centred on `center`, facing +Z.
pub fn square(center: Vec3) -> MeshData {
    let mut mesh = MeshData::with_capacity(4, 6);
    push_quad(&mut mesh, center, Vec3::X, Vec3::Y);
    mesh
}

/// A 2×2×2 cube centred on `center` with one flat-shaded quad per face.
pub fn cube(center: Vec3) -> MeshData {
    // (u, v) pairs with u × v equal to the outward face normal.
    const FACES: [(Vec3, Vec3); 6] = [
        (Vec3::Y, Vec3::Z),
        (Vec3::Z, Vec3::Y),
        (Vec3::Z, Vec3::X),
        (Vec3::X, Vec3::Z),
        (Vec3::X, Vec3::Y),
        (Vec3::Y, Vec3::X),
    ];

    let mut mesh = MeshData::with_capacity(24, 36);
    for (u, v) in FACES {
        push_quad(&mut mesh, center + u.cross(v), u, v);
    }
    mesh
}

/// The primitive shapes the scene knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Icosphere { subdivisions: u32 },
    Square,
    Cube,
}

impl Primitive {
    /// Build the primitive at `center` (icospheres use radius 1).
    pub fn generate(self, center: Vec3) -> Result<MeshData, GeometryError> {
        match self {
            Primitive::Icosphere { subdivisions } => icosphere(center, 1.0, subdivisions),
            Primitive::Square => Ok(square(center)),
            Primitive::Cube => Ok(cube(center)),
        }
    }

    /// Short label used for GPU buffer names and logs.
    pub fn label(self) -> &'static str {
        match self {
            Primitive::Icosphere { .. } => "icosphere",
            Primitive::Square => "square",
            Primitive::Cube => "cube",
        }
    }
}
