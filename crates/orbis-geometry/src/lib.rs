//! Procedural mesh generators for the Orbis scene.
//!
//! Every generator returns a [`MeshData`] with homogeneous positions (`w = 1`),
//! homogeneous normals (`w = 0`) and `u32` triangle indices wound
//! counter-clockwise when seen from outside the shape.

mod error;
mod icosphere;
mod mesh;
mod primitives;

pub use error::GeometryError;
pub use icosphere::{MAX_SUBDIVISIONS, icosphere, icosphere_triangle_count, icosphere_vertex_count};
pub use mesh::MeshData;
pub use primitives::{Primitive, cube, square};
