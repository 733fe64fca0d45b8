//! Icosphere generation by recursive midpoint subdivision of an icosahedron.

use std::collections::HashMap;

use glam::Vec3;

use crate::error::GeometryError;
use crate::mesh::MeshData;

/// Highest subdivision level accepted by [`icosphere`] (655 362 vertices).
pub const MAX_SUBDIVISIONS: u32 = 8;

/// Triangle list of the base icosahedron, CCW from outside.
const ICOSAHEDRON_FACES: [[u32; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// The twelve icosahedron corners projected onto the unit sphere.
fn icosahedron_vertices() -> Vec<Vec3> {
    let phi = (1.0 + 5.0_f32.sqrt()) * 0.5;
    [
        (-1.0, phi, 0.0),
        (1.0, phi, 0.0),
        (-1.0, -phi, 0.0),
        (1.0, -phi, 0.0),
        (0.0, -1.0, phi),
        (0.0, 1.0, phi),
        (0.0, -1.0, -phi),
        (0.0, 1.0, -phi),
        (phi, 0.0, -1.0),
        (phi, 0.0, 1.0),
        (-phi, 0.0, -1.0),
        (-phi, 0.0, 1.0),
    ]
    .into_iter()
    .map(|(x, y, z)| Vec3::new(x, y, z).normalize())
    .collect()
}

/// Number of vertices of an icosphere with `subdivisions` passes: `10 * 4^n + 2`.
pub fn icosphere_vertex_count(subdivisions: u32) -> usize {
    10 * 4usize.pow(subdivisions) + 2
}

/// Number of triangles of an icosphere with `subdivisions` passes: `20 * 4^n`.
pub fn icosphere_triangle_count(subdivisions: u32) -> usize {
    20 * 4usize.pow(subdivisions)
}

/// Shares edge midpoints between the two triangles adjacent to each edge.
struct MidpointCache {
    midpoints: HashMap<(u32, u32), u32>,
}

impl MidpointCache {
    fn with_capacity(edges: usize) -> Self {
        Self {
            midpoints: HashMap::with_capacity(edges),
        }
    }

    /// Index of the unit-sphere midpoint of edge `a-b`, creating it on first use.
    fn midpoint(&mut self, vertices: &mut Vec<Vec3>, a: u32, b: u32) -> u32 {
        let key = (a.min(b), a.max(b));
        *self.midpoints.entry(key).or_insert_with(|| {
            let mid = (vertices[a as usize] + vertices[b as usize]).normalize();
            vertices.push(mid);
            (vertices.len() - 1) as u32
        })
    }
}

/// Split every triangle into four, reusing shared edge midpoints.
fn subdivide(vertices: &mut Vec<Vec3>, faces: &[[u32; 3]]) -> Vec<[u32; 3]> {
    // Euler: E = 3F / 2 for a closed triangle mesh.
    let mut cache = MidpointCache::with_capacity(faces.len() * 3 / 2);
    let mut out = Vec::with_capacity(faces.len() * 4);

    for &[a, b, c] in faces {
        let ab = cache.midpoint(vertices, a, b);
        let bc = cache.midpoint(vertices, b, c);
        let ca = cache.midpoint(vertices, c, a);

        out.push([a, ab, ca]);
        out.push([b, bc, ab]);
        out.push([c, ca, bc]);
        out.push([ab, bc, ca]);
    }

    out
}

/// Generate an icosphere centred on `center` with the given `radius`.
///
/// Normals are the unit directions from the centre. Returns
/// [`GeometryError::TessellationOutOfRange`] when `subdivisions` exceeds
/// [`MAX_SUBDIVISIONS`].
pub fn icosphere(center: Vec3, radius: f32, subdivisions: u32) -> Result<MeshData, GeometryError> {
    if subdivisions > MAX_SUBDIVISIONS {
        return Err(GeometryError::TessellationOutOfRange {
            requested: subdivisions,
            max: MAX_SUBDIVISIONS,
        });
    }

    let mut vertices = icosahedron_vertices();
    vertices.reserve(icosphere_vertex_count(subdivisions) - vertices.len());
    let mut faces = ICOSAHEDRON_FACES.to_vec();

    for _ in 0..subdivisions {
        faces = subdivide(&mut vertices, &faces);
    }

    let mut mesh = MeshData::with_capacity(vertices.len(), faces.len() * 3);
    for unit in &vertices {
        mesh.push_vertex(center + *unit * radius, *unit);
    }
    for [a, b, c] in faces {
        mesh.push_triangle(a, b, c);
    }

    log::debug!(
        "Generated icosphere: subdivisions={}, vertices={}, triangles={}",
        subdivisions,
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_icosahedron_counts() {
        let mesh = icosphere(Vec3::ZERO, 1.0, 0).unwrap();
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.triangle_count(), 20);
    }

    #[test]
    fn test_counts_follow_closed_form() {
        for n in 0..=MAX_SUBDIVISIONS {
            let mesh = icosphere(Vec3::ZERO, 1.0, n).unwrap();
            assert_eq!(mesh.vertex_count(), icosphere_vertex_count(n), "n = {n}");
            assert_eq!(mesh.triangle_count(), icosphere_triangle_count(n), "n = {n}");
        }
    }

    #[test]
    fn test_default_tessellation_size() {
        let mesh = icosphere(Vec3::ZERO, 1.0, 5).unwrap();
        assert_eq!(mesh.vertex_count(), 10_242);
        assert_eq!(mesh.triangle_count(), 20_480);
    }

    #[test]
    fn test_max_subdivisions_accepted() {
        let mesh = icosphere(Vec3::ZERO, 1.0, MAX_SUBDIVISIONS).unwrap();
        assert_eq!(mesh.vertex_count(), 655_362);
        assert_eq!(mesh.triangle_count(), 1_310_720);
        let n = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn test_vertices_lie_on_sphere() {
        let center = Vec3::new(1.0, -2.0, 0.5);
        let mesh = icosphere(center, 2.5, 3).unwrap();
        for i in 0..mesh.vertex_count() as u32 {
            let dist = (mesh.position(i) - center).length();
            assert!((dist - 2.5).abs() < 1e-4, "vertex {i} at distance {dist}");
        }
    }

    #[test]
    fn test_normals_are_unit_and_radial() {
        let mesh = icosphere(Vec3::ZERO, 3.0, 2).unwrap();
        for i in 0..mesh.vertex_count() as u32 {
            let n = mesh.normal(i);
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!(n.dot(mesh.position(i).normalize()) > 0.9999);
            assert_eq!(mesh.normals[i as usize][3], 0.0);
            assert_eq!(mesh.positions[i as usize][3], 1.0);
        }
    }

    #[test]
    fn test_indices_in_bounds() {
        let mesh = icosphere(Vec3::ZERO, 1.0, 4).unwrap();
        let n = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn test_winding_is_ccw_from_outside() {
        let mesh = icosphere(Vec3::ZERO, 1.0, 3).unwrap();
        for tri in mesh.triangles() {
            let centroid = tri.map(|i| mesh.position(i)).iter().copied().sum::<Vec3>() / 3.0;
            assert!(
                mesh.face_normal(tri).dot(centroid) > 0.0,
                "triangle {tri:?} faces inward"
            );
        }
    }

    #[test]
    fn test_midpoints_are_shared() {
        // A closed mesh has every edge used by exactly two triangles.
        let mesh = icosphere(Vec3::ZERO, 1.0, 2).unwrap();
        let mut edges: HashMap<(u32, u32), u32> = HashMap::new();
        for [a, b, c] in mesh.triangles() {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                *edges.entry((u.min(v), u.max(v))).or_default() += 1;
            }
        }
        assert!(edges.values().all(|&count| count == 2));
    }

    #[test]
    fn test_out_of_range_tessellation_rejected() {
        let err = icosphere(Vec3::ZERO, 1.0, MAX_SUBDIVISIONS + 1).unwrap_err();
        assert_eq!(
            err,
            GeometryError::TessellationOutOfRange {
                requested: 9,
                max: 8
            }
        );
    }
}
