//! Face and vertex normal derivation.
//!
//! Vertex normals are found by scanning every triangle for every vertex,
//! O(vertices × triangles). Summation follows triangle order.

#![allow(clippy::cast_precision_loss)]

use glam::Vec3;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::mesh::{Mesh, Triangle};

/// Unnormalized face normal `(p1 - p0) × (p2 - p0)`.
///
/// The magnitude is twice the triangle's area, so larger faces weigh more
/// when averaged into a shared vertex.
#[must_use]
pub fn face_normal([p0, p1, p2]: [Vec3; 3]) -> Vec3 {
    (p1 - p0).cross(p2 - p0)
}

/// Face normals for every triangle, in triangle order.
#[must_use]
pub fn face_normals(mesh: &Mesh) -> Vec<Vec3> {
    mesh.triangles
        .iter()
        .map(|triangle| face_normal(mesh.triangle_positions(triangle)))
        .collect()
}

/// Averaged unit normal of one vertex.
///
/// Sums the face normals of every triangle referencing `vertex`, divides by
/// the number of such triangles and normalizes. A vertex no triangle uses,
/// or whose face normals cancel out, gets [`Vec3::ZERO`].
#[must_use]
pub fn vertex_normal(vertex: usize, triangles: &[Triangle], face_normals: &[Vec3]) -> Vec3 {
    let mut sum = Vec3::ZERO;
    let mut adjacent = 0_u32;
    for (triangle, normal) in triangles.iter().zip(face_normals) {
        if triangle.references(vertex) {
            sum += *normal;
            adjacent += 1;
        }
    }

    if adjacent == 0 {
        return Vec3::ZERO;
    }
    (sum / adjacent as f32).normalize_or_zero()
}

/// Derive and store the normal of every vertex.
pub fn derive_vertex_normals(mesh: &mut Mesh) {
    let face_normals = face_normals(mesh);
    let triangles = &mesh.triangles;

    #[cfg(feature = "parallel")]
    mesh.vertices
        .par_iter_mut()
        .enumerate()
        .for_each(|(index, vertex)| {
            vertex.normal = vertex_normal(index, triangles, &face_normals);
        });

    #[cfg(not(feature = "parallel"))]
    for (index, vertex) in mesh.vertices.iter_mut().enumerate() {
        vertex.normal = vertex_normal(index, triangles, &face_normals);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Axis-aligned cube with corners at `0` and `side`, outward winding.
    pub(crate) fn cube(side: f32) -> Mesh {
        let positions: Vec<Vec3> = (0..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 == 0 { 0.0 } else { side },
                    if i & 2 == 0 { 0.0 } else { side },
                    if i & 4 == 0 { 0.0 } else { side },
                )
            })
            .collect();
        let faces = [
            // -z
            [0, 2, 3],
            [0, 3, 1],
            // +z
            [4, 5, 7],
            [4, 7, 6],
            // -y
            [0, 1, 5],
            [0, 5, 4],
            // +y
            [2, 6, 7],
            [2, 7, 3],
            // -x
            [0, 4, 6],
            [0, 6, 2],
            // +x
            [1, 3, 7],
            [1, 7, 5],
        ];
        Mesh::from_positions(&positions, &faces)
    }

    #[test]
    fn test_face_normal_is_area_weighted() {
        let small = face_normal([Vec3::ZERO, Vec3::X, Vec3::Y]);
        let large = face_normal([Vec3::ZERO, Vec3::X * 2.0, Vec3::Y * 2.0]);
        assert_eq!(small, Vec3::Z);
        assert_eq!(large, Vec3::Z * 4.0);
    }

    #[test]
    fn test_cube_faces_point_outward() {
        let mesh = cube(1.0);
        let center = Vec3::splat(0.5);
        for (triangle, normal) in mesh.triangles.iter().zip(face_normals(&mesh)) {
            let [a, b, c] = mesh.triangle_positions(triangle);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid - center) > 0.0, "{triangle:?}");
        }
    }

    #[test]
    fn test_cube_vertex_normals_are_diagonal() {
        let mut mesh = cube(1.0);
        derive_vertex_normals(&mut mesh);
        let center = Vec3::splat(0.5);
        for vertex in &mesh.vertices {
            assert!((vertex.normal.length() - 1.0).abs() < 1e-5);
            let outward = (vertex.position - center).normalize();
            // Diagonal within the tolerance allowed by the uneven triangle fan.
            assert!(vertex.normal.dot(outward) > 0.9, "{vertex:?}");
            for axis in 0..3 {
                assert!(vertex.normal[axis].signum() == outward[axis].signum());
            }
        }
    }

    #[test]
    fn test_orphan_vertex_gets_zero_normal() {
        let mut mesh = Mesh::from_positions(&[Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z], &[[0, 1, 2]]);
        derive_vertex_normals(&mut mesh);
        assert_eq!(mesh.vertices[3].normal, Vec3::ZERO);
        assert_eq!(mesh.vertices[0].normal, Vec3::Z);
    }

    #[test]
    fn test_shared_vertex_averages_faces() {
        // Two faces meeting at a right angle along the x axis.
        let mesh = Mesh::from_positions(
            &[Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
            &[[0, 1, 2], [0, 3, 1]],
        );
        let normals = face_normals(&mesh);
        let shared = vertex_normal(0, &mesh.triangles, &normals);
        let expected = Vec3::new(0.0, -1.0, 1.0).normalize();
        assert!((shared - expected).length() < 1e-6);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_serial_scan() {
        let mut mesh = cube(3.0);
        mesh.vertices[5].position += Vec3::new(0.4, -0.3, 1.1);
        let faces = face_normals(&mesh);
        let serial: Vec<Vec3> = (0..mesh.vertices.len())
            .map(|vertex| vertex_normal(vertex, &mesh.triangles, &faces))
            .collect();

        derive_vertex_normals(&mut mesh);
        for (vertex, expected) in mesh.vertices.iter().zip(&serial) {
            assert_eq!(
                vertex.normal.to_array().map(f32::to_bits),
                expected.to_array().map(f32::to_bits)
            );
        }
    }
}
