//! Internal depth estimation.
//!
//! Every vertex casts a ray along its inward normal and records the nearest
//! forward hit against the whole triangle set. There is no acceleration
//! structure: the search is O(vertices × triangles), and ties between
//! equally distant hits resolve to the same distance either way.

use glam::Vec3;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::mesh::Mesh;

/// Determinant magnitude below which a ray counts as parallel to a triangle.
pub const PARALLEL_EPSILON: f32 = 1e-5;

/// Smallest accepted hit distance; rejects the ray's own origin triangle.
pub const MIN_HIT_DISTANCE: f32 = 1e-5;

/// Möller–Trumbore ray-triangle intersection.
///
/// Returns the ray parameter `t` of a strictly forward hit.
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn ray_triangle_intersect(origin: Vec3, direction: Vec3, [p0, p1, p2]: [Vec3; 3]) -> Option<f32> {
    let e1 = p1 - p0;
    let e2 = p2 - p0;
    let h = direction.cross(e2);
    let a = e1.dot(h);
    if a.abs() < PARALLEL_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - p0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(e1);
    let v = f * direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * e2.dot(q);
    (t > MIN_HIT_DISTANCE).then_some(t)
}

/// Per-vertex internal depth, indexed like the mesh's vertex table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InternalDepth {
    distances: Vec<f32>,
}

impl InternalDepth {
    /// Depth of a vertex whose inward ray hit nothing.
    ///
    /// This is a sentinel, not a distance; test with [`InternalDepth::is_hit`].
    pub const NO_HIT: f32 = f32::MAX;

    /// Wrap precomputed distances.
    #[must_use]
    pub const fn from_distances(distances: Vec<f32>) -> Self {
        Self { distances }
    }

    /// Whether a depth value is a real distance.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_hit(depth: f32) -> bool {
        depth != Self::NO_HIT
    }

    /// Depth of a 0-based vertex.
    ///
    /// # Panics
    ///
    /// Panics if `vertex` is out of range.
    #[must_use]
    pub fn get(&self, vertex: usize) -> f32 {
        self.distances[vertex]
    }

    /// Depth of a 0-based vertex, or `None` if out of range.
    #[must_use]
    pub fn try_get(&self, vertex: usize) -> Option<f32> {
        self.distances.get(vertex).copied()
    }

    /// A table of `len` vertices, none of which hit anything.
    #[must_use]
    pub fn unhit(len: usize) -> Self {
        Self::from_distances(vec![Self::NO_HIT; len])
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.distances
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Number of vertices whose ray hit something.
    #[must_use]
    pub fn hit_count(&self) -> usize {
        self.distances.iter().filter(|d| Self::is_hit(**d)).count()
    }

    /// Smallest and largest real depth, if any vertex hit.
    #[must_use]
    pub fn hit_range(&self) -> Option<(f32, f32)> {
        self.distances
            .iter()
            .copied()
            .filter(|d| Self::is_hit(*d))
            .fold(None, |range, d| match range {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            })
    }
}

/// Nearest forward hit of a ray against every triangle of the mesh.
#[must_use]
pub fn nearest_hit(mesh: &Mesh, origin: Vec3, direction: Vec3) -> Option<f32> {
    mesh.triangles
        .iter()
        .filter_map(|triangle| {
            ray_triangle_intersect(origin, direction, mesh.triangle_positions(triangle))
        })
        .reduce(f32::min)
}

/// Internal depth of one vertex, or [`InternalDepth::NO_HIT`].
///
/// A vertex with a zero normal casts a zero-length ray, which every
/// triangle rejects as parallel.
#[must_use]
pub fn vertex_depth(mesh: &Mesh, vertex: usize) -> f32 {
    let vertex = &mesh.vertices[vertex];
    let inward = -vertex.normal.normalize_or_zero();
    nearest_hit(mesh, vertex.position, inward).unwrap_or(InternalDepth::NO_HIT)
}

/// Estimate the internal depth of every vertex.
///
/// Vertex normals must already be derived.
#[must_use]
pub fn estimate_internal_depth(mesh: &Mesh) -> InternalDepth {
    #[cfg(feature = "parallel")]
    let distances = (0..mesh.vertices.len())
        .into_par_iter()
        .map(|vertex| vertex_depth(mesh, vertex))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let distances = (0..mesh.vertices.len())
        .map(|vertex| vertex_depth(mesh, vertex))
        .collect();

    InternalDepth::from_distances(distances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normals::derive_vertex_normals;
    use crate::normals::tests::cube;

    const TRIANGLE: [Vec3; 3] = [Vec3::ZERO, Vec3::X, Vec3::Y];

    #[test]
    fn test_hit_through_interior() {
        let t = ray_triangle_intersect(Vec3::new(0.25, 0.25, 1.0), Vec3::NEG_Z, TRIANGLE).unwrap();
        assert!((t - 1.0).abs() < 1e-6);

        // Back faces hit too; the test is not culled.
        let t = ray_triangle_intersect(Vec3::new(0.25, 0.25, -2.0), Vec3::Z, TRIANGLE).unwrap();
        assert!((t - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_parallel_ray() {
        assert_eq!(ray_triangle_intersect(Vec3::new(-1.0, 0.25, 0.0), Vec3::X, TRIANGLE), None);
        assert_eq!(ray_triangle_intersect(Vec3::new(0.1, 0.1, 1.0), Vec3::X, TRIANGLE), None);
        assert_eq!(ray_triangle_intersect(Vec3::new(0.25, 0.25, 1.0), Vec3::ZERO, TRIANGLE), None);
    }

    #[test]
    fn test_rejects_outside_barycentric_range() {
        // u > 1
        assert_eq!(ray_triangle_intersect(Vec3::new(1.5, 0.1, 1.0), Vec3::NEG_Z, TRIANGLE), None);
        // u < 0
        assert_eq!(ray_triangle_intersect(Vec3::new(-0.5, 0.1, 1.0), Vec3::NEG_Z, TRIANGLE), None);
        // v < 0
        assert_eq!(ray_triangle_intersect(Vec3::new(0.1, -0.5, 1.0), Vec3::NEG_Z, TRIANGLE), None);
        // u + v > 1
        assert_eq!(ray_triangle_intersect(Vec3::new(0.6, 0.6, 1.0), Vec3::NEG_Z, TRIANGLE), None);
    }

    #[test]
    fn test_rejects_backward_and_origin_hits() {
        assert_eq!(ray_triangle_intersect(Vec3::new(0.25, 0.25, 1.0), Vec3::Z, TRIANGLE), None);
        assert_eq!(ray_triangle_intersect(Vec3::new(0.25, 0.25, 0.0), Vec3::NEG_Z, TRIANGLE), None);
    }

    #[test]
    fn test_single_flat_triangle_never_hits() {
        let mut mesh = Mesh::from_positions(&TRIANGLE, &[[0, 1, 2]]);
        assert_eq!(nearest_hit(&mesh, Vec3::new(0.25, 0.25, 0.0), Vec3::NEG_Z), None);

        derive_vertex_normals(&mut mesh);
        let depth = estimate_internal_depth(&mesh);
        assert_eq!(depth.len(), 3);
        assert_eq!(depth.hit_count(), 0);
        assert_eq!(depth.get(0).to_bits(), InternalDepth::NO_HIT.to_bits());
        assert_eq!(depth.hit_range(), None);
    }

    #[test]
    fn test_nearest_of_several_hits() {
        let mesh = Mesh::from_positions(
            &[
                Vec3::new(-1.0, -1.0, 1.0),
                Vec3::new(1.0, -1.0, 1.0),
                Vec3::new(0.0, 1.0, 1.0),
                Vec3::new(-1.0, -1.0, 3.0),
                Vec3::new(1.0, -1.0, 3.0),
                Vec3::new(0.0, 1.0, 3.0),
            ],
            &[[3, 4, 5], [0, 1, 2]],
        );
        let t = nearest_hit(&mesh, Vec3::ZERO, Vec3::Z).unwrap();
        assert!((t - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cube_depth_spans_to_opposite_side() {
        for side in [1.0_f32, 2.0] {
            let mut mesh = cube(side);
            derive_vertex_normals(&mut mesh);
            let depth = estimate_internal_depth(&mesh);
            assert_eq!(depth.hit_count(), 8);
            for &d in depth.as_slice() {
                assert!(d >= side - 1e-4, "{d}");
                assert!(d <= side * 3.0_f32.sqrt() + 1e-4, "{d}");
            }
            let (lo, hi) = depth.hit_range().unwrap();
            assert!(lo < hi);
        }
    }

    #[test]
    fn test_orphan_vertex_has_no_depth() {
        let mut mesh = cube(1.0);
        mesh.vertices.push(crate::mesh::RawVertex::new(Vec3::splat(0.5)));
        derive_vertex_normals(&mut mesh);
        let depth = estimate_internal_depth(&mesh);
        assert!(!InternalDepth::is_hit(depth.get(8)));
        assert_eq!(depth.hit_count(), 8);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_serial_scan() {
        let mut mesh = cube(2.0);
        mesh.vertices[6].position += Vec3::new(-0.5, 0.25, 0.75);
        derive_vertex_normals(&mut mesh);

        let serial: Vec<u32> = (0..mesh.vertices.len())
            .map(|vertex| vertex_depth(&mesh, vertex).to_bits())
            .collect();
        let parallel: Vec<u32> = estimate_internal_depth(&mesh)
            .as_slice()
            .iter()
            .map(|d| d.to_bits())
            .collect();
        assert_eq!(parallel, serial);
    }
}
