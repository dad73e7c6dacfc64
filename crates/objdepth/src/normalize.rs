//! Centering and uniform scaling.

#![allow(clippy::cast_precision_loss)]

use glam::{DVec3, Vec3};

use crate::mesh::Mesh;

/// Lower bound on the uniform scale, so tiny or single-point meshes are not
/// blown up.
pub const MIN_SCALE: f32 = 0.5;

/// Mean position of every vertex, or zero for an empty table.
///
/// Accumulates in `f64`, so coordinates near `f32::MAX` do not overflow the
/// sum.
#[must_use]
pub fn centroid(mesh: &Mesh) -> Vec3 {
    if mesh.vertices.is_empty() {
        return Vec3::ZERO;
    }
    let sum = mesh
        .vertices
        .iter()
        .fold(DVec3::ZERO, |sum, vertex| sum + vertex.position.as_dvec3());
    (sum / mesh.vertices.len() as f64).as_vec3()
}

/// Component-wise minimum and maximum of every vertex position.
#[must_use]
pub fn bounds(mesh: &Mesh) -> (Vec3, Vec3) {
    mesh.vertices.iter().fold(
        (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
        |(min, max), vertex| (min.min(vertex.position), max.max(vertex.position)),
    )
}

/// Translate every vertex by `-offset`.
pub fn recenter(mesh: &mut Mesh, offset: Vec3) {
    for vertex in &mut mesh.vertices {
        vertex.position -= offset;
    }
}

/// Largest absolute coordinate per axis over every triangle corner.
///
/// Vertices no triangle references do not contribute.
#[must_use]
pub fn corner_extents(mesh: &Mesh) -> Vec3 {
    mesh.triangles
        .iter()
        .flat_map(|triangle| mesh.triangle_positions(triangle))
        .fold(Vec3::ZERO, |extents, position| extents.max(position.abs()))
}

/// Uniform scale for the given extents: the largest axis, floored at
/// [`MIN_SCALE`].
#[must_use]
pub fn uniform_scale(extents: Vec3) -> f32 {
    MIN_SCALE.max(extents.max_element())
}

/// Divide every vertex position by `scale * 2`.
///
/// Computed as `position * 0.5 / scale`, which stays finite and nonzero
/// for scales above `f32::MAX / 2`.
pub fn rescale(mesh: &mut Mesh, scale: f32) {
    for vertex in &mut mesh.vertices {
        vertex.position = vertex.position * 0.5 / scale;
    }
}

/// Result of centering a mesh and measuring it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centering {
    pub centroid: Vec3,
    /// Per-axis maximum absolute corner coordinate after centering.
    pub extents: Vec3,
    pub scale: f32,
}

/// Center the mesh on its centroid and compute its uniform scale.
///
/// Positions are left unscaled so normals can be derived from the centered
/// geometry; apply [`rescale`] afterwards.
pub fn center(mesh: &mut Mesh) -> Centering {
    let centroid = centroid(mesh);
    recenter(mesh, centroid);
    let extents = corner_extents(mesh);
    Centering {
        centroid,
        extents,
        scale: uniform_scale(extents),
    }
}

/// Center and rescale in one step. Returns the uniform scale.
pub fn normalize(mesh: &mut Mesh) -> f32 {
    let Centering { scale, .. } = center(mesh);
    rescale(mesh, scale);
    scale
}
