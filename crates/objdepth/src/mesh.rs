//! Parsed mesh tables.

use std::num::NonZeroU32;

use glam::{Vec2, Vec3};

use crate::error::{IndexTable, ObjError, ObjResult};

/// A 1-based index as written in a face record.
///
/// Zero cannot be represented. The index is only converted to 0-based at
/// the point where a table is accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceIndex(NonZeroU32);

impl FaceIndex {
    /// Index 1, substituted for omitted sub-fields.
    pub const DEFAULT: Self = Self(NonZeroU32::MIN);

    /// Wrap a 1-based index. Returns `None` for zero.
    #[must_use]
    pub const fn new(one_based: u32) -> Option<Self> {
        match NonZeroU32::new(one_based) {
            Some(index) => Some(Self(index)),
            None => None,
        }
    }

    /// The index as written in the file.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// The 0-based table position.
    #[must_use]
    pub const fn to_zero_based(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl Default for FaceIndex {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One vertex reference of a face: `vertex/tex_coord/normal`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceCorner {
    pub vertex: FaceIndex,
    pub tex_coord: FaceIndex,
    pub normal: FaceIndex,
}

impl FaceCorner {
    /// A corner referencing the same 1-based index in every table.
    ///
    /// Returns `None` for zero.
    #[must_use]
    pub const fn uniform(one_based: u32) -> Option<Self> {
        match FaceIndex::new(one_based) {
            Some(index) => Some(Self {
                vertex: index,
                tex_coord: index,
                normal: index,
            }),
            None => None,
        }
    }
}

/// A triangle of three face corners, in declaration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Triangle {
    pub corners: [FaceCorner; 3],
}

impl Triangle {
    #[must_use]
    pub const fn new(a: FaceCorner, b: FaceCorner, c: FaceCorner) -> Self {
        Self { corners: [a, b, c] }
    }

    /// 0-based vertex indices of the three corners.
    #[must_use]
    pub fn vertex_indices(&self) -> [usize; 3] {
        self.corners.map(|corner| corner.vertex.to_zero_based())
    }

    /// Whether any corner references the given 0-based vertex.
    #[must_use]
    pub fn references(&self, vertex: usize) -> bool {
        self.corners
            .iter()
            .any(|corner| corner.vertex.to_zero_based() == vertex)
    }
}

/// A vertex position with its derived normal.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawVertex {
    pub position: Vec3,
    /// Zero until normals are derived.
    pub normal: Vec3,
}

impl RawVertex {
    #[must_use]
    pub const fn new(position: Vec3) -> Self {
        Self {
            position,
            normal: Vec3::ZERO,
        }
    }
}

/// All tables read from one OBJ input.
///
/// The normal and texture coordinate tables always hold at least one
/// entry, so the default index 1 is valid even for files declaring none.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<RawVertex>,
    pub normals: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Assemble a mesh, padding empty normal/texture tables with a zero
    /// placeholder.
    #[must_use]
    pub fn from_parts(
        vertices: Vec<RawVertex>,
        mut normals: Vec<Vec3>,
        mut tex_coords: Vec<Vec2>,
        triangles: Vec<Triangle>,
    ) -> Self {
        if normals.is_empty() {
            normals.push(Vec3::ZERO);
        }
        if tex_coords.is_empty() {
            tex_coords.push(Vec2::ZERO);
        }
        Self {
            vertices,
            normals,
            tex_coords,
            triangles,
        }
    }

    /// Build a position-only mesh from 0-based triangle indices.
    ///
    /// Every corner uses texture coordinate and normal index 1.
    #[must_use]
    pub fn from_positions(positions: &[Vec3], faces: &[[u32; 3]]) -> Self {
        let vertices = positions.iter().copied().map(RawVertex::new).collect();
        let triangles = faces
            .iter()
            .map(|face| {
                let corner = |i: u32| FaceCorner {
                    vertex: FaceIndex(NonZeroU32::MIN.saturating_add(i)),
                    ..FaceCorner::default()
                };
                Triangle::new(corner(face[0]), corner(face[1]), corner(face[2]))
            })
            .collect();
        Self::from_parts(vertices, Vec::new(), Vec::new(), triangles)
    }

    /// Position of the vertex a corner references.
    ///
    /// # Panics
    ///
    /// Panics if the corner's vertex index is out of range; run
    /// [`Mesh::validate_indices`] first.
    #[must_use]
    pub fn corner_position(&self, corner: &FaceCorner) -> Vec3 {
        self.vertices[corner.vertex.to_zero_based()].position
    }

    /// Positions of a triangle's three corners.
    #[must_use]
    pub fn triangle_positions(&self, triangle: &Triangle) -> [Vec3; 3] {
        triangle.corners.map(|corner| self.corner_position(&corner))
    }

    /// Check that every vertex position is finite.
    pub fn validate_positions(&self) -> ObjResult<()> {
        match self
            .vertices
            .iter()
            .position(|vertex| !vertex.position.is_finite())
        {
            Some(vertex) => Err(ObjError::NonFiniteGeometry {
                vertex,
                position: self.vertices[vertex].position,
            }),
            None => Ok(()),
        }
    }

    /// Check every corner index against its table.
    pub fn validate_indices(&self) -> ObjResult<()> {
        let tables = [
            (IndexTable::Vertex, self.vertices.len()),
            (IndexTable::TexCoord, self.tex_coords.len()),
            (IndexTable::Normal, self.normals.len()),
        ];
        for (triangle_index, triangle) in self.triangles.iter().enumerate() {
            for corner in &triangle.corners {
                let indices = [corner.vertex, corner.tex_coord, corner.normal];
                for ((table, len), index) in tables.iter().zip(indices) {
                    let index = index.to_zero_based();
                    if index >= *len {
                        return Err(ObjError::IndexOutOfRange {
                            triangle: triangle_index,
                            table: *table,
                            index,
                            len: *len,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
