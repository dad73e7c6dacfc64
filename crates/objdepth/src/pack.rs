//! Packing into render buffers.
//!
//! Every triangle corner becomes its own 8-float vertex
//! (`Position3Texture2Normal3`), so triangle `i`, corner `c` starts at float
//! `i * 24 + c * 8`. After the attributes are written, the texture-U slot of
//! every corner is overwritten with the internal depth of the corner's
//! source vertex. The original U coordinate is lost; shaders read depth
//! from U.

use crate::depth::InternalDepth;
use crate::error::{ObjError, ObjResult};
use crate::mesh::Mesh;
use crate::options::IndexMode;
use crate::sink::{BufferLayout, RenderBufferSink, VertexFormat};

/// Vertex format written by [`pack_mesh`].
pub const PACKED_FORMAT: VertexFormat = VertexFormat::Position3Texture2Normal3;

const STRIDE: usize = PACKED_FORMAT.stride();

/// Pack a normalized mesh and its depth into the two sinks, then commit both.
///
/// # Panics
///
/// Panics if a packed position is NaN or outside `[-1, 1]`, or if `depth`
/// does not hold one entry per vertex. Both mean an earlier stage is broken.
/// Corner indices must already be validated.
pub fn pack_mesh<V, I>(
    mesh: &Mesh,
    depth: &InternalDepth,
    index_mode: IndexMode,
    vertices: &mut V,
    indices: &mut I,
) -> ObjResult<()>
where
    V: RenderBufferSink<f32>,
    I: RenderBufferSink<u32>,
{
    assert_eq!(
        depth.len(),
        mesh.vertices.len(),
        "depth table does not match vertex table"
    );
    let corner_count = mesh.triangles.len() * 3;
    u32::try_from(corner_count).map_err(|_| ObjError::TooManyCorners(corner_count))?;

    vertices.allocate(corner_count * STRIDE, BufferLayout::Interleaved(PACKED_FORMAT));
    indices.allocate(corner_count, BufferLayout::Indices);

    for (triangle_index, triangle) in mesh.triangles.iter().enumerate() {
        for (corner_index, corner) in triangle.corners.iter().enumerate() {
            let vertex = &mesh.vertices[corner.vertex.to_zero_based()];
            let position = vertex.position;
            assert!(
                !position.is_nan(),
                "triangle {triangle_index} corner {corner_index}: NaN position {position}"
            );
            assert!(
                position.abs().max_element() <= 1.0,
                "triangle {triangle_index} corner {corner_index}: position {position} outside [-1, 1]"
            );
            let tex_coord = mesh.tex_coords[corner.tex_coord.to_zero_based()];

            let mut packed = [0.0_f32; STRIDE];
            packed[VertexFormat::POSITION..VertexFormat::TEX_COORD]
                .copy_from_slice(&position.to_array());
            packed[VertexFormat::TEX_COORD..VertexFormat::NORMAL]
                .copy_from_slice(&tex_coord.to_array());
            packed[VertexFormat::NORMAL..].copy_from_slice(&vertex.normal.to_array());

            let base = (triangle_index * 3 + corner_index) * STRIDE;
            for (i, value) in packed.into_iter().enumerate() {
                vertices.write(base + i, value);
            }
        }

        for (corner_index, corner) in triangle.corners.iter().enumerate() {
            let slot = triangle_index * 3 + corner_index;
            let index = match index_mode {
                IndexMode::SourceVertex => corner.vertex.get() - 1,
                #[allow(clippy::cast_possible_truncation)]
                IndexMode::Corner => slot as u32,
            };
            indices.write(slot, index);
        }
    }

    write_depth_as_tex_u(mesh, depth, vertices);

    vertices.commit();
    indices.commit();
    Ok(())
}

/// Overwrite the texture-U slot of every packed corner with its vertex depth.
pub fn write_depth_as_tex_u<V: RenderBufferSink<f32>>(
    mesh: &Mesh,
    depth: &InternalDepth,
    vertices: &mut V,
) {
    for (triangle_index, triangle) in mesh.triangles.iter().enumerate() {
        for (corner_index, corner) in triangle.corners.iter().enumerate() {
            let base = (triangle_index * 3 + corner_index) * STRIDE;
            vertices.write(
                base + VertexFormat::TEX_COORD,
                depth.get(corner.vertex.to_zero_based()),
            );
        }
    }
}
