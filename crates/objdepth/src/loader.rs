//! The load pipeline.
//!
//! count → rewind → parse → validate indices → center → check positions →
//! derive normals → rescale → estimate depth → pack.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::Path;

use tracing::{error, info, warn};

use crate::counts::{RecordCounts, count_records};
use crate::depth::{InternalDepth, estimate_internal_depth};
use crate::error::ObjResult;
use crate::mesh::Mesh;
use crate::normalize;
use crate::normals::derive_vertex_normals;
use crate::options::LoadOptions;
use crate::pack::pack_mesh;
use crate::progress::{ProgressReporter, Stage, TracingProgress};
use crate::records::parse_records;
use crate::sink::{RenderBufferSink, VecBuffer};

/// The packed result of loading one mesh.
///
/// Buffers are `None` when the input could not be read or held no
/// triangles.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGeometry<V = VecBuffer<f32>, I = VecBuffer<u32>> {
    /// Committed interleaved vertex buffer, texture-U replaced by depth.
    pub vertices: Option<V>,
    /// Committed index buffer, one entry per triangle corner.
    pub indices: Option<I>,
    /// Uniform scale the centered mesh was divided by (before the factor 2).
    pub scale: f32,
    /// Depth per source vertex, in normalized units.
    ///
    /// Holds one entry per parsed vertex whenever parsing succeeded, even
    /// without triangles; empty only when the input could not be read.
    pub internal_depth: InternalDepth,
    /// Record counts from the first pass.
    pub counts: RecordCounts,
}

impl<V, I> MeshGeometry<V, I> {
    /// A result with no buffers.
    #[must_use]
    pub fn empty(counts: RecordCounts) -> Self {
        Self {
            vertices: None,
            indices: None,
            scale: 0.0,
            internal_depth: InternalDepth::default(),
            counts,
        }
    }

    /// Whether the buffers are absent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.vertices.is_none() || self.indices.is_none()
    }

    /// Depth of a 0-based source vertex, or `None` past the vertex table.
    #[must_use]
    pub fn vertex_internal_depth(&self, vertex: usize) -> Option<f32> {
        self.internal_depth.try_get(vertex)
    }
}

/// Loads OBJ meshes into packed geometry.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use objdepth::{LoadOptions, ObjLoader};
///
/// let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
/// let geometry = ObjLoader::new(LoadOptions::default())
///     .load_reader(Cursor::new(obj))
///     .unwrap();
///
/// let vertices = geometry.vertices.unwrap();
/// assert_eq!(vertices.len(), 3 * 8);
/// assert_eq!(geometry.indices.unwrap().as_slice(), &[0, 1, 2]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ObjLoader<P = TracingProgress> {
    options: LoadOptions,
    progress: P,
}

impl ObjLoader {
    /// A loader that reports progress through `tracing`.
    #[must_use]
    pub const fn new(options: LoadOptions) -> Self {
        Self {
            options,
            progress: TracingProgress,
        }
    }
}

impl<P: ProgressReporter> ObjLoader<P> {
    /// A loader with a custom progress reporter.
    #[must_use]
    pub const fn with_progress(options: LoadOptions, progress: P) -> Self {
        Self { options, progress }
    }

    #[must_use]
    pub const fn options(&self) -> &LoadOptions {
        &self.options
    }

    #[must_use]
    pub const fn progress(&self) -> &P {
        &self.progress
    }

    /// Load a mesh file into in-memory buffers.
    ///
    /// A file that cannot be opened or read is logged and yields an empty
    /// geometry rather than an error.
    pub fn load_mesh(&self, path: impl AsRef<Path>) -> ObjResult<MeshGeometry> {
        self.load_mesh_into(path, VecBuffer::default(), VecBuffer::default())
    }

    /// Load a mesh file into caller-provided sinks.
    pub fn load_mesh_into<V, I>(
        &self,
        path: impl AsRef<Path>,
        vertices: V,
        indices: I,
    ) -> ObjResult<MeshGeometry<V, I>>
    where
        V: RenderBufferSink<f32>,
        I: RenderBufferSink<u32>,
    {
        let path = path.as_ref();
        match File::open(path) {
            Ok(file) => self.load_reader_into(BufReader::new(file), vertices, indices),
            Err(e) => {
                error!(path = %path.display(), "Could not open OBJ file: {e}");
                Ok(MeshGeometry::empty(RecordCounts::default()))
            }
        }
    }

    /// Load a mesh from any rewindable reader into in-memory buffers.
    pub fn load_reader<R: BufRead + Seek>(&self, reader: R) -> ObjResult<MeshGeometry> {
        self.load_reader_into(reader, VecBuffer::default(), VecBuffer::default())
    }

    /// Load a mesh from any rewindable reader into caller-provided sinks.
    pub fn load_reader_into<R, V, I>(
        &self,
        reader: R,
        vertices: V,
        indices: I,
    ) -> ObjResult<MeshGeometry<V, I>>
    where
        R: BufRead + Seek,
        V: RenderBufferSink<f32>,
        I: RenderBufferSink<u32>,
    {
        let (counts, mesh) = match self.read_mesh(reader) {
            Ok(read) => read,
            Err(e) if e.is_io() => {
                error!("Could not read OBJ input: {e}");
                return Ok(MeshGeometry::empty(RecordCounts::default()));
            }
            Err(e) => return Err(e),
        };

        if mesh.triangles.is_empty() {
            warn!(
                vertices = counts.vertices,
                "OBJ input has no triangles, nothing to pack"
            );
            return Ok(MeshGeometry {
                internal_depth: InternalDepth::unhit(mesh.vertices.len()),
                ..MeshGeometry::empty(counts)
            });
        }

        self.process(mesh, counts, vertices, indices)
    }

    /// Run both parsing passes, rewinding in between.
    pub fn read_mesh<R: BufRead + Seek>(&self, mut reader: R) -> ObjResult<(RecordCounts, Mesh)> {
        self.progress.stage(Stage::Counting);
        let counts = count_records(&mut reader)?;
        self.progress.counted(&counts);

        reader.rewind()?;

        self.progress.stage(Stage::Parsing);
        let mesh = parse_records(&mut reader, &counts, &self.options)?;
        Ok((counts, mesh))
    }

    /// Normalize a parsed mesh, estimate its depth and pack it.
    pub fn process<V, I>(
        &self,
        mut mesh: Mesh,
        counts: RecordCounts,
        mut vertices: V,
        mut indices: I,
    ) -> ObjResult<MeshGeometry<V, I>>
    where
        V: RenderBufferSink<f32>,
        I: RenderBufferSink<u32>,
    {
        mesh.validate_indices()?;

        self.progress.stage(Stage::Normalizing);
        let (min, max) = normalize::bounds(&mesh);
        let centering = normalize::center(&mut mesh);
        mesh.validate_positions()?;
        self.progress.bounds(min, max, centering.centroid);
        self.progress.extents(centering.extents, centering.scale);

        // Normals come from centered, unscaled positions.
        self.progress.stage(Stage::DerivingNormals);
        derive_vertex_normals(&mut mesh);
        normalize::rescale(&mut mesh, centering.scale);

        self.progress.stage(Stage::EstimatingDepth);
        let internal_depth = estimate_internal_depth(&mesh);

        self.progress.stage(Stage::Packing);
        pack_mesh(
            &mesh,
            &internal_depth,
            self.options.index_mode,
            &mut vertices,
            &mut indices,
        )?;

        info!(
            triangles = mesh.triangles.len(),
            scale = centering.scale,
            depth_hits = internal_depth.hit_count(),
            "Loaded mesh"
        );

        Ok(MeshGeometry {
            vertices: Some(vertices),
            indices: Some(indices),
            scale: centering.scale,
            internal_depth,
            counts,
        })
    }
}
