//! Load Wavefront OBJ meshes into GPU-ready interleaved buffers.
//!
//! The loader reads a text OBJ file in two passes (count, then parse into
//! preallocated tables), centers and uniformly scales the mesh into
//! `[-1, 1]`, derives area-weighted vertex normals, estimates an internal
//! depth per vertex by casting a ray inward, and packs everything into a
//! `Position3Texture2Normal3` vertex buffer plus an index buffer. The
//! texture-U slot of every packed vertex carries the internal depth.
//!
//! # Design principles
//!
//! - **Synchronous**: No async, no global state
//! - **User-controlled parallelism**: The `parallel` feature runs the
//!   per-vertex steps on rayon with identical results
//! - **Brute force on purpose**: Normal derivation and ray casting are
//!   O(vertices × triangles); large meshes are slow
//! - **Permissive parsing by default**: See [`LoadOptions`]
//!
//! # Key functions
//!
//! - [`ObjLoader::load_mesh`]: The whole pipeline, from path to buffers
//! - [`count_records`] / [`parse_records`]: The two parsing passes
//! - [`derive_vertex_normals`]: Area-weighted vertex normals
//! - [`normalize()`]: Centering and uniform scaling
//! - [`estimate_internal_depth`]: Per-vertex inward ray casting
//! - [`pack_mesh`]: Interleaved buffer and index packing
//!
//! # Example
//!
//! ```no_run
//! use objdepth::{InternalDepth, LoadOptions, ObjLoader};
//!
//! let geometry = ObjLoader::new(LoadOptions::default()).load_mesh("bunny.obj")?;
//! if let Some(vertices) = &geometry.vertices {
//!     println!("{} packed corners, scale {}", vertices.vertex_count(), geometry.scale);
//! }
//! if let Some(depth) = geometry.vertex_internal_depth(0) {
//!     if InternalDepth::is_hit(depth) {
//!         println!("vertex 0 is {depth} deep");
//!     }
//! }
//! # Ok::<(), objdepth::ObjError>(())
//! ```

mod error;
mod loader;

pub mod classify;
pub mod counts;
pub mod depth;
pub mod mesh;
pub mod normalize;
pub mod normals;
pub mod options;
pub mod pack;
pub mod progress;
pub mod records;
pub mod sink;

pub use classify::LineKind;
pub use counts::{RecordCounts, count_records};
pub use depth::{InternalDepth, estimate_internal_depth, ray_triangle_intersect};
pub use error::{IndexTable, ObjError, ObjResult};
pub use loader::{MeshGeometry, ObjLoader};
pub use mesh::{FaceCorner, FaceIndex, Mesh, RawVertex, Triangle};
pub use normalize::normalize;
pub use normals::derive_vertex_normals;
pub use options::{IndexMode, LoadOptions};
pub use pack::{PACKED_FORMAT, pack_mesh};
pub use progress::{NoProgress, ProgressReporter, Stage, TracingProgress};
pub use records::parse_records;
pub use sink::{BufferLayout, RenderBufferSink, VecBuffer, VertexFormat};
