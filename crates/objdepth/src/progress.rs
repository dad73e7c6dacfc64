//! Progress reporting hooks.
//!
//! The loader never prints. It reports what it measures through a
//! [`ProgressReporter`], which callers can route anywhere.

use glam::Vec3;

use crate::counts::RecordCounts;

/// Pipeline stages announced through [`ProgressReporter::stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Counting,
    Parsing,
    Normalizing,
    DerivingNormals,
    EstimatingDepth,
    Packing,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Counting => "counting records",
            Self::Parsing => "parsing records",
            Self::Normalizing => "normalizing",
            Self::DerivingNormals => "deriving normals",
            Self::EstimatingDepth => "estimating internal depth",
            Self::Packing => "packing buffers",
        })
    }
}

/// Receives measurements as a mesh moves through the loader.
///
/// Every method has a no-op default.
pub trait ProgressReporter {
    /// A stage is starting.
    fn stage(&self, _stage: Stage) {}

    /// The counting pass finished.
    fn counted(&self, _counts: &RecordCounts) {}

    /// Raw bounds and centroid, before centering.
    fn bounds(&self, _min: Vec3, _max: Vec3, _centroid: Vec3) {}

    /// Centered per-axis extents and the chosen uniform scale.
    fn extents(&self, _extents: Vec3, _scale: f32) {}
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

/// Reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn stage(&self, stage: Stage) {
        tracing::debug!(%stage, "Mesh load stage");
    }

    fn counted(&self, counts: &RecordCounts) {
        tracing::info!(
            vertices = counts.vertices,
            normals = counts.normals,
            tex_coords = counts.tex_coords,
            triangles = counts.triangles,
            "Counted OBJ records"
        );
    }

    fn bounds(&self, min: Vec3, max: Vec3, centroid: Vec3) {
        tracing::info!(%min, %max, %centroid, "Mesh bounds");
    }

    fn extents(&self, extents: Vec3, scale: f32) {
        tracing::info!(%extents, scale, "Centered mesh extents");
    }
}
