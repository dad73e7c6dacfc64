//! Error types for mesh loading.

use glam::Vec3;
use thiserror::Error;

use crate::classify::LineKind;

/// Result type alias for mesh loading operations.
pub type ObjResult<T> = Result<T, ObjError>;

/// Which per-corner index table an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexTable {
    /// The vertex position table.
    Vertex,
    /// The texture coordinate table.
    TexCoord,
    /// The normal table.
    Normal,
}

impl std::fmt::Display for IndexTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::TexCoord => "texture coordinate",
            Self::Normal => "normal",
        })
    }
}

/// Errors that can occur while loading a mesh.
#[derive(Debug, Error)]
pub enum ObjError {
    /// Reading the input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The second pass populated a different number of records than counted.
    #[error("{kind} table mismatch: counted {expected}, populated {actual}")]
    CountMismatch {
        kind: LineKind,
        expected: usize,
        actual: usize,
    },

    /// A numeric field could not be parsed and lenient parsing is disabled.
    #[error("line {line}: invalid number {text:?}")]
    InvalidNumber { line: usize, text: String },

    /// A face index parsed to zero, a negative value, or no digits at all.
    #[error("line {line}: invalid face index {text:?}")]
    InvalidIndex { line: usize, text: String },

    /// A face sub-index was omitted and default substitution is disabled.
    #[error("line {line}: missing {table} index")]
    MissingIndex { line: usize, table: IndexTable },

    /// A face corner references past the end of one of the tables.
    #[error("triangle {triangle}: {table} index {index} out of range (table holds {len})")]
    IndexOutOfRange {
        triangle: usize,
        table: IndexTable,
        index: usize,
        len: usize,
    },

    /// A position is NaN or infinite after centering, either as read or
    /// because centering pushed it past the `f32` range.
    #[error("vertex {vertex}: non-finite position {position} after centering")]
    NonFiniteGeometry { vertex: usize, position: Vec3 },

    /// The packed index buffer cannot address this many corners.
    #[error("mesh has {0} triangle corners, more than a 32-bit index buffer can address")]
    TooManyCorners(usize),
}

impl ObjError {
    /// Create an invalid number error.
    #[must_use]
    pub fn invalid_number(line: usize, text: impl Into<String>) -> Self {
        Self::InvalidNumber {
            line,
            text: text.into(),
        }
    }

    /// Create an invalid index error.
    #[must_use]
    pub fn invalid_index(line: usize, text: impl Into<String>) -> Self {
        Self::InvalidIndex {
            line,
            text: text.into(),
        }
    }

    /// Whether this error came from the input source rather than its content.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
