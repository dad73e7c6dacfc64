//! Line classification.
//!
//! OBJ records are selected purely by line prefix: `vn` and `vt` are checked
//! before the bare `v`, so any other line starting with `v` (including `vp`)
//! is treated as a vertex. Lines are not trimmed before matching.

/// The kind of record a line holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `v x y z`
    Vertex,
    /// `vn x y z`
    Normal,
    /// `vt u v`
    TexCoord,
    /// `f a/b/c d/e/f g/h/i [j/k/l]`
    Face,
    /// Anything else (groups, materials, smoothing, comments, blank lines).
    Other,
}

impl LineKind {
    /// Classify a raw line by its leading characters.
    #[must_use]
    pub fn classify(line: &str) -> Self {
        if line.starts_with("vn") {
            Self::Normal
        } else if line.starts_with("vt") {
            Self::TexCoord
        } else if line.starts_with('v') {
            Self::Vertex
        } else if line.starts_with('f') {
            Self::Face
        } else {
            Self::Other
        }
    }
}

impl std::fmt::Display for LineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Normal => "normal",
            Self::TexCoord => "texture coordinate",
            Self::Face => "triangle",
            Self::Other => "other",
        })
    }
}

/// Number of triangles a face line expands to.
///
/// The first whitespace-separated field is the `f` token itself. Three
/// corner groups make one triangle; four or more make a quad (two
/// triangles, extra corners ignored). Fewer than three groups make nothing.
#[must_use]
pub fn face_triangle_count(line: &str) -> usize {
    match line.split_whitespace().count() {
        0..=3 => 0,
        4 => 1,
        _ => 2,
    }
}
