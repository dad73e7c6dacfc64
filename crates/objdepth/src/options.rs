//! Loader configuration.

/// What the packed index buffer refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexMode {
    /// Each entry is the 0-based source vertex index of the corner, as
    /// declared in the face record.
    #[default]
    SourceVertex,
    /// Each entry is the running corner ordinal `0..3 * triangles`, which
    /// addresses the per-corner vertex buffer directly.
    Corner,
}

/// Options controlling how permissive parsing is and how buffers are packed.
///
/// The defaults are permissive: malformed numbers read as
/// `0.0` and omitted face sub-indices read as `1`.
///
/// # Example
///
/// ```
/// use objdepth::{IndexMode, LoadOptions};
///
/// let options = LoadOptions::default();
/// assert!(options.lenient_numbers);
/// assert!(options.default_missing_indices);
///
/// let strict = LoadOptions::strict().index_mode(IndexMode::Corner);
/// assert!(!strict.lenient_numbers);
/// assert_eq!(strict.index_mode, IndexMode::Corner);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Malformed or missing numeric fields read as `0.0` instead of failing.
    pub lenient_numbers: bool,

    /// Omitted face sub-indices resolve to index 1 instead of failing.
    ///
    /// Unsafe when the mesh legitimately has no normals or texture
    /// coordinates: every corner then silently points at the placeholder
    /// entry.
    pub default_missing_indices: bool,

    /// Contents of the packed index buffer.
    pub index_mode: IndexMode,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            lenient_numbers: true,
            default_missing_indices: true,
            index_mode: IndexMode::SourceVertex,
        }
    }
}

impl LoadOptions {
    /// Options with both leniency rules switched off.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            lenient_numbers: false,
            default_missing_indices: false,
            index_mode: IndexMode::SourceVertex,
        }
    }

    /// Set lenient numeric parsing.
    #[must_use]
    pub const fn lenient_numbers(mut self, lenient: bool) -> Self {
        self.lenient_numbers = lenient;
        self
    }

    /// Set default index substitution for omitted face sub-fields.
    #[must_use]
    pub const fn default_missing_indices(mut self, substitute: bool) -> Self {
        self.default_missing_indices = substitute;
        self
    }

    /// Set the index buffer contents.
    #[must_use]
    pub const fn index_mode(mut self, mode: IndexMode) -> Self {
        self.index_mode = mode;
        self
    }
}
