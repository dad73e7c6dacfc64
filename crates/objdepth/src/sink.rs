//! Render-buffer sinks.
//!
//! The packer only ever allocates, writes and commits; it never reads a
//! sink back. [`VecBuffer`] is an in-memory sink that keeps the data for
//! inspection or for handing to a graphics API.

/// Fixed interleaved vertex formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    /// Position (3), texture coordinate (2), normal (3).
    Position3Texture2Normal3,
}

impl VertexFormat {
    /// Float offset of the position within one vertex.
    pub const POSITION: usize = 0;
    /// Float offset of the texture coordinate within one vertex.
    pub const TEX_COORD: usize = 3;
    /// Float offset of the normal within one vertex.
    pub const NORMAL: usize = 5;

    /// Floats per vertex.
    #[must_use]
    pub const fn stride(self) -> usize {
        match self {
            Self::Position3Texture2Normal3 => 8,
        }
    }
}

/// How a sink's contents are to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferLayout {
    Interleaved(VertexFormat),
    Indices,
}

/// A write-only destination for packed buffer data.
pub trait RenderBufferSink<T> {
    /// Reserve `len` elements, zero-initialized.
    fn allocate(&mut self, len: usize, layout: BufferLayout);

    /// Write one element.
    fn write(&mut self, offset: usize, value: T);

    /// Make the written data available to a renderer.
    fn commit(&mut self);
}

/// An in-memory sink backed by a `Vec`.
#[derive(Debug, Clone, PartialEq)]
pub struct VecBuffer<T> {
    layout: Option<BufferLayout>,
    data: Vec<T>,
    commits: usize,
}

impl<T> Default for VecBuffer<T> {
    fn default() -> Self {
        Self {
            layout: None,
            data: Vec::new(),
            commits: 0,
        }
    }
}

impl<T: Copy + Default> RenderBufferSink<T> for VecBuffer<T> {
    fn allocate(&mut self, len: usize, layout: BufferLayout) {
        self.layout = Some(layout);
        self.data = vec![T::default(); len];
        self.commits = 0;
    }

    fn write(&mut self, offset: usize, value: T) {
        assert!(
            offset < self.data.len(),
            "write at {offset} past buffer of {}",
            self.data.len()
        );
        self.data[offset] = value;
    }

    fn commit(&mut self) {
        self.commits += 1;
    }
}

impl<T> VecBuffer<T> {
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Layout given at allocation, if allocated.
    #[must_use]
    pub const fn layout(&self) -> Option<BufferLayout> {
        self.layout
    }

    /// Whether [`RenderBufferSink::commit`] has been called since allocation.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        self.commits > 0
    }

    #[must_use]
    pub const fn commit_count(&self) -> usize {
        self.commits
    }
}

impl VecBuffer<f32> {
    /// Floats per vertex, or 0 when not an interleaved buffer.
    #[must_use]
    pub fn stride(&self) -> usize {
        match self.layout {
            Some(BufferLayout::Interleaved(format)) => format.stride(),
            _ => 0,
        }
    }

    /// Number of whole vertices held.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        match self.stride() {
            0 => 0,
            stride => self.data.len() / stride,
        }
    }

    /// The floats of one packed vertex.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`VecBuffer::vertex_count`].
    #[must_use]
    pub fn vertex(&self, index: usize) -> &[f32] {
        assert!(index < self.vertex_count(), "vertex {index} out of range");
        let stride = self.stride();
        &self.data[index * stride..(index + 1) * stride]
    }
}
