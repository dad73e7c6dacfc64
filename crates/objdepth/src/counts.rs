//! First pass: record counting.

use std::io::BufRead;

use crate::classify::{LineKind, face_triangle_count};

/// Number of records of each kind in an input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordCounts {
    pub vertices: usize,
    pub normals: usize,
    pub tex_coords: usize,
    /// Triangles after quad expansion.
    pub triangles: usize,
}

impl RecordCounts {
    /// Whether the input declared nothing at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.vertices == 0 && self.normals == 0 && self.tex_coords == 0 && self.triangles == 0
    }

    /// Tally one line.
    pub fn add_line(&mut self, line: &str) {
        match LineKind::classify(line) {
            LineKind::Vertex => self.vertices += 1,
            LineKind::Normal => self.normals += 1,
            LineKind::TexCoord => self.tex_coords += 1,
            LineKind::Face => self.triangles += face_triangle_count(line),
            LineKind::Other => {}
        }
    }
}

/// Scan the whole input once, counting each record kind.
///
/// Reads from the reader's current position to the end.
pub fn count_records<R: BufRead>(reader: R) -> std::io::Result<RecordCounts> {
    let mut counts = RecordCounts::default();
    for line in reader.lines() {
        counts.add_line(&line?);
    }
    Ok(counts)
}
