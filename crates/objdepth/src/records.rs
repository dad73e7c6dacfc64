//! Second pass: record parsing into preallocated tables.

use std::io::BufRead;

use glam::{Vec2, Vec3};
use tracing::warn;

use crate::classify::LineKind;
use crate::counts::RecordCounts;
use crate::error::{IndexTable, ObjError, ObjResult};
use crate::mesh::{FaceCorner, FaceIndex, Mesh, RawVertex, Triangle};
use crate::options::LoadOptions;

/// Parse a float the way C `atof` does.
///
/// The longest prefix that forms a valid decimal number is used; text with
/// no such prefix reads as `0.0`.
#[must_use]
pub fn parse_float_lenient(text: &str) -> f32 {
    if let Ok(value) = text.parse() {
        return value;
    }
    let prefix = &text[..float_prefix_len(text)];
    prefix.parse().unwrap_or(0.0)
}

/// Length of the leading `[+-]digits[.digits][(e|E)[+-]digits]` run.
fn float_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_end = int_end;
    if bytes.get(int_end) == Some(&b'.') {
        mantissa_end = digits_from(int_end + 1);
    }
    // A lone sign or dot is not a number.
    if mantissa_end - end <= usize::from(bytes.get(int_end) == Some(&b'.')) {
        return 0;
    }

    let mut exp = mantissa_end;
    if matches!(bytes.get(exp), Some(b'e' | b'E')) {
        exp += 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            return exp_end;
        }
    }
    mantissa_end
}

/// Parse an integer the way C `atoi` does: an optional sign followed by the
/// leading digits. Returns `None` when there are no digits or the value does
/// not fit.
#[must_use]
pub fn parse_int_lenient(text: &str) -> Option<i64> {
    let bytes = text.as_bytes();
    let sign_len = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits = bytes[sign_len..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    text[..sign_len + digits].parse().ok()
}

/// Field-level parsing rules for one line.
struct FieldParser<'a> {
    options: &'a LoadOptions,
    line: usize,
}

impl FieldParser<'_> {
    fn float(&self, field: Option<&str>) -> ObjResult<f32> {
        let text = field.unwrap_or("");
        if self.options.lenient_numbers {
            Ok(parse_float_lenient(text))
        } else {
            text.parse()
                .map_err(|_| ObjError::invalid_number(self.line, text))
        }
    }

    fn floats<const N: usize>(&self, line: &str) -> ObjResult<[f32; N]> {
        let mut fields = line.split_whitespace().skip(1);
        let mut values = [0.0; N];
        for value in &mut values {
            *value = self.float(fields.next())?;
        }
        Ok(values)
    }

    fn index(&self, text: &str, table: IndexTable) -> ObjResult<FaceIndex> {
        if text.is_empty() {
            return if self.options.default_missing_indices {
                Ok(FaceIndex::DEFAULT)
            } else {
                Err(ObjError::MissingIndex {
                    line: self.line,
                    table,
                })
            };
        }

        let value = if self.options.lenient_numbers {
            parse_int_lenient(text)
        } else {
            text.parse().ok()
        };
        value
            .and_then(|v| u32::try_from(v).ok())
            .and_then(FaceIndex::new)
            .ok_or_else(|| ObjError::invalid_index(self.line, text))
    }

    fn corner(&self, group: &str) -> ObjResult<FaceCorner> {
        let mut parts = group.split('/');
        Ok(FaceCorner {
            vertex: self.index(parts.next().unwrap_or(""), IndexTable::Vertex)?,
            tex_coord: self.index(parts.next().unwrap_or(""), IndexTable::TexCoord)?,
            normal: self.index(parts.next().unwrap_or(""), IndexTable::Normal)?,
        })
    }
}

/// A table that refuses to grow past its counted size.
struct BoundedTable<T> {
    kind: LineKind,
    expected: usize,
    items: Vec<T>,
}

impl<T> BoundedTable<T> {
    fn new(kind: LineKind, expected: usize) -> Self {
        Self {
            kind,
            expected,
            items: Vec::with_capacity(expected),
        }
    }

    fn push(&mut self, item: T) -> ObjResult<()> {
        if self.items.len() == self.expected {
            return Err(ObjError::CountMismatch {
                kind: self.kind,
                expected: self.expected,
                actual: self.expected + 1,
            });
        }
        self.items.push(item);
        Ok(())
    }

    fn finish(self) -> ObjResult<Vec<T>> {
        if self.items.len() == self.expected {
            Ok(self.items)
        } else {
            Err(ObjError::CountMismatch {
                kind: self.kind,
                expected: self.expected,
                actual: self.items.len(),
            })
        }
    }
}

/// Parse every record into tables sized by a previous [`count_records`] pass.
///
/// Face indices are not range-checked here; see [`Mesh::validate_indices`].
///
/// [`count_records`]: crate::counts::count_records
pub fn parse_records<R: BufRead>(
    reader: R,
    counts: &RecordCounts,
    options: &LoadOptions,
) -> ObjResult<Mesh> {
    let mut vertices = BoundedTable::new(LineKind::Vertex, counts.vertices);
    let mut normals = BoundedTable::new(LineKind::Normal, counts.normals);
    let mut tex_coords = BoundedTable::new(LineKind::TexCoord, counts.tex_coords);
    let mut triangles = BoundedTable::new(LineKind::Face, counts.triangles);

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let parser = FieldParser {
            options,
            line: number + 1,
        };

        match LineKind::classify(&line) {
            LineKind::Vertex => {
                let [x, y, z] = parser.floats(&line)?;
                vertices.push(RawVertex::new(Vec3::new(x, y, z)))?;
            }
            LineKind::Normal => {
                let [x, y, z] = parser.floats(&line)?;
                normals.push(Vec3::new(x, y, z))?;
            }
            LineKind::TexCoord => {
                let [u, v] = parser.floats(&line)?;
                tex_coords.push(Vec2::new(u, v))?;
            }
            LineKind::Face => {
                let groups: Vec<&str> = line.split_whitespace().skip(1).collect();
                if groups.len() < 3 {
                    warn!(line = parser.line, "Skipping face with fewer than 3 corners");
                    continue;
                }
                if groups.len() > 4 {
                    warn!(
                        line = parser.line,
                        corners = groups.len(),
                        "Face has more than 4 corners, extra corners ignored"
                    );
                }

                let a = parser.corner(groups[0])?;
                let b = parser.corner(groups[1])?;
                let c = parser.corner(groups[2])?;
                triangles.push(Triangle::new(a, b, c))?;

                if let Some(group) = groups.get(3) {
                    let d = parser.corner(group)?;
                    triangles.push(Triangle::new(a, c, d))?;
                }
            }
            LineKind::Other => {}
        }
    }

    Ok(Mesh::from_parts(
        vertices.finish()?,
        normals.finish()?,
        tex_coords.finish()?,
        triangles.finish()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counts::count_records;
    use std::io::Cursor;

    fn parse(input: &str, options: &LoadOptions) -> ObjResult<Mesh> {
        let counts = count_records(Cursor::new(input))?;
        parse_records(Cursor::new(input), &counts, options)
    }

    fn index(one_based: u32) -> FaceIndex {
        FaceIndex::new(one_based).unwrap()
    }

    #[test]
    fn test_parse_float_lenient() {
        assert!((parse_float_lenient("1.5") - 1.5).abs() < f32::EPSILON);
        assert!((parse_float_lenient("-2.25e1") + 22.5).abs() < f32::EPSILON);
        assert!((parse_float_lenient("3.5abc") - 3.5).abs() < f32::EPSILON);
        assert!((parse_float_lenient("7e") - 7.0).abs() < f32::EPSILON);
        assert!((parse_float_lenient(".5") - 0.5).abs() < f32::EPSILON);
        assert!((parse_float_lenient("4.") - 4.0).abs() < f32::EPSILON);
        assert!(parse_float_lenient("abc").abs() < f32::EPSILON);
        assert!(parse_float_lenient("-").abs() < f32::EPSILON);
        assert!(parse_float_lenient(".").abs() < f32::EPSILON);
        assert!(parse_float_lenient("").abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_int_lenient() {
        assert_eq!(parse_int_lenient("12"), Some(12));
        assert_eq!(parse_int_lenient("12abc"), Some(12));
        assert_eq!(parse_int_lenient("-3"), Some(-3));
        assert_eq!(parse_int_lenient("+4"), Some(4));
        assert_eq!(parse_int_lenient("x1"), None);
        assert_eq!(parse_int_lenient(""), None);
    }

    #[test]
    fn test_quad_expansion_order() {
        let input = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = parse(input, &LoadOptions::default()).unwrap();
        assert_eq!(mesh.triangles.len(), 2);
        assert_eq!(mesh.triangles[0].vertex_indices(), [0, 1, 2]);
        assert_eq!(mesh.triangles[1].vertex_indices(), [0, 2, 3]);
    }

    #[test]
    fn test_missing_sub_indices_default_to_one() {
        let input = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvn 0 0 -1\nf 1//2 2 3/\n";
        let mesh = parse(input, &LoadOptions::default()).unwrap();
        let [a, b, c] = mesh.triangles[0].corners;
        assert_eq!(a.vertex, index(1));
        assert_eq!(a.tex_coord, FaceIndex::DEFAULT);
        assert_eq!(a.normal, index(2));
        assert_eq!(b.tex_coord, FaceIndex::DEFAULT);
        assert_eq!(b.normal, FaceIndex::DEFAULT);
        assert_eq!(c.vertex, index(3));
        assert_eq!(c.tex_coord, FaceIndex::DEFAULT);
    }

    #[test]
    fn test_full_corner_references() {
        let input = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nvn 0 0 1\nf 1/1/1 2/2/1 3/3/1\n";
        let mesh = parse(input, &LoadOptions::default()).unwrap();
        let corner = mesh.triangles[0].corners[2];
        assert_eq!(corner.vertex, index(3));
        assert_eq!(corner.tex_coord, index(3));
        assert_eq!(corner.normal, index(1));
        assert_eq!(mesh.tex_coords[2], Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_placeholder_tables() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n", &LoadOptions::default()).unwrap();
        assert_eq!(mesh.normals.len(), 1);
        assert_eq!(mesh.tex_coords.len(), 1);
        assert!(mesh.validate_indices().is_ok());
    }

    #[test]
    fn test_lenient_numbers() {
        let mesh = parse("v 1.5 oops\nvt 0.25x\n", &LoadOptions::default()).unwrap();
        assert_eq!(mesh.vertices[0].position, Vec3::new(1.5, 0.0, 0.0));
        assert_eq!(mesh.tex_coords[0], Vec2::new(0.25, 0.0));
    }

    #[test]
    fn test_strict_numbers() {
        let err = parse("v 1.5 oops 2\n", &LoadOptions::strict()).unwrap_err();
        assert!(matches!(err, ObjError::InvalidNumber { line: 1, ref text } if text == "oops"));

        let err = parse("# c\nv 1 2\n", &LoadOptions::strict()).unwrap_err();
        assert!(matches!(err, ObjError::InvalidNumber { line: 2, .. }));
    }

    #[test]
    fn test_strict_missing_index() {
        let input = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let err = parse(input, &LoadOptions::default().default_missing_indices(false)).unwrap_err();
        assert!(matches!(
            err,
            ObjError::MissingIndex {
                line: 4,
                table: IndexTable::TexCoord
            }
        ));
    }

    #[test]
    fn test_zero_and_negative_indices_rejected() {
        let err = parse("v 0 0 0\nf 0 1 1\n", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, ObjError::InvalidIndex { line: 2, .. }));

        let err = parse("v 0 0 0\nf -1 1 1\n", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, ObjError::InvalidIndex { .. }));
    }

    #[test]
    fn test_lenient_index_prefix() {
        let mesh = parse("v 0 0 0\nf 1abc 1 1\n", &LoadOptions::default()).unwrap();
        assert_eq!(mesh.triangles[0].corners[0].vertex, index(1));

        let err = parse("v 0 0 0\nf 1abc 1 1\n", &LoadOptions::default().lenient_numbers(false))
            .unwrap_err();
        assert!(matches!(err, ObjError::InvalidIndex { .. }));
    }

    #[test]
    fn test_short_and_long_faces() {
        let input = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 0 0 1\nf 1 2\nf 1 2 3 4 5\n";
        let mesh = parse(input, &LoadOptions::default()).unwrap();
        assert_eq!(mesh.triangles.len(), 2);
        assert_eq!(mesh.triangles[1].vertex_indices(), [0, 2, 3]);
    }

    #[test]
    fn test_count_mismatch() {
        let counts = RecordCounts {
            vertices: 1,
            ..RecordCounts::default()
        };
        let err = parse_records(Cursor::new("v 0 0 0\nv 1 1 1\n"), &counts, &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ObjError::CountMismatch {
                kind: LineKind::Vertex,
                expected: 1,
                actual: 2
            }
        ));

        let counts = RecordCounts {
            triangles: 2,
            ..RecordCounts::default()
        };
        let err = parse_records(Cursor::new(""), &counts, &LoadOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ObjError::CountMismatch {
                kind: LineKind::Face,
                expected: 2,
                actual: 0
            }
        ));
    }
}
