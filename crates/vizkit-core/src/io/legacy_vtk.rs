//! Legacy `.vtk` structured points files.
//!
//! Only `DATASET STRUCTURED_POINTS` is understood. Point data may hold one
//! `SCALARS` array and one `VECTORS` array, in ASCII or big-endian BINARY
//! encoding; `NORMALS` arrays are read and discarded.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::error::{Result, VizError};
use crate::image_data::ImageData;

/// Reads a legacy VTK structured points file into an [`ImageData`].
#[derive(Debug, Clone)]
pub struct LegacyVtkReader {
    path: PathBuf,
}

impl LegacyVtkReader {
    /// Creates a reader for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File this reader reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the grid.
    pub fn read(&self) -> Result<ImageData> {
        let mut file = File::open(&self.path).map_err(|source| VizError::Open {
            path: self.path.clone(),
            source,
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| VizError::read(&self.path, e.to_string()))?;
        let image = parse(&self.path, &bytes)?;
        log::info!(
            "read {}: dimensions {:?}, scalar range {:?}",
            self.path.display(),
            image.dimensions(),
            image.scalar_range()
        );
        Ok(image)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Ascii,
    Binary,
}

/// Numeric type of a data array, as named in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl DataType {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "unsigned_char" | "vtktypeuint8" => Self::U8,
            "char" | "vtktypeint8" => Self::I8,
            "unsigned_short" | "vtktypeuint16" => Self::U16,
            "short" | "vtktypeint16" => Self::I16,
            "unsigned_int" | "vtktypeuint32" => Self::U32,
            "int" | "vtktypeint32" => Self::I32,
            "unsigned_long" | "vtktypeuint64" => Self::U64,
            "long" | "vtktypeint64" => Self::I64,
            "float" | "vtktypefloat32" => Self::F32,
            "double" | "vtktypefloat64" => Self::F64,
            _ => return None,
        })
    }

    fn size(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    /// Decodes one big-endian value; `b` has exactly `size()` bytes.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn decode_be(self, b: &[u8]) -> f32 {
        let arr = |n: usize| {
            let mut a = [0u8; 8];
            a[..n].copy_from_slice(&b[..n]);
            a
        };
        match self {
            Self::U8 => f32::from(b[0]),
            Self::I8 => f32::from(b[0] as i8),
            Self::U16 => f32::from(u16::from_be_bytes([b[0], b[1]])),
            Self::I16 => f32::from(i16::from_be_bytes([b[0], b[1]])),
            Self::U32 => u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as f32,
            Self::I32 => i32::from_be_bytes([b[0], b[1], b[2], b[3]]) as f32,
            Self::F32 => f32::from_be_bytes([b[0], b[1], b[2], b[3]]),
            Self::U64 => u64::from_be_bytes(arr(8)) as f32,
            Self::I64 => i64::from_be_bytes(arr(8)) as f32,
            Self::F64 => f64::from_be_bytes(arr(8)) as f32,
        }
    }
}

/// Byte cursor over the whole file. Header lines are text; binary arrays
/// start right after the newline of the line that introduces them.
struct Cursor<'a> {
    path: &'a Path,
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn parse_error(&self, message: impl Into<String>) -> VizError {
        VizError::parse(self.path, message)
    }

    fn truncated(&self, what: &str) -> VizError {
        VizError::read(self.path, format!("unexpected end of file in {what}"))
    }

    /// Next non-blank line, trimmed. `None` at the end of the file or when
    /// the line is not text.
    fn line(&mut self) -> Option<&'a str> {
        let data = self.data;
        loop {
            let rest = data.get(self.pos..).filter(|r| !r.is_empty())?;
            let len = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
            self.pos += (len + 1).min(rest.len());
            let text = &rest[..len];
            if !text.iter().all(u8::is_ascii_whitespace) {
                return std::str::from_utf8(text).ok().map(str::trim);
            }
        }
    }

    /// Next line split into whitespace-separated words.
    fn words(&mut self) -> Option<Vec<&'a str>> {
        self.line().map(|l| l.split_whitespace().collect())
    }

    fn peek_line(&mut self) -> Option<&'a str> {
        let saved = self.pos;
        let line = self.line();
        self.pos = saved;
        line
    }

    /// Next whitespace-delimited token, crossing line boundaries.
    fn token(&mut self) -> Option<&'a str> {
        let data = self.data;
        let rest = data.get(self.pos..)?;
        let start = rest.iter().position(|b| !b.is_ascii_whitespace())?;
        let len = rest[start..]
            .iter()
            .position(u8::is_ascii_whitespace)
            .unwrap_or(rest.len() - start);
        self.pos += start + len;
        std::str::from_utf8(&rest[start..start + len]).ok()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn values(
        &mut self,
        encoding: Encoding,
        ty: DataType,
        count: usize,
        what: &str,
    ) -> Result<Vec<f32>> {
        match encoding {
            Encoding::Ascii => (0..count)
                .map(|_| {
                    let tok = self.token().ok_or_else(|| self.truncated(what))?;
                    tok.parse::<f64>()
                        .map(|v| v as f32)
                        .map_err(|_| self.parse_error(format!("bad number '{tok}' in {what}")))
                })
                .collect(),
            Encoding::Binary => {
                let size = ty.size();
                let end = count
                    .checked_mul(size)
                    .and_then(|len| len.checked_add(self.pos))
                    .ok_or_else(|| self.parse_error(format!("{what} count {count} too large")))?;
                let data = self.data;
                let bytes = data.get(self.pos..end).ok_or_else(|| self.truncated(what))?;
                self.pos = end;
                Ok(bytes.chunks_exact(size).map(|b| ty.decode_be(b)).collect())
            }
        }
    }
}

fn parse_triple<T: std::str::FromStr>(cur: &Cursor<'_>, words: &[&str]) -> Result<[T; 3]> {
    let bad = || cur.parse_error(format!("expected three values after {}", words[0]));
    if words.len() < 4 {
        return Err(bad());
    }
    let v = |i: usize| words[i].parse::<T>().map_err(|_| bad());
    Ok([v(1)?, v(2)?, v(3)?])
}

#[allow(clippy::too_many_lines)]
fn parse(path: &Path, data: &[u8]) -> Result<ImageData> {
    let mut cur = Cursor { path, data, pos: 0 };

    let magic = cur.line().unwrap_or_default();
    if !magic.starts_with("# vtk DataFile") {
        return Err(cur.parse_error("not a legacy VTK file"));
    }
    let _title = cur.line();
    let encoding = match cur.line().map(str::to_ascii_uppercase).as_deref() {
        Some("ASCII") => Encoding::Ascii,
        Some("BINARY") => Encoding::Binary,
        other => return Err(cur.parse_error(format!("unknown encoding {other:?}"))),
    };
    let dataset = cur.words().unwrap_or_default();
    match dataset.as_slice() {
        [kw, kind] if kw.eq_ignore_ascii_case("DATASET") => {
            if !kind.eq_ignore_ascii_case("STRUCTURED_POINTS") {
                return Err(VizError::Unsupported(format!("dataset type {kind}")));
            }
        }
        _ => return Err(cur.parse_error("missing DATASET line")),
    }

    let mut dims: Option<[usize; 3]> = None;
    let mut spacing = Vec3::ONE;
    let mut origin = Vec3::ZERO;
    let mut image: Option<ImageData> = None;
    let mut num_points = 0usize;

    while let Some(words) = cur.words() {
        let keyword = words[0].to_ascii_uppercase();
        match keyword.as_str() {
            "DIMENSIONS" => dims = Some(parse_triple(&cur, &words)?),
            "SPACING" | "ASPECT_RATIO" => spacing = Vec3::from_array(parse_triple(&cur, &words)?),
            "ORIGIN" => origin = Vec3::from_array(parse_triple(&cur, &words)?),
            "POINT_DATA" => {
                let d = dims.ok_or_else(|| cur.parse_error("POINT_DATA before DIMENSIONS"))?;
                num_points = words
                    .get(1)
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| cur.parse_error("bad POINT_DATA count"))?;
                let grid = ImageData::new(d)?.with_spacing(spacing).with_origin(origin);
                if grid.num_points() != num_points {
                    return Err(VizError::SizeMismatch {
                        expected: grid.num_points(),
                        actual: num_points,
                    });
                }
                image = Some(grid);
            }
            "SCALARS" => {
                let grid = image
                    .as_mut()
                    .ok_or_else(|| cur.parse_error("SCALARS outside POINT_DATA"))?;
                let (name, ty) = array_header(&cur, &words)?;
                let components: usize = match words.get(3) {
                    Some(n) => n.parse().map_err(|_| cur.parse_error("bad component count"))?,
                    None => 1,
                };
                if cur
                    .peek_line()
                    .is_some_and(|l| l.to_ascii_uppercase().starts_with("LOOKUP_TABLE"))
                {
                    cur.line();
                }
                if components == 0 {
                    return Err(cur.parse_error("SCALARS with zero components"));
                }
                let count = num_points
                    .checked_mul(components)
                    .ok_or_else(|| cur.parse_error(format!("bad component count {components}")))?;
                let raw = cur.values(encoding, ty, count, "SCALARS")?;
                if components > 1 {
                    log::warn!("SCALARS {name} has {components} components, keeping the first");
                }
                let values = raw.chunks_exact(components).map(|c| c[0]).collect();
                grid.set_scalars(name, values)?;
            }
            "VECTORS" | "NORMALS" => {
                let grid = image
                    .as_mut()
                    .ok_or_else(|| cur.parse_error(format!("{keyword} outside POINT_DATA")))?;
                let (name, ty) = array_header(&cur, &words)?;
                let raw = cur.values(encoding, ty, num_points * 3, &keyword)?;
                if keyword == "VECTORS" {
                    let vectors = raw.chunks_exact(3).map(Vec3::from_slice).collect();
                    grid.set_vectors(name, vectors)?;
                }
            }
            "CELL_DATA" | "FIELD" | "COLOR_SCALARS" | "TEXTURE_COORDINATES" | "TENSORS" => {
                log::warn!("{}: stopping at unsupported section {keyword}", path.display());
                break;
            }
            _ => return Err(cur.parse_error(format!("unexpected keyword {}", words[0]))),
        }
    }

    match image {
        Some(grid) => Ok(grid),
        None => {
            let d = dims.ok_or_else(|| cur.parse_error("missing DIMENSIONS"))?;
            Ok(ImageData::new(d)?.with_spacing(spacing).with_origin(origin))
        }
    }
}

fn array_header(cur: &Cursor<'_>, words: &[&str]) -> Result<(String, DataType)> {
    let (Some(name), Some(ty)) = (words.get(1), words.get(2)) else {
        return Err(cur.parse_error(format!("incomplete {} header", words[0])));
    };
    let ty = DataType::from_name(ty)
        .ok_or_else(|| VizError::Unsupported(format!("data type {ty}")))?;
    Ok(((*name).to_string(), ty))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASCII: &str = "# vtk DataFile Version 3.0
noise
ASCII
DATASET STRUCTURED_POINTS
DIMENSIONS 2 2 2
SPACING 0.5 1 2
ORIGIN 1 0 0
POINT_DATA 8
SCALARS scalars float 1
LOOKUP_TABLE default
0 1 2 3
4 5 6 7.5
VECTORS velocity double
1 0 0 1 0 0 1 0 0 1 0 0
0 1 0 0 1 0 0 1 0 0 1 0
";

    fn header(dimensions: &str, point_data: &str) -> String {
        format!(
            "# vtk DataFile Version 3.0\nbad\nASCII\nDATASET STRUCTURED_POINTS\n\
             DIMENSIONS {dimensions}\nPOINT_DATA {point_data}\n"
        )
    }

    #[test]
    fn test_overflowing_dimensions_are_rejected() {
        let text = header("4294967296 4294967296 2", "8");
        assert!(matches!(
            parse(Path::new("big.vtk"), text.as_bytes()),
            Err(VizError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_overflowing_component_count_is_rejected() {
        let text = header("2 2 2", "8") + "SCALARS s float 4611686018427387904\n0 1 2 3 4 5 6 7\n";
        assert!(parse(Path::new("comp.vtk"), text.as_bytes()).is_err());
        let text = header("2 2 2", "8") + "SCALARS s float 0\n";
        assert!(parse(Path::new("zero.vtk"), text.as_bytes()).is_err());
    }

    #[test]
    fn test_binary_count_overflow_is_rejected() {
        let text = "# vtk DataFile Version 3.0\nbad\nBINARY\nDATASET STRUCTURED_POINTS\n\
                    DIMENSIONS 2 2 2\nPOINT_DATA 8\nSCALARS s double 1152921504606846976\n\
                    LOOKUP_TABLE default\n";
        assert!(parse(Path::new("bin.vtk"), text.as_bytes()).is_err());
    }

    #[test]
    fn test_ascii_scalars_and_vectors() {
        let img = parse(Path::new("noise.vtk"), ASCII.as_bytes()).unwrap();
        assert_eq!(img.dimensions(), [2, 2, 2]);
        assert_eq!(img.spacing, Vec3::new(0.5, 1.0, 2.0));
        assert_eq!(img.origin, Vec3::X);
        assert_eq!(img.scalar_range(), Some((0.0, 7.5)));
        let vectors = img.vectors().unwrap();
        assert_eq!(vectors.name, "velocity");
        assert_eq!(vectors.values[4], Vec3::Y);
    }

    #[test]
    fn test_binary_unsigned_char_with_aspect_ratio() {
        let mut file = b"# vtk DataFile Version 1.0
Iron protein
BINARY
DATASET STRUCTURED_POINTS
DIMENSIONS 3 1 1
ASPECT_RATIO 1 1 1
ORIGIN 0 0 0
POINT_DATA 3
SCALARS scalars unsigned_char
LOOKUP_TABLE default
"
        .to_vec();
        // 10 and 32 are newline and space; they must be read as data.
        file.extend_from_slice(&[10, 32, 255]);
        file.push(b'\n');
        let img = parse(Path::new("iron.vtk"), &file).unwrap();
        assert_eq!(img.require_scalars().unwrap(), &[10.0, 32.0, 255.0]);
    }

    #[test]
    fn test_binary_big_endian_float() {
        let mut file = b"# vtk DataFile Version 3.0\nt\nBINARY\nDATASET STRUCTURED_POINTS\n\
DIMENSIONS 2 1 1\nPOINT_DATA 2\nSCALARS s float\n"
            .to_vec();
        file.extend_from_slice(&1.5f32.to_be_bytes());
        file.extend_from_slice(&(-2.0f32).to_be_bytes());
        let img = parse(Path::new("f.vtk"), &file).unwrap();
        assert_eq!(img.require_scalars().unwrap(), &[1.5, -2.0]);
    }

    #[test]
    fn test_truncated_binary_is_read_error() {
        let mut file = b"# vtk DataFile Version 3.0\nt\nBINARY\nDATASET STRUCTURED_POINTS\n\
DIMENSIONS 4 1 1\nPOINT_DATA 4\nSCALARS s short\n"
            .to_vec();
        file.extend_from_slice(&[0, 1, 0]);
        let err = parse(Path::new("short.vtk"), &file).unwrap_err();
        assert!(matches!(err, VizError::Read { .. }));
    }

    #[test]
    fn test_unsupported_dataset() {
        let file = b"# vtk DataFile Version 3.0\nt\nASCII\nDATASET POLYDATA\n";
        assert!(matches!(
            parse(Path::new("p.vtk"), file),
            Err(VizError::Unsupported(_))
        ));
    }

    #[test]
    fn test_point_count_must_match_dimensions() {
        let file = b"# vtk DataFile Version 3.0\nt\nASCII\nDATASET STRUCTURED_POINTS\n\
DIMENSIONS 2 2 2\nPOINT_DATA 7\n";
        assert!(matches!(
            parse(Path::new("m.vtk"), file),
            Err(VizError::SizeMismatch { expected: 8, actual: 7 })
        ));
    }
}
