//! Raw `.vec` vector fields.
//!
//! The format is a single text line `nx ny nz` followed by `nx * ny * nz`
//! little-endian `f32` triples, x fastest.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use glam::Vec3;

use crate::error::{Result, VizError};
use crate::image_data::ImageData;

/// Name given to the vectors read from a `.vec` file.
pub const VELOCITY: &str = "Velocity";

/// Reads a `.vec` file into an [`ImageData`] with unit spacing at the
/// origin and vectors named `"Velocity"`.
///
/// Fails with [`VizError::Open`] when the file cannot be opened and with
/// [`VizError::Read`] when the header is malformed or the data is short.
pub fn read_vector_field(path: impl AsRef<Path>) -> Result<ImageData> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| VizError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let file_len = file
        .metadata()
        .map_err(|e| VizError::read(path, e.to_string()))?
        .len();
    let mut reader = BufReader::new(file);

    let mut header = String::new();
    let header_len = reader
        .read_line(&mut header)
        .map_err(|e| VizError::read(path, e.to_string()))?;
    let dims: Vec<usize> = header
        .split_whitespace()
        .take(3)
        .map_while(|w| w.parse().ok())
        .collect();
    let [nx, ny, nz] = dims[..] else {
        return Err(VizError::read(path, format!("bad header '{}'", header.trim())));
    };

    let (count, byte_len) = nx
        .checked_mul(ny)
        .and_then(|n| n.checked_mul(nz))
        .filter(|&n| n > 0)
        .and_then(|n| Some((n, n.checked_mul(12)?)))
        .ok_or_else(|| VizError::read(path, format!("bad dimensions {nx} {ny} {nz}")))?;
    let available = file_len.saturating_sub(header_len as u64);
    if (byte_len as u64) > available {
        return Err(VizError::read(
            path,
            format!("expected {count} vectors, file holds {available} data bytes"),
        ));
    }
    let mut bytes = vec![0u8; byte_len];
    reader
        .read_exact(&mut bytes)
        .map_err(|e| VizError::read(path, format!("expected {count} vectors: {e}")))?;

    let vectors = bytes
        .chunks_exact(12)
        .map(|c| {
            let f = |o: usize| f32::from_le_bytes([c[o], c[o + 1], c[o + 2], c[o + 3]]);
            Vec3::new(f(0), f(4), f(8))
        })
        .collect();
    let mut field = ImageData::new([nx, ny, nz])?;
    field.set_vectors(VELOCITY, vectors)?;
    log::info!(
        "read {}: {nx}x{ny}x{nz} vectors, speed range {:?}",
        path.display(),
        field.vector_magnitude_range()
    );
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_temp(name: &str, bytes: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("vizkit-{}-{name}", std::process::id()));
        File::create(&path).unwrap().write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_reads_header_and_vectors() {
        let mut bytes = b"2 1 1\n".to_vec();
        for v in [1.0f32, 2.0, 3.0, -1.0, 0.0, 0.5] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let path = write_temp("ok.vec", &bytes);
        let field = read_vector_field(&path).unwrap();
        assert_eq!(field.dimensions(), [2, 1, 1]);
        let vectors = field.vectors().unwrap();
        assert_eq!(vectors.name, "Velocity");
        assert_eq!(vectors.values, vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(-1.0, 0.0, 0.5)]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_short_data() {
        let mut bytes = b"2 2 2\n".to_vec();
        bytes.extend_from_slice(&[0u8; 40]);
        let path = write_temp("short.vec", &bytes);
        let err = read_vector_field(&path).unwrap_err();
        assert!(err.to_string().starts_with("Error reading file"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_bad_header() {
        let path = write_temp("header.vec", b"64 64\n");
        assert!(matches!(
            read_vector_field(&path),
            Err(VizError::Read { .. })
        ));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_overflowing_header() {
        let path = write_temp("overflow.vec", b"2000000000000000000 1 1\n");
        let err = read_vector_field(&path).unwrap_err();
        assert!(err.to_string().starts_with("Error reading file"), "{err}");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_huge_header_on_small_file() {
        let mut bytes = b"100000 100000 100\n".to_vec();
        bytes.extend_from_slice(&[0u8; 24]);
        let path = write_temp("huge.vec", &bytes);
        assert!(matches!(
            read_vector_field(&path),
            Err(VizError::Read { .. })
        ));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file() {
        let err = read_vector_field("/no/such/TwoSwirls.vec").unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Could not open file /no/such/TwoSwirls.vec"));
    }
}
