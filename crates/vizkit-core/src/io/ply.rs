//! PLY polygon meshes.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use glam::Vec3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{Result, VizError};
use crate::poly_data::PolyData;

/// Reads a PLY file into a [`PolyData`].
///
/// Vertex positions come from the `x`, `y`, `z` properties and faces from
/// `vertex_indices` (or `vertex_index`) lists of any integer type. Vertex
/// normals (`nx`, `ny`, `nz`) are kept when every vertex has them.
#[derive(Debug, Clone)]
pub struct PlyReader {
    path: PathBuf,
}

impl PlyReader {
    /// Creates a reader for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File this reader reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the mesh.
    pub fn read(&self) -> Result<PolyData> {
        let file = File::open(&self.path).map_err(|source| VizError::Open {
            path: self.path.clone(),
            source,
        })?;
        let mut reader = BufReader::new(file);
        let ply = Parser::<DefaultElement>::new()
            .read_ply(&mut reader)
            .map_err(|e| VizError::parse(&self.path, e.to_string()))?;

        let vertices = ply
            .payload
            .get("vertex")
            .ok_or_else(|| VizError::parse(&self.path, "no vertex element"))?;

        let mut points = Vec::with_capacity(vertices.len());
        let mut normals = Vec::with_capacity(vertices.len());
        for (i, vertex) in vertices.iter().enumerate() {
            let coord = |name: &str| {
                vertex.get(name).and_then(as_f32).ok_or_else(|| {
                    VizError::parse(&self.path, format!("vertex {i} has no numeric '{name}'"))
                })
            };
            points.push(Vec3::new(coord("x")?, coord("y")?, coord("z")?));
            let normal = ["nx", "ny", "nz"].map(|n| vertex.get(n).and_then(as_f32));
            if let [Some(x), Some(y), Some(z)] = normal {
                normals.push(Vec3::new(x, y, z));
            }
        }

        let mut polys = Vec::new();
        for (i, face) in ply.payload.get("face").into_iter().flatten().enumerate() {
            let list = face
                .get("vertex_indices")
                .or_else(|| face.get("vertex_index"))
                .and_then(as_index_list)
                .ok_or_else(|| VizError::parse(&self.path, format!("face {i} has no index list")))?;
            if let Some(bad) = list.iter().find(|&&v| v as usize >= points.len()) {
                return Err(VizError::parse(
                    &self.path,
                    format!("face {i} references vertex {bad} of {}", points.len()),
                ));
            }
            polys.push(list);
        }

        let mut out = PolyData::from_polygons(points, polys);
        if !normals.is_empty() && normals.len() == out.num_points() {
            out.point_data.normals = Some(normals);
        }
        log::info!(
            "read {}: {} points, {} polygons",
            self.path.display(),
            out.num_points(),
            out.polys.len()
        );
        Ok(out)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn as_f32(p: &Property) -> Option<f32> {
    Some(match *p {
        Property::Float(v) => v,
        Property::Double(v) => v as f32,
        Property::Char(v) => f32::from(v),
        Property::UChar(v) => f32::from(v),
        Property::Short(v) => f32::from(v),
        Property::UShort(v) => f32::from(v),
        Property::Int(v) => v as f32,
        Property::UInt(v) => v as f32,
        _ => return None,
    })
}

fn as_index_list(p: &Property) -> Option<Vec<u32>> {
    fn convert<T: Copy>(values: &[T]) -> Option<Vec<u32>>
    where
        u32: TryFrom<T>,
    {
        values.iter().map(|&v| u32::try_from(v).ok()).collect()
    }
    match p {
        Property::ListChar(v) => convert(v),
        Property::ListUChar(v) => convert(v),
        Property::ListShort(v) => convert(v),
        Property::ListUShort(v) => convert(v),
        Property::ListInt(v) => convert(v),
        Property::ListUInt(v) => Some(v.clone()),
        _ => None,
    }
}
