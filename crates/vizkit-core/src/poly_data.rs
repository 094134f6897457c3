//! Polygonal datasets: points plus vertex, line and polygon cells.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::bounds::Bounds;
use crate::error::{Result, VizError};

/// Attribute arrays attached to the points of a dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointData {
    /// Active scalars, one value per point.
    pub scalars: Option<Vec<f32>>,
    /// Point normals.
    pub normals: Option<Vec<Vec3>>,
    /// Additional named single-component arrays (e.g. per-point radii).
    pub arrays: BTreeMap<String, Vec<f32>>,
}

impl PointData {
    /// Returns a named array.
    pub fn array(&self, name: &str) -> Option<&[f32]> {
        self.arrays.get(name).map(Vec::as_slice)
    }
}

/// A polygonal dataset.
///
/// Cells reference points by index. Vertex cells hold a single point each,
/// line cells are polylines and polygon cells are closed, convex loops.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolyData {
    /// Point coordinates.
    pub points: Vec<Vec3>,
    /// Vertex cells.
    pub verts: Vec<u32>,
    /// Polyline cells.
    pub lines: Vec<Vec<u32>>,
    /// Polygon cells.
    pub polys: Vec<Vec<u32>>,
    /// Point attributes.
    pub point_data: PointData,
}

impl PolyData {
    /// Creates an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dataset from points and polygons.
    #[must_use]
    pub fn from_polygons(points: Vec<Vec3>, polys: Vec<Vec<u32>>) -> Self {
        Self {
            points,
            polys,
            ..Self::default()
        }
    }

    /// Number of points.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Total number of cells of all kinds.
    #[must_use]
    pub fn num_cells(&self) -> usize {
        self.verts.len() + self.lines.len() + self.polys.len()
    }

    /// Returns true if there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box of the points.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.points)
    }

    /// Range of the active scalars, or `None` when there are none.
    #[must_use]
    pub fn scalar_range(&self) -> Option<(f32, f32)> {
        scalar_range(self.point_data.scalars.as_deref()?)
    }

    /// Sets the active scalars.
    pub fn set_scalars(&mut self, scalars: Vec<f32>) -> Result<()> {
        self.check_len(scalars.len())?;
        self.point_data.scalars = Some(scalars);
        Ok(())
    }

    /// Sets the point normals.
    pub fn set_normals(&mut self, normals: Vec<Vec3>) -> Result<()> {
        self.check_len(normals.len())?;
        self.point_data.normals = Some(normals);
        Ok(())
    }

    /// Adds a named per-point array, replacing one with the same name.
    pub fn add_array(&mut self, name: impl Into<String>, values: Vec<f32>) -> Result<()> {
        self.check_len(values.len())?;
        self.point_data.arrays.insert(name.into(), values);
        Ok(())
    }

    /// Checks that every point array has one value per point and that every
    /// cell references an existing point.
    ///
    /// The attribute fields are public, so filters that index them call this
    /// first.
    pub fn validate(&self) -> Result<()> {
        let pd = &self.point_data;
        let lengths = pd
            .scalars
            .as_ref()
            .map(Vec::len)
            .into_iter()
            .chain(pd.normals.as_ref().map(Vec::len))
            .chain(pd.arrays.values().map(Vec::len));
        for len in lengths {
            self.check_len(len)?;
        }
        let points = self.points.len();
        let cells = self
            .verts
            .iter()
            .chain(self.lines.iter().flatten())
            .chain(self.polys.iter().flatten());
        match cells.map(|&i| i as usize).find(|&i| i >= points) {
            Some(index) => Err(VizError::PointIndex { index, points }),
            None => Ok(()),
        }
    }

    fn check_len(&self, actual: usize) -> Result<()> {
        if actual == self.points.len() {
            Ok(())
        } else {
            Err(VizError::SizeMismatch {
                expected: self.points.len(),
                actual,
            })
        }
    }

    /// Fan-triangulates the polygon cells.
    ///
    /// Polygons with fewer than three points are skipped.
    #[must_use]
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        let mut tris = Vec::with_capacity(self.polys.len());
        for poly in &self.polys {
            if poly.len() < 3 {
                continue;
            }
            for k in 1..poly.len() - 1 {
                tris.push([poly[0], poly[k], poly[k + 1]]);
            }
        }
        tris
    }

    /// Unique undirected edges of all polygons, as index pairs.
    #[must_use]
    pub fn polygon_edges(&self) -> Vec<[u32; 2]> {
        let mut edges: Vec<[u32; 2]> = self
            .polys
            .iter()
            .flat_map(|poly| {
                (0..poly.len()).map(move |k| {
                    let a = poly[k];
                    let b = poly[(k + 1) % poly.len()];
                    [a.min(b), a.max(b)]
                })
            })
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// Appends another dataset, offsetting its cell indices.
    ///
    /// Point attributes survive only when both datasets carry them (or
    /// when `self` was empty).
    pub fn append(&mut self, other: &PolyData) {
        if self.points.is_empty() {
            *self = other.clone();
            return;
        }
        let offset = self.points.len() as u32;
        self.points.extend_from_slice(&other.points);
        self.verts.extend(other.verts.iter().map(|v| v + offset));
        self.lines.extend(
            other
                .lines
                .iter()
                .map(|l| l.iter().map(|v| v + offset).collect()),
        );
        self.polys.extend(
            other
                .polys
                .iter()
                .map(|p| p.iter().map(|v| v + offset).collect()),
        );

        let pd = &mut self.point_data;
        let opd = &other.point_data;
        pd.scalars = match (pd.scalars.take(), &opd.scalars) {
            (Some(mut a), Some(b)) => {
                a.extend_from_slice(b);
                Some(a)
            }
            _ => None,
        };
        pd.normals = match (pd.normals.take(), &opd.normals) {
            (Some(mut a), Some(b)) => {
                a.extend_from_slice(b);
                Some(a)
            }
            _ => None,
        };
        let arrays = std::mem::take(&mut pd.arrays);
        pd.arrays = arrays
            .into_iter()
            .filter_map(|(name, mut values)| {
                let more = opd.arrays.get(&name)?;
                values.extend_from_slice(more);
                Some((name, values))
            })
            .collect();
    }
}

/// Minimum and maximum of a slice, or `None` when empty.
#[must_use]
pub fn scalar_range(values: &[f32]) -> Option<(f32, f32)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
