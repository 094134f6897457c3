//! Boundary surface of a regular grid.

#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use crate::image_data::ImageData;
use crate::poly_data::PolyData;

/// Extracts the six boundary faces of an [`ImageData`] as quads.
///
/// Each face gets its own copy of the points on it, so the output has hard
/// edges along the grid border. Scalars are copied from the grid. Flat grids
/// (one dimension equal to 1) produce a single face.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDataGeometryFilter;

impl ImageDataGeometryFilter {
    /// Runs the filter.
    #[must_use]
    pub fn execute(&self, input: &ImageData) -> PolyData {
        let dims = input.dimensions();
        let scalars = input.scalars().map(|s| s.values.as_slice());

        let mut out = PolyData::new();
        let mut out_scalars = Vec::new();
        for axis in 0..3 {
            let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
            if dims[u] < 2 || dims[v] < 2 {
                continue;
            }
            let layers: &[usize] = if dims[axis] == 1 {
                &[0]
            } else {
                &[0, dims[axis] - 1]
            };
            for &layer in layers {
                let base = out.points.len() as u32;
                for b in 0..dims[v] {
                    for a in 0..dims[u] {
                        let mut ijk = [0; 3];
                        ijk[axis] = layer;
                        ijk[u] = a;
                        ijk[v] = b;
                        out.points.push(input.point(ijk[0], ijk[1], ijk[2]));
                        if let Some(s) = scalars {
                            out_scalars.push(s[input.index(ijk[0], ijk[1], ijk[2])]);
                        }
                    }
                }
                let row = dims[u] as u32;
                for b in 0..dims[v] as u32 - 1 {
                    for a in 0..row - 1 {
                        let p = base + b * row + a;
                        out.polys.push(vec![p, p + 1, p + row + 1, p + row]);
                    }
                }
            }
            if dims[axis] == 1 {
                break;
            }
        }
        if scalars.is_some() {
            out.point_data.scalars = Some(out_scalars);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_faces() {
        let mut img = ImageData::new([3, 4, 5]).unwrap();
        img.set_scalars("s", (0..60).map(|i| i as f32).collect())
            .unwrap();
        let out = ImageDataGeometryFilter.execute(&img);
        // Two faces per axis: 4x5, 5x3 and 3x4 points.
        assert_eq!(out.num_points(), 2 * (20 + 15 + 12));
        assert_eq!(out.polys.len(), 2 * (12 + 8 + 6));
        let scalars = out.point_data.scalars.as_ref().unwrap();
        assert_eq!(scalars.len(), out.num_points());
        assert_eq!(scalars.iter().copied().fold(f32::MIN, f32::max), 59.0);
        for p in &out.points {
            let on_face = p.x == 0.0 || p.x == 2.0 || p.y == 0.0 || p.y == 3.0;
            assert!(on_face || p.z == 0.0 || p.z == 4.0);
        }
    }

    #[test]
    fn test_flat_grid_single_face() {
        let img = ImageData::new([4, 4, 1]).unwrap();
        let out = ImageDataGeometryFilter.execute(&img);
        assert_eq!(out.num_points(), 16);
        assert_eq!(out.polys.len(), 9);
        assert!(out.point_data.scalars.is_none());
    }
}
