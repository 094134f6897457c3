//! Bounding box wireframes.

use crate::bounds::Bounds;
use crate::poly_data::PolyData;

/// Produces the 12 edges of a bounding box as line cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineFilter;

impl OutlineFilter {
    /// Edges as pairs of corner indices into [`Bounds::corners`].
    #[rustfmt::skip]
    const EDGES: [[u32; 2]; 12] = [
        [0, 1], [2, 3], [4, 5], [6, 7],
        [0, 2], [1, 3], [4, 6], [5, 7],
        [0, 4], [1, 5], [2, 6], [3, 7],
    ];

    /// Outline of a bounding box. An empty box yields an empty dataset.
    #[must_use]
    pub fn execute(&self, bounds: &Bounds) -> PolyData {
        if bounds.is_empty() {
            return PolyData::new();
        }
        PolyData {
            points: bounds.corners().to_vec(),
            lines: Self::EDGES.iter().map(|e| e.to_vec()).collect(),
            ..PolyData::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_every_edge_is_axis_aligned() {
        let out = OutlineFilter.execute(&Bounds::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(out.num_points(), 8);
        assert_eq!(out.lines.len(), 12);
        for line in &out.lines {
            let d = out.points[line[1] as usize] - out.points[line[0] as usize];
            let nonzero = d.to_array().iter().filter(|c| c.abs() > 0.0).count();
            assert_eq!(nonzero, 1);
        }
    }

    #[test]
    fn test_empty_bounds() {
        assert!(OutlineFilter.execute(&Bounds::EMPTY).is_empty());
    }
}
