//! Ribbons along polylines.

#![allow(clippy::cast_possible_truncation)]

use super::{perpendicular, polyline_tangents};
use crate::error::{Result, VizError};
use crate::poly_data::PolyData;

/// Turns each polyline into a flat strip of triangles.
///
/// The strip is offset by `width` on both sides of the line along the point
/// normals, so the ribbon is twice `width` wide and follows the twist of the
/// normals. Input lines must carry normals (as produced by the stream tracer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RibbonFilter {
    /// Half width of the ribbon.
    pub width: f32,
    /// Scale the width with the point scalars.
    pub vary_width: bool,
    /// Maximum width over minimum width when varying.
    pub width_factor: f32,
}

impl Default for RibbonFilter {
    fn default() -> Self {
        Self {
            width: 0.25,
            vary_width: false,
            width_factor: 2.0,
        }
    }
}

impl RibbonFilter {
    /// Runs the filter. Lines with fewer than two points are dropped.
    pub fn execute(&self, input: &PolyData) -> Result<PolyData> {
        input.validate()?;
        let normals = input
            .point_data
            .normals
            .as_deref()
            .ok_or_else(|| VizError::MissingArray("normals".into()))?;
        let scalars = input.point_data.scalars.as_deref();
        let range = input.scalar_range().filter(|(lo, hi)| hi > lo);

        let mut out = PolyData::new();
        let mut out_normals = Vec::new();
        let mut out_scalars = Vec::new();
        for line in input.lines.iter().filter(|l| l.len() >= 2) {
            let tangents = polyline_tangents(&input.points, line);
            let base = out.points.len() as u32;
            for (&id, t) in line.iter().zip(&tangents) {
                let id = id as usize;
                let n = perpendicular(normals[id], *t).unwrap_or_else(|| t.any_orthonormal_vector());
                let mut w = self.width;
                if let (true, Some(s), Some((lo, hi))) = (self.vary_width, scalars, range) {
                    w *= 1.0 + (self.width_factor - 1.0) * (s[id] - lo) / (hi - lo);
                }
                let p = input.points[id];
                out.points.push(p - n * w);
                out.points.push(p + n * w);
                let face = n.cross(*t);
                out_normals.extend([face, face]);
                if let Some(s) = scalars {
                    out_scalars.extend([s[id], s[id]]);
                }
            }
            for i in 0..line.len() as u32 - 1 {
                let a = base + 2 * i;
                out.polys.push(vec![a, a + 2, a + 1]);
                out.polys.push(vec![a + 1, a + 2, a + 3]);
            }
        }
        out.point_data.normals = Some(out_normals);
        if scalars.is_some() {
            out.point_data.scalars = Some(out_scalars);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn straight_line() -> PolyData {
        let mut pd = PolyData {
            points: (0..5).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect(),
            lines: vec![vec![0, 1, 2, 3, 4]],
            ..PolyData::default()
        };
        pd.set_normals(vec![Vec3::Y; 5]).unwrap();
        pd.set_scalars(vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        pd
    }

    #[test]
    fn test_constant_width_strip() {
        let out = RibbonFilter::default().execute(&straight_line()).unwrap();
        assert_eq!(out.num_points(), 10);
        assert_eq!(out.polys.len(), 8);
        for pair in out.points.chunks(2) {
            assert!(((pair[1] - pair[0]).length() - 0.5).abs() < 1e-6);
        }
        // Y normal crossed with X tangent.
        assert_eq!(out.point_data.normals.as_ref().unwrap()[0], Vec3::NEG_Z);
    }

    #[test]
    fn test_vary_width_doubles_at_max_scalar() {
        let filter = RibbonFilter {
            vary_width: true,
            ..RibbonFilter::default()
        };
        let out = filter.execute(&straight_line()).unwrap();
        let width = |i: usize| (out.points[2 * i + 1] - out.points[2 * i]).length();
        assert!((width(0) - 0.5).abs() < 1e-6);
        assert!((width(4) - 1.0).abs() < 1e-6);
        assert!(width(2) > width(1));
    }

    #[test]
    fn test_short_attribute_arrays_rejected() {
        let mut pd = straight_line();
        pd.point_data.normals = Some(vec![Vec3::Y; 3]);
        assert!(matches!(
            RibbonFilter::default().execute(&pd),
            Err(VizError::SizeMismatch { expected: 5, actual: 3 })
        ));

        let mut pd = straight_line();
        pd.point_data.scalars = Some(vec![0.0; 4]);
        let filter = RibbonFilter {
            vary_width: true,
            ..RibbonFilter::default()
        };
        assert!(filter.execute(&pd).is_err());

        let mut pd = straight_line();
        pd.lines[0].push(9);
        assert!(matches!(
            RibbonFilter::default().execute(&pd),
            Err(VizError::PointIndex { index: 9, points: 5 })
        ));
    }

    #[test]
    fn test_requires_normals() {
        let mut pd = straight_line();
        pd.point_data.normals = None;
        assert!(matches!(
            RibbonFilter::default().execute(&pd),
            Err(VizError::MissingArray(_))
        ));
    }
}
