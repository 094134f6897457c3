//! Tubes around polylines.

#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use std::f32::consts::TAU;

use glam::Vec3;

use super::{perpendicular, polyline_tangents};
use crate::error::Result;
use crate::poly_data::PolyData;

/// Sweeps a regular polygon along each polyline.
///
/// Point normals on the input orient the cross-section; without them a frame
/// is carried along the line by parallel transport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubeFilter {
    /// Tube radius.
    pub radius: f32,
    /// Number of sides of the cross-section (at least 3).
    pub number_of_sides: u32,
}

impl Default for TubeFilter {
    fn default() -> Self {
        Self {
            radius: 0.5,
            number_of_sides: 3,
        }
    }
}

impl TubeFilter {
    /// Runs the filter. Lines with fewer than two points are dropped.
    pub fn execute(&self, input: &PolyData) -> Result<PolyData> {
        input.validate()?;
        let sides = self.number_of_sides.max(3);
        let in_normals = input.point_data.normals.as_deref();
        let scalars = input.point_data.scalars.as_deref();

        let mut out = PolyData::new();
        let mut out_normals = Vec::new();
        let mut out_scalars = Vec::new();
        for line in input.lines.iter().filter(|l| l.len() >= 2) {
            let tangents = polyline_tangents(&input.points, line);
            let base = out.points.len() as u32;
            let mut frame = tangents[0].any_orthonormal_vector();
            for (&id, t) in line.iter().zip(&tangents) {
                let id = id as usize;
                let hint = in_normals.map_or(frame, |n| n[id]);
                frame = perpendicular(hint, *t)
                    .or_else(|| perpendicular(frame, *t))
                    .unwrap_or_else(|| t.any_orthonormal_vector());
                let binormal = t.cross(frame);
                for k in 0..sides {
                    let a = TAU * k as f32 / sides as f32;
                    let radial = frame * a.cos() + binormal * a.sin();
                    out.points.push(input.points[id] + radial * self.radius);
                    out_normals.push(radial);
                    if let Some(s) = scalars {
                        out_scalars.push(s[id]);
                    }
                }
            }
            for i in 0..line.len() as u32 - 1 {
                let (ring, next) = (base + i * sides, base + (i + 1) * sides);
                for k in 0..sides {
                    let k1 = (k + 1) % sides;
                    out.polys
                        .push(vec![ring + k, ring + k1, next + k1, next + k]);
                }
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

    #[test]
    fn test_tube_points_at_radius() {
        let line = PolyData {
            points: vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 2.0)],
            lines: vec![vec![0, 1, 2]],
            ..PolyData::default()
        };
        let tube = TubeFilter {
            radius: 0.25,
            number_of_sides: 5,
        }
        .execute(&line)
        .unwrap();
        assert_eq!(tube.num_points(), 15);
        assert_eq!(tube.polys.len(), 10);
        for (i, p) in tube.points.iter().enumerate() {
            let center = line.points[i / 5];
            assert!(((*p - center).length() - 0.25).abs() < 1e-5);
        }
    }

    #[test]
    fn test_short_lines_dropped() {
        let line = PolyData {
            points: vec![Vec3::ZERO],
            lines: vec![vec![0]],
            ..PolyData::default()
        };
        assert!(TubeFilter::default().execute(&line).unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_normals_rejected() {
        let mut line = PolyData {
            points: vec![Vec3::ZERO, Vec3::Z],
            lines: vec![vec![0, 1]],
            ..PolyData::default()
        };
        line.point_data.normals = Some(vec![Vec3::X]);
        assert!(matches!(
            TubeFilter::default().execute(&line),
            Err(crate::error::VizError::SizeMismatch { expected: 2, actual: 1 })
        ));
    }
}
