//! Dataset-to-dataset filters.
//!
//! Each filter is a small configuration struct with an `execute` method that
//! takes its input by reference and returns a new dataset.

mod contour;
mod cutter;
mod geometry;
mod normals;
mod outline;
mod ribbon;
mod stream_tracer;
mod tube;

pub use contour::ContourFilter;
pub use cutter::{Cutter, Plane};
pub use geometry::ImageDataGeometryFilter;
pub use normals::PolyDataNormals;
pub use outline::OutlineFilter;
pub use ribbon::RibbonFilter;
pub use stream_tracer::{IntegrationDirection, StreamTracer};
pub use tube::TubeFilter;

use glam::Vec3;

/// Unit tangents along a polyline, by central differences.
///
/// Repeated points borrow the nearest real direction; a line with no extent
/// at all gets +X.
fn polyline_tangents(points: &[Vec3], line: &[u32]) -> Vec<Vec3> {
    let n = line.len();
    let at = |i: usize| points[line[i] as usize];
    let raw: Vec<Vec3> = (0..n)
        .map(|i| (at((i + 1).min(n - 1)) - at(i.saturating_sub(1))).normalize_or_zero())
        .collect();
    let first = raw.iter().copied().find(|t| *t != Vec3::ZERO).unwrap_or(Vec3::X);
    let mut last = first;
    raw.into_iter()
        .map(|t| {
            if t != Vec3::ZERO {
                last = t;
            }
            last
        })
        .collect()
}

/// Component of `n` perpendicular to the unit vector `t`, normalized.
fn perpendicular(n: Vec3, t: Vec3) -> Option<Vec3> {
    let p = (n - t * n.dot(t)).normalize_or_zero();
    (p != Vec3::ZERO).then_some(p)
}
