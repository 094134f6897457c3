//! Planar cuts through image data.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::image_data::ImageData;
use crate::marching_cubes::marching_cubes;
use crate::poly_data::PolyData;

/// An implicit plane `normal . (p - origin) = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// A point on the plane.
    pub origin: Vec3,
    /// Plane normal; need not be unit length.
    pub normal: Vec3,
}

impl Plane {
    /// Creates a plane.
    #[must_use]
    pub fn new(origin: Vec3, normal: Vec3) -> Self {
        Self { origin, normal }
    }

    /// Signed implicit function value at `p`.
    #[must_use]
    pub fn evaluate(&self, p: Vec3) -> f32 {
        self.normal.dot(p - self.origin)
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Z)
    }
}

/// Cuts an [`ImageData`] with a [`Plane`].
///
/// The output is a triangulated section of the grid. When the input has
/// scalars they are interpolated onto the cut.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cutter {
    /// Cutting plane.
    pub plane: Plane,
}

impl Cutter {
    /// Creates a cutter for `plane`.
    #[must_use]
    pub fn new(plane: Plane) -> Self {
        Self { plane }
    }

    /// Runs the filter.
    pub fn execute(&self, input: &ImageData) -> Result<PolyData> {
        let [nx, ny, nz] = input.dimensions();
        let mut implicit = Vec::with_capacity(input.num_points());
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    implicit.push(self.plane.evaluate(input.point(i, j, k)));
                }
            }
        }

        let mesh = marching_cubes(&implicit, 0.0, [nx, ny, nz]);
        let mut out = PolyData::from_polygons(
            mesh.vertices
                .iter()
                .map(|v| input.origin + *v * input.spacing)
                .collect(),
            mesh.indices.chunks_exact(3).map(<[u32]>::to_vec).collect(),
        );
        if let Some(scalars) = input.scalars() {
            let values = mesh
                .samples
                .iter()
                .map(|s| s.lerp(&scalars.values))
                .collect();
            out.set_scalars(values)?;
        }
        let n = self.plane.normal.normalize_or_zero();
        out.set_normals(vec![n; out.num_points()])?;
        log::debug!(
            "cut {:?}: {} triangles",
            self.plane,
            mesh.num_triangles()
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> ImageData {
        let mut img = ImageData::new([6, 6, 6]).unwrap();
        let values = (0..216).map(|i| (i % 6) as f32).collect();
        img.set_scalars("x", values).unwrap();
        img
    }

    #[test]
    fn test_cut_lies_on_plane() {
        let plane = Plane::new(Vec3::splat(2.5), Vec3::ONE);
        let out = Cutter::new(plane).execute(&ramp()).unwrap();
        assert!(!out.is_empty());
        for p in &out.points {
            assert!(plane.evaluate(*p).abs() < 1e-4);
        }
    }

    #[test]
    fn test_cut_interpolates_scalars() {
        // Scalars equal the x coordinate, so they must match the cut points.
        let plane = Plane::new(Vec3::new(0.0, 0.0, 2.25), Vec3::new(1.0, 0.0, 1.0));
        let out = Cutter::new(plane).execute(&ramp()).unwrap();
        let scalars = out.point_data.scalars.as_ref().unwrap();
        for (p, s) in out.points.iter().zip(scalars) {
            assert!((p.x - s).abs() < 1e-4);
        }
    }

    #[test]
    fn test_plane_missing_grid() {
        let plane = Plane::new(Vec3::splat(100.0), Vec3::Z);
        let out = Cutter::new(plane).execute(&ramp()).unwrap();
        assert!(out.is_empty());
    }
}
