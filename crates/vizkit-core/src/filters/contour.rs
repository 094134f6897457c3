//! Isosurface extraction from image scalars.

use crate::error::Result;
use crate::image_data::ImageData;
use crate::marching_cubes::marching_cubes;
use crate::poly_data::PolyData;

/// Extracts isosurfaces of the active scalars at one or more values.
///
/// All surfaces are merged into one dataset. Each output point carries the
/// contour value it belongs to as its scalar, so a mapper can color the
/// surfaces apart.
#[derive(Debug, Clone, Default)]
pub struct ContourFilter {
    values: Vec<f32>,
    /// Emit point normals (on by default through [`ContourFilter::new`]).
    pub compute_normals: bool,
}

impl ContourFilter {
    /// Creates a filter with no contour values and normals enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            compute_normals: true,
        }
    }

    /// Sets contour value `i`, growing the list as needed.
    pub fn set_value(&mut self, i: usize, value: f32) {
        if i >= self.values.len() {
            self.values.resize(i + 1, value);
        }
        self.values[i] = value;
    }

    /// Replaces the list with `n` values evenly spaced over `[lo, hi]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn generate_values(&mut self, n: usize, lo: f32, hi: f32) {
        self.values = match n {
            0 => Vec::new(),
            1 => vec![lo],
            _ => (0..n)
                .map(|i| lo + (hi - lo) * i as f32 / (n - 1) as f32)
                .collect(),
        };
    }

    /// The contour values.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Runs the filter.
    ///
    /// Fails only when the input has no scalars. A value that does not cross
    /// the field contributes nothing.
    pub fn execute(&self, input: &ImageData) -> Result<PolyData> {
        let field = input.require_scalars()?;
        let dims = input.dimensions();

        let mut out = PolyData::new();
        for &value in &self.values {
            let mesh = marching_cubes(field, value, dims);
            if mesh.is_empty() {
                log::warn!("contour value {value} produced no surface");
                continue;
            }
            let n = mesh.vertices.len();
            let mut surface = PolyData::from_polygons(
                mesh.vertices
                    .iter()
                    .map(|v| input.origin + *v * input.spacing)
                    .collect(),
                mesh.indices.chunks_exact(3).map(<[u32]>::to_vec).collect(),
            );
            surface.point_data.scalars = Some(vec![value; n]);
            if self.compute_normals {
                // Inverse-transpose of the diagonal grid-to-world scaling.
                surface.point_data.normals = Some(
                    mesh.normals
                        .iter()
                        .map(|nrm| (*nrm / input.spacing).normalize_or_zero())
                        .collect(),
                );
            }
            log::debug!(
                "contour {value}: {} points, {} triangles",
                n,
                mesh.num_triangles()
            );
            out.append(&surface);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn radial(n: usize, spacing: f32) -> ImageData {
        let mut img = ImageData::new([n, n, n])
            .unwrap()
            .with_spacing(Vec3::splat(spacing));
        let c = (n - 1) as f32 * spacing * 0.5;
        let mut values = Vec::with_capacity(n * n * n);
        for k in 0..n {
            for j in 0..n {
                for i in 0..n {
                    values.push((img.point(i, j, k) - Vec3::splat(c)).length());
                }
            }
        }
        img.set_scalars("distance", values).unwrap();
        img
    }

    #[test]
    fn test_contours_are_spheres_in_world_space() {
        let img = radial(21, 0.5);
        let mut filter = ContourFilter::new();
        filter.set_value(0, 2.0);
        filter.set_value(1, 3.0);
        let out = filter.execute(&img).unwrap();
        assert!(!out.is_empty());

        let center = Vec3::splat(5.0);
        let scalars = out.point_data.scalars.as_ref().unwrap();
        for (p, s) in out.points.iter().zip(scalars) {
            assert!(((*p - center).length() - s).abs() < 0.1);
        }
        assert!(scalars.contains(&2.0) && scalars.contains(&3.0));

        let normals = out.point_data.normals.as_ref().unwrap();
        assert_eq!(normals.len(), out.num_points());
    }

    #[test]
    fn test_value_outside_range_is_skipped() {
        let img = radial(5, 1.0);
        let mut filter = ContourFilter::new();
        filter.set_value(0, 100.0);
        assert!(filter.execute(&img).unwrap().is_empty());
    }

    #[test]
    fn test_missing_scalars() {
        let img = ImageData::new([2, 2, 2]).unwrap();
        assert!(ContourFilter::new().execute(&img).is_err());
    }

    #[test]
    fn test_generate_values() {
        let mut filter = ContourFilter::new();
        filter.generate_values(3, 1.5, 4.5);
        assert_eq!(filter.values(), &[1.5, 3.0, 4.5]);
    }
}
