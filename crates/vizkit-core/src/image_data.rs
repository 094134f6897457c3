//! Regular grids ("structured points") with point attributes.

use glam::Vec3;

use crate::bounds::Bounds;
use crate::error::{Result, VizError};
use crate::poly_data::scalar_range;

/// A named point attribute array.
#[derive(Debug, Clone, PartialEq)]
pub struct Named<T> {
    /// Array name as stored in the source file.
    pub name: String,
    /// One value per grid point.
    pub values: Vec<T>,
}

/// A regular, axis-aligned grid of points.
///
/// Point `(i, j, k)` sits at `origin + spacing * (i, j, k)` and its attributes
/// live at index `i + nx * (j + ny * k)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    dimensions: [usize; 3],
    /// Distance between neighboring points along each axis.
    pub spacing: Vec3,
    /// Position of point `(0, 0, 0)`.
    pub origin: Vec3,
    scalars: Option<Named<f32>>,
    vectors: Option<Named<Vec3>>,
}

impl ImageData {
    /// Creates a grid with unit spacing at the origin and no attributes.
    pub fn new(dimensions: [usize; 3]) -> Result<Self> {
        let fits = dimensions
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .and_then(|n| n.checked_mul(std::mem::size_of::<Vec3>()))
            .is_some();
        if dimensions.iter().any(|&d| d == 0) || !fits {
            return Err(VizError::InvalidDimensions(dimensions));
        }
        Ok(Self {
            dimensions,
            spacing: Vec3::ONE,
            origin: Vec3::ZERO,
            scalars: None,
            vectors: None,
        })
    }

    /// Sets spacing and returns self.
    #[must_use]
    pub fn with_spacing(mut self, spacing: Vec3) -> Self {
        self.spacing = spacing;
        self
    }

    /// Sets origin and returns self.
    #[must_use]
    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    /// Grid dimensions in points.
    #[must_use]
    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    /// Number of grid points.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.dimensions.iter().product()
    }

    /// Linear index of point `(i, j, k)`.
    #[must_use]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        let [nx, ny, _] = self.dimensions;
        i + nx * (j + ny * k)
    }

    /// World position of point `(i, j, k)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn point(&self, i: usize, j: usize, k: usize) -> Vec3 {
        self.origin + self.spacing * Vec3::new(i as f32, j as f32, k as f32)
    }

    /// Converts a world position to continuous grid coordinates.
    #[must_use]
    pub fn to_grid(&self, p: Vec3) -> Vec3 {
        (p - self.origin) / self.spacing
    }

    /// Bounding box of the grid points.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bounds(&self) -> Bounds {
        let [nx, ny, nz] = self.dimensions;
        let far = self.origin
            + self.spacing * Vec3::new((nx - 1) as f32, (ny - 1) as f32, (nz - 1) as f32);
        Bounds::new(self.origin.min(far), self.origin.max(far))
    }

    /// Characteristic cell size: the smallest spacing component.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.spacing.abs().min_element()
    }

    /// Sets the point scalars.
    pub fn set_scalars(&mut self, name: impl Into<String>, values: Vec<f32>) -> Result<()> {
        self.check_len(values.len())?;
        self.scalars = Some(Named {
            name: name.into(),
            values,
        });
        Ok(())
    }

    /// Sets the point vectors.
    pub fn set_vectors(&mut self, name: impl Into<String>, values: Vec<Vec3>) -> Result<()> {
        self.check_len(values.len())?;
        self.vectors = Some(Named {
            name: name.into(),
            values,
        });
        Ok(())
    }

    fn check_len(&self, actual: usize) -> Result<()> {
        let expected = self.num_points();
        if actual == expected {
            Ok(())
        } else {
            Err(VizError::SizeMismatch { expected, actual })
        }
    }

    /// Point scalars, if any.
    #[must_use]
    pub fn scalars(&self) -> Option<&Named<f32>> {
        self.scalars.as_ref()
    }

    /// Point vectors, if any.
    #[must_use]
    pub fn vectors(&self) -> Option<&Named<Vec3>> {
        self.vectors.as_ref()
    }

    /// Point scalars or a `MissingArray` error.
    pub fn require_scalars(&self) -> Result<&[f32]> {
        self.scalars
            .as_ref()
            .map(|s| s.values.as_slice())
            .ok_or_else(|| VizError::MissingArray("scalars".into()))
    }

    /// Point vectors or a `MissingArray` error.
    pub fn require_vectors(&self) -> Result<&[Vec3]> {
        self.vectors
            .as_ref()
            .map(|v| v.values.as_slice())
            .ok_or_else(|| VizError::MissingArray("vectors".into()))
    }

    /// Range of the point scalars.
    #[must_use]
    pub fn scalar_range(&self) -> Option<(f32, f32)> {
        scalar_range(&self.scalars.as_ref()?.values)
    }

    /// Range of the vector magnitudes.
    #[must_use]
    pub fn vector_magnitude_range(&self) -> Option<(f32, f32)> {
        let mags: Vec<f32> = self
            .vectors
            .as_ref()?
            .values
            .iter()
            .map(|v| v.length())
            .collect();
        scalar_range(&mags)
    }

    /// Trilinearly interpolates the vector field at a world position.
    ///
    /// Returns `None` when the grid has no vectors or `p` lies outside it.
    #[must_use]
    pub fn interpolate_vector(&self, p: Vec3) -> Option<Vec3> {
        let values = &self.vectors.as_ref()?.values;
        let (base, frac) = self.locate(p)?;
        let mut acc = Vec3::ZERO;
        for (corner, weight) in self.corner_weights(base, frac) {
            acc += values[corner] * weight;
        }
        Some(acc)
    }

    /// Trilinearly interpolates the scalars at a world position.
    #[must_use]
    pub fn interpolate_scalar(&self, p: Vec3) -> Option<f32> {
        let values = &self.scalars.as_ref()?.values;
        let (base, frac) = self.locate(p)?;
        Some(
            self.corner_weights(base, frac)
                .into_iter()
                .map(|(corner, weight)| values[corner] * weight)
                .sum(),
        )
    }

    /// Curl of the vector field at `p`, by central differences.
    ///
    /// Falls back to one-sided differences at the grid boundary.
    #[must_use]
    pub fn vorticity(&self, p: Vec3) -> Option<Vec3> {
        let center = self.interpolate_vector(p)?;
        let mut jac = [Vec3::ZERO; 3];
        for (axis, d) in jac.iter_mut().enumerate() {
            let mut step = Vec3::ZERO;
            step[axis] = self.spacing[axis] * 0.5;
            let fwd = self.interpolate_vector(p + step);
            let bwd = self.interpolate_vector(p - step);
            *d = match (fwd, bwd) {
                (Some(f), Some(b)) => (f - b) / (2.0 * step[axis]),
                (Some(f), None) => (f - center) / step[axis],
                (None, Some(b)) => (center - b) / step[axis],
                (None, None) => Vec3::ZERO,
            };
        }
        // jac[a] = dV/d(axis a)
        Some(Vec3::new(
            jac[1].z - jac[2].y,
            jac[2].x - jac[0].z,
            jac[0].y - jac[1].x,
        ))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn locate(&self, p: Vec3) -> Option<([usize; 3], Vec3)> {
        let g = self.to_grid(p);
        let mut base = [0usize; 3];
        let mut frac = Vec3::ZERO;
        for axis in 0..3 {
            let n = self.dimensions[axis];
            let c = g[axis];
            let eps = 1e-4;
            if !c.is_finite() || c < -eps || c > (n - 1) as f32 + eps {
                return None;
            }
            let c = c.clamp(0.0, (n - 1) as f32);
            // Degenerate axis: a single layer of points.
            if n == 1 {
                continue;
            }
            let b = (c.floor() as usize).min(n - 2);
            base[axis] = b;
            frac[axis] = c - b as f32;
        }
        Some((base, frac))
    }

    fn corner_weights(&self, base: [usize; 3], frac: Vec3) -> [(usize, f32); 8] {
        let [nx, ny, nz] = self.dimensions;
        let step = |axis: usize, n: usize| usize::from(n > 1 && base[axis] + 1 < n);
        let (sx, sy, sz) = (step(0, nx), step(1, ny), step(2, nz));
        let mut out = [(0usize, 0.0f32); 8];
        for (c, slot) in out.iter_mut().enumerate() {
            let (dx, dy, dz) = (c & 1, (c >> 1) & 1, (c >> 2) & 1);
            let wx = if dx == 1 { frac.x } else { 1.0 - frac.x };
            let wy = if dy == 1 { frac.y } else { 1.0 - frac.y };
            let wz = if dz == 1 { frac.z } else { 1.0 - frac.z };
            let idx = self.index(base[0] + dx * sx, base[1] + dy * sy, base[2] + dz * sz);
            *slot = (idx, wx * wy * wz);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn linear_field(n: usize) -> ImageData {
        let mut img = ImageData::new([n, n, n]).unwrap();
        let mut scalars = Vec::new();
        let mut vectors = Vec::new();
        for k in 0..n {
            for j in 0..n {
                for i in 0..n {
                    let p = img.point(i, j, k);
                    scalars.push(p.x + 2.0 * p.y - p.z);
                    // Rigid rotation about z: curl = (0, 0, 2)
                    vectors.push(Vec3::new(-p.y, p.x, 0.0));
                }
            }
        }
        img.set_scalars("s", scalars).unwrap();
        img.set_vectors("v", vectors).unwrap();
        img
    }

    #[test]
    fn test_rejects_zero_dimension() {
        assert!(matches!(
            ImageData::new([4, 0, 4]),
            Err(VizError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_rejects_overflowing_dimensions() {
        assert!(matches!(
            ImageData::new([usize::MAX / 2, 3, 1]),
            Err(VizError::InvalidDimensions(_))
        ));
        assert!(matches!(
            ImageData::new([usize::MAX / 4, 2, 1]),
            Err(VizError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_index_is_x_fastest() {
        let img = ImageData::new([3, 4, 5]).unwrap();
        assert_eq!(img.index(1, 0, 0), 1);
        assert_eq!(img.index(0, 1, 0), 3);
        assert_eq!(img.index(0, 0, 1), 12);
        assert_eq!(img.num_points(), 60);
    }

    #[test]
    fn test_bounds_with_spacing_and_origin() {
        let img = ImageData::new([3, 3, 2])
            .unwrap()
            .with_spacing(Vec3::new(0.5, 1.0, 2.0))
            .with_origin(Vec3::new(-1.0, 0.0, 0.0));
        let b = img.bounds();
        assert_eq!(b.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(b.max, Vec3::new(0.0, 2.0, 2.0));
    }

    #[test]
    fn test_outside_grid_is_none() {
        let img = linear_field(4);
        assert!(img.interpolate_vector(Vec3::new(-0.5, 1.0, 1.0)).is_none());
        assert!(img.interpolate_vector(Vec3::new(1.0, 1.0, 3.5)).is_none());
    }

    #[test]
    fn test_vorticity_of_rigid_rotation() {
        let img = linear_field(5);
        let w = img.vorticity(Vec3::new(2.0, 2.0, 2.0)).unwrap();
        assert!((w - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-4, "{w:?}");
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let mut img = ImageData::new([2, 2, 2]).unwrap();
        assert!(img.set_scalars("s", vec![0.0; 7]).is_err());
        assert!(img.require_vectors().is_err());
    }

    proptest! {
        #[test]
        fn prop_trilinear_reproduces_linear_fields(
            x in 0.0f32..3.0, y in 0.0f32..3.0, z in 0.0f32..3.0
        ) {
            let img = linear_field(4);
            let s = img.interpolate_scalar(Vec3::new(x, y, z)).unwrap();
            prop_assert!((s - (x + 2.0 * y - z)).abs() < 1e-4);
            let v = img.interpolate_vector(Vec3::new(x, y, z)).unwrap();
            prop_assert!((v - Vec3::new(-y, x, 0.0)).length() < 1e-4);
        }
    }
}
