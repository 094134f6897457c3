//! Volumes: image data rendered by ray marching.

#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]

use glam::{Mat4, Vec3};
use vizkit_core::{
    Bounds, ColorTransferFunction, ImageData, PiecewiseFunction, Result, ScalarsToColors,
};
use vizkit_render::LUT_SIZE;

/// Sampling of the scalar field between grid points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// Value of the closest grid point.
    #[default]
    Nearest,
    /// Trilinear.
    Linear,
}

/// Transfer functions and sampling of a volume.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeProperty {
    /// Scalar to color.
    pub color: ColorTransferFunction,
    /// Scalar to opacity per unit distance.
    pub scalar_opacity: PiecewiseFunction,
    /// Sampling between grid points.
    pub interpolation: Interpolation,
    /// Distance over which a scalar opacity applies.
    pub scalar_opacity_unit_distance: f32,
}

impl Default for VolumeProperty {
    fn default() -> Self {
        Self {
            color: ColorTransferFunction::new(),
            scalar_opacity: PiecewiseFunction::new(),
            interpolation: Interpolation::Nearest,
            scalar_opacity_unit_distance: 1.0,
        }
    }
}

impl VolumeProperty {
    /// Samples the transfer functions into an RGBA table spanning `range`.
    #[must_use]
    pub fn lookup_table(&self, range: (f32, f32)) -> Vec<[u8; 4]> {
        let (lo, hi) = range;
        let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (0..LUT_SIZE)
            .map(|i| {
                let x = lo + (hi - lo) * i as f32 / (LUT_SIZE - 1) as f32;
                let c = self.color.map_value(x);
                [
                    to_byte(c.x),
                    to_byte(c.y),
                    to_byte(c.z),
                    to_byte(self.scalar_opacity.value(x)),
                ]
            })
            .collect()
    }
}

/// A scalar [`ImageData`] drawn with a [`VolumeProperty`].
#[derive(Debug, Clone)]
pub struct Volume {
    input: ImageData,
    property: VolumeProperty,
    position: Vec3,
    visible: bool,
    modified: u64,
}

impl Volume {
    /// Creates a volume. The input must carry point scalars.
    pub fn new(input: ImageData) -> Result<Self> {
        input.require_scalars()?;
        Ok(Self {
            input,
            property: VolumeProperty::default(),
            position: Vec3::ZERO,
            visible: true,
            modified: 0,
        })
    }

    /// The input grid.
    #[must_use]
    pub fn input(&self) -> &ImageData {
        &self.input
    }

    /// The volume property.
    #[must_use]
    pub fn property(&self) -> &VolumeProperty {
        &self.property
    }

    /// Replaces the volume property.
    pub fn set_property(&mut self, property: VolumeProperty) {
        self.property = property;
        self.modified += 1;
    }

    /// Mutable access to the volume property.
    pub fn property_mut(&mut self) -> &mut VolumeProperty {
        self.modified += 1;
        &mut self.property
    }

    /// Sets the translation.
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
        self.modified += 1;
    }

    /// Whether the volume is drawn.
    #[must_use]
    pub fn visibility(&self) -> bool {
        self.visible
    }

    /// Shows or hides the volume.
    pub fn set_visibility(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.modified += 1;
        }
    }

    /// Model matrix.
    #[must_use]
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
    }

    /// World-space bounds.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        let b = self.input.bounds();
        Bounds::new(b.min + self.position, b.max + self.position)
    }

    /// Scalar range spanned by the lookup table: the data range.
    #[must_use]
    pub fn scalar_range(&self) -> (f32, f32) {
        self.input.scalar_range().unwrap_or((0.0, 1.0))
    }

    /// Distance between ray samples: half the smallest grid spacing.
    #[must_use]
    pub fn sample_distance(&self) -> f32 {
        (self.input.spacing.abs().min_element() * 0.5).max(1e-4)
    }

    /// Modification counter.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.modified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vizkit_core::VizError;

    fn iron_like() -> ImageData {
        let mut grid = ImageData::new([4, 4, 4]).unwrap();
        let values = (0..64).map(|i| (i * 4) as f32).collect();
        grid.set_scalars("scalars", values).unwrap();
        grid
    }

    #[test]
    fn test_requires_scalars() {
        let grid = ImageData::new([2, 2, 2]).unwrap();
        assert!(matches!(Volume::new(grid), Err(VizError::MissingArray(_))));
    }

    #[test]
    fn test_lookup_table_endpoints() {
        let mut property = VolumeProperty::default();
        property.color.add_rgb_point(0.0, 1.0, 0.0, 0.0);
        property.color.add_rgb_point(255.0, 0.0, 0.0, 1.0);
        property.scalar_opacity.add_point(0.0, 0.0);
        property.scalar_opacity.add_point(255.0, 0.2);
        let lut = property.lookup_table((0.0, 255.0));
        assert_eq!(lut.len(), LUT_SIZE);
        assert_eq!(lut[0], [255, 0, 0, 0]);
        assert_eq!(lut[255], [0, 0, 255, 51]);
    }

    #[test]
    fn test_scalar_range_and_bounds() {
        let mut volume = Volume::new(iron_like()).unwrap();
        assert_eq!(volume.scalar_range(), (0.0, 252.0));
        volume.set_position(1.0, 0.0, 0.0);
        assert_eq!(volume.bounds().min, Vec3::X);
        assert!((volume.sample_distance() - 0.5).abs() < 1e-6);
    }
}
