//! Scalar-to-color and scalar-to-opacity mappings.

#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Maps scalar values to RGB colors.
pub trait ScalarsToColors {
    /// Color for a scalar value, components in `[0, 1]`.
    fn map_value(&self, x: f32) -> Vec3;

    /// Scalar range the mapping is defined over.
    fn range(&self) -> (f32, f32);

    /// Maps every value of a slice.
    fn map_scalars(&self, values: &[f32]) -> Vec<Vec3> {
        values.iter().map(|&x| self.map_value(x)).collect()
    }
}

/// Evaluates a sorted list of `(x, value)` control points with linear
/// interpolation, clamping outside the first and last point.
fn piecewise<T>(points: &[(f32, T)], x: f32, lerp: impl Fn(T, T, f32) -> T) -> Option<T>
where
    T: Copy,
{
    let (first, last) = (points.first()?, points.last()?);
    if x.is_nan() || x <= first.0 {
        return Some(first.1);
    }
    if x >= last.0 {
        return Some(last.1);
    }
    let hi = points.partition_point(|(px, _)| *px <= x);
    let (x0, v0) = points[hi - 1];
    let (x1, v1) = points[hi];
    let span = x1 - x0;
    if span <= 0.0 {
        return Some(v1);
    }
    Some(lerp(v0, v1, (x - x0) / span))
}

/// Inserts a control point keeping the list sorted by `x`. An existing point
/// at the same `x` is replaced.
fn insert_sorted<T>(points: &mut Vec<(f32, T)>, x: f32, value: T) {
    match points.iter().position(|(px, _)| *px >= x) {
        Some(i) if points[i].0 == x => points[i].1 = value,
        Some(i) => points.insert(i, (x, value)),
        None => points.push((x, value)),
    }
}

/// Piecewise-linear RGB transfer function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorTransferFunction {
    points: Vec<(f32, Vec3)>,
}

impl ColorTransferFunction {
    /// Creates an empty function (maps everything to black).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a control point.
    pub fn add_rgb_point(&mut self, x: f32, r: f32, g: f32, b: f32) {
        insert_sorted(&mut self.points, x, Vec3::new(r, g, b));
    }

    /// Removes every control point.
    pub fn remove_all_points(&mut self) {
        self.points.clear();
    }

    /// Number of control points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if there are no control points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl ScalarsToColors for ColorTransferFunction {
    fn map_value(&self, x: f32) -> Vec3 {
        piecewise(&self.points, x, Vec3::lerp).unwrap_or(Vec3::ZERO)
    }

    fn range(&self) -> (f32, f32) {
        match (self.points.first(), self.points.last()) {
            (Some(a), Some(b)) => (a.0, b.0),
            _ => (0.0, 0.0),
        }
    }
}

/// Piecewise-linear scalar function, used for opacity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PiecewiseFunction {
    points: Vec<(f32, f32)>,
}

impl PiecewiseFunction {
    /// Creates an empty function (evaluates to zero).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a control point.
    pub fn add_point(&mut self, x: f32, y: f32) {
        insert_sorted(&mut self.points, x, y);
    }

    /// Evaluates the function.
    #[must_use]
    pub fn value(&self, x: f32) -> f32 {
        piecewise(&self.points, x, |a, b, t| a + (b - a) * t).unwrap_or(0.0)
    }

    /// Range covered by the control points.
    #[must_use]
    pub fn range(&self) -> Option<(f32, f32)> {
        Some((self.points.first()?.0, self.points.last()?.0))
    }
}

/// Linear ramp through HSV space over a scalar range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookupTable {
    /// Scalar range mapped onto the table.
    pub range: (f32, f32),
    /// Hue at the low and high end of the range.
    pub hue_range: (f32, f32),
    /// Saturation at the low and high end.
    pub saturation_range: (f32, f32),
    /// Value at the low and high end.
    pub value_range: (f32, f32),
    /// Number of discrete colors.
    pub number_of_colors: usize,
}

impl Default for LookupTable {
    /// Red at the low end through to blue at the high end.
    fn default() -> Self {
        Self {
            range: (0.0, 1.0),
            hue_range: (0.0, 0.6667),
            saturation_range: (1.0, 1.0),
            value_range: (1.0, 1.0),
            number_of_colors: 256,
        }
    }
}

impl LookupTable {
    /// A default table over `range`.
    #[must_use]
    pub fn with_range(lo: f32, hi: f32) -> Self {
        Self {
            range: (lo, hi),
            ..Self::default()
        }
    }

    /// Index of the table entry for `x`.
    #[must_use]
    pub fn index(&self, x: f32) -> usize {
        let n = self.number_of_colors.max(1);
        let (lo, hi) = self.range;
        let t = if hi > lo { (x - lo) / (hi - lo) } else { 0.0 };
        if t.is_nan() {
            return 0;
        }
        ((t.clamp(0.0, 1.0) * n as f32) as usize).min(n - 1)
    }

    /// Color of table entry `i`.
    #[must_use]
    pub fn entry(&self, i: usize) -> Vec3 {
        let n = self.number_of_colors.max(1);
        let t = if n > 1 { i as f32 / (n - 1) as f32 } else { 0.0 };
        let mix = |(a, b): (f32, f32)| a + (b - a) * t;
        hsv_to_rgb(
            mix(self.hue_range),
            mix(self.saturation_range),
            mix(self.value_range),
        )
    }
}

impl ScalarsToColors for LookupTable {
    fn map_value(&self, x: f32) -> Vec3 {
        self.entry(self.index(x))
    }

    fn range(&self) -> (f32, f32) {
        self.range
    }
}

/// Converts HSV (all components in `[0, 1]`) to RGB.
#[must_use]
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let h6 = h.rem_euclid(1.0) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;
    let (p, q, t) = (v * (1.0 - s), v * (1.0 - s * f), v * (1.0 - s * (1.0 - f)));
    match sector as u32 {
        0 => Vec3::new(v, t, p),
        1 => Vec3::new(q, v, p),
        2 => Vec3::new(p, v, t),
        3 => Vec3::new(p, q, v),
        4 => Vec3::new(t, p, v),
        _ => Vec3::new(v, p, q),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_color_interpolation_and_clamping() {
        let mut ctf = ColorTransferFunction::new();
        ctf.add_rgb_point(255.0, 0.0, 0.0, 1.0);
        ctf.add_rgb_point(0.0, 1.0, 0.0, 0.0);
        assert_eq!(ctf.range(), (0.0, 255.0));
        assert_eq!(ctf.map_value(-10.0), Vec3::X);
        assert_eq!(ctf.map_value(300.0), Vec3::Z);
        let mid = ctf.map_value(127.5);
        assert!((mid - Vec3::new(0.5, 0.0, 0.5)).length() < 1e-6);
    }

    #[test]
    fn test_replacing_a_point() {
        let mut otf = PiecewiseFunction::new();
        otf.add_point(0.0, 0.0);
        otf.add_point(255.0, 0.2);
        otf.add_point(255.0, 0.4);
        assert_eq!(otf.value(255.0), 0.4);
        assert!((otf.value(127.5) - 0.2).abs() < 1e-6);
        assert_eq!(PiecewiseFunction::new().value(1.0), 0.0);
    }

    #[test]
    fn test_lookup_table_red_to_blue() {
        let lut = LookupTable::with_range(1.5, 4.5);
        assert!((lut.map_value(1.5) - Vec3::X).length() < 1e-5);
        let high = lut.map_value(4.5);
        assert!(high.z > 0.99 && high.x < 0.01 && high.y < 0.01);
        assert_eq!(lut.index(f32::NAN), 0);
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Vec3::X);
        assert!((hsv_to_rgb(1.0 / 3.0, 1.0, 1.0) - Vec3::Y).length() < 1e-5);
        assert_eq!(hsv_to_rgb(0.5, 0.0, 0.5), Vec3::splat(0.5));
    }

    proptest! {
        #[test]
        fn prop_piecewise_stays_within_control_values(
            ys in proptest::collection::vec(0.0f32..1.0, 2..8),
            x in -10.0f32..20.0,
        ) {
            let mut f = PiecewiseFunction::new();
            for (i, y) in ys.iter().enumerate() {
                f.add_point(i as f32, *y);
            }
            let lo = ys.iter().copied().fold(f32::MAX, f32::min);
            let hi = ys.iter().copied().fold(f32::MIN, f32::max);
            let v = f.value(x);
            prop_assert!(v >= lo - 1e-6 && v <= hi + 1e-6);
        }

        #[test]
        fn prop_lookup_index_in_bounds(x in proptest::num::f32::ANY) {
            let lut = LookupTable::with_range(-1.0, 1.0);
            prop_assert!(lut.index(x) < lut.number_of_colors);
        }
    }
}
