//! Mapping polygonal data to renderable geometry.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;
use vizkit_core::{LookupTable, PolyData, ScalarsToColors};

static CLOCK: AtomicU64 = AtomicU64::new(0);

/// Next tick of the process-wide modification clock. Every tick is larger
/// than all earlier ones, so stamps from different objects compare.
pub(crate) fn next_generation() -> u64 {
    CLOCK.fetch_add(1, Ordering::Relaxed) + 1
}

/// Maps a [`PolyData`] to colored primitives.
///
/// When scalar visibility is on and the input carries point scalars, points
/// are colored through the lookup table; otherwise the actor's property
/// color is used.
#[derive(Clone)]
pub struct PolyDataMapper {
    input: PolyData,
    scalar_visibility: bool,
    scalar_range: Option<(f32, f32)>,
    lookup_table: Option<Rc<dyn ScalarsToColors>>,
    vertex_attributes: BTreeMap<String, String>,
    generation: u64,
}

impl fmt::Debug for PolyDataMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolyDataMapper")
            .field("points", &self.input.num_points())
            .field("cells", &self.input.num_cells())
            .field("scalar_visibility", &self.scalar_visibility)
            .field("scalar_range", &self.scalar_range)
            .field("custom_lookup_table", &self.lookup_table.is_some())
            .field("vertex_attributes", &self.vertex_attributes)
            .finish_non_exhaustive()
    }
}

impl Default for PolyDataMapper {
    fn default() -> Self {
        Self::new(PolyData::new())
    }
}

impl PolyDataMapper {
    /// Creates a mapper for `input`.
    #[must_use]
    pub fn new(input: PolyData) -> Self {
        Self {
            input,
            scalar_visibility: true,
            scalar_range: None,
            lookup_table: None,
            vertex_attributes: BTreeMap::new(),
            generation: 0,
        }
    }

    /// The input dataset.
    #[must_use]
    pub fn input(&self) -> &PolyData {
        &self.input
    }

    /// Replaces the input dataset.
    pub fn set_input(&mut self, input: PolyData) {
        self.input = input;
        self.generation = next_generation();
    }

    /// Whether point scalars drive the colors.
    #[must_use]
    pub fn scalar_visibility(&self) -> bool {
        self.scalar_visibility
    }

    /// Turns scalar coloring on or off.
    pub fn set_scalar_visibility(&mut self, visible: bool) {
        self.scalar_visibility = visible;
        self.generation = next_generation();
    }

    /// Range mapped onto the default lookup table. Without one the range of
    /// the input scalars is used.
    pub fn set_scalar_range(&mut self, lo: f32, hi: f32) {
        self.scalar_range = Some((lo, hi));
        self.generation = next_generation();
    }

    /// Scalar range used for coloring, if there are scalars to color.
    #[must_use]
    pub fn scalar_range(&self) -> Option<(f32, f32)> {
        self.scalar_range.or_else(|| self.input.scalar_range())
    }

    /// Uses `table` instead of the default lookup table. The table maps
    /// scalars in its own coordinates; the mapper's scalar range does not
    /// rescale it.
    pub fn set_lookup_table(&mut self, table: impl ScalarsToColors + 'static) {
        self.lookup_table = Some(Rc::new(table));
        self.generation = next_generation();
    }

    /// Binds the input array `array` to the shader vertex attribute
    /// `attribute` (e.g. `"radiusAttrib"` to `"radii"` for sphere programs).
    pub fn map_data_array_to_vertex_attribute(
        &mut self,
        attribute: impl Into<String>,
        array: impl Into<String>,
    ) {
        self.vertex_attributes.insert(attribute.into(), array.into());
        self.generation = next_generation();
    }

    /// Values of the array bound to `attribute`, if both exist.
    #[must_use]
    pub fn vertex_attribute(&self, attribute: &str) -> Option<&[f32]> {
        let array = self.vertex_attributes.get(attribute)?;
        let values = self.input.point_data.array(array);
        if values.is_none() {
            log::warn!("vertex attribute '{attribute}' is bound to missing array '{array}'");
        }
        values
    }

    /// Per-point colors, or `None` when the property color applies.
    #[must_use]
    pub fn point_colors(&self) -> Option<Vec<Vec3>> {
        if !self.scalar_visibility {
            return None;
        }
        let scalars = self.input.point_data.scalars.as_deref()?;
        let colors = match &self.lookup_table {
            Some(table) => table.map_scalars(scalars),
            None => {
                let (lo, hi) = self.scalar_range()?;
                LookupTable::with_range(lo, hi).map_scalars(scalars)
            }
        };
        Some(colors)
    }

    /// Clock stamp of the latest modification.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vizkit_core::ColorTransferFunction;

    fn line_with_scalars() -> PolyData {
        let mut pd = PolyData::new();
        pd.points = vec![Vec3::ZERO, Vec3::X, Vec3::new(2.0, 0.0, 0.0)];
        pd.lines.push(vec![0, 1, 2]);
        pd.set_scalars(vec![0.0, 5.0, 10.0]).unwrap();
        pd
    }

    #[test]
    fn test_default_table_spans_data_range() {
        let mapper = PolyDataMapper::new(line_with_scalars());
        let colors = mapper.point_colors().unwrap();
        // Default table runs from red to blue.
        assert!(colors[0].x > 0.99 && colors[0].z < 0.01);
        assert!(colors[2].z > 0.99 && colors[2].x < 0.01);
    }

    #[test]
    fn test_scalar_range_overrides_data_range() {
        let mut mapper = PolyDataMapper::new(line_with_scalars());
        mapper.set_scalar_range(10.0, 20.0);
        let colors = mapper.point_colors().unwrap();
        assert_eq!(colors[0], colors[2]);
    }

    #[test]
    fn test_custom_table() {
        let mut ctf = ColorTransferFunction::new();
        ctf.add_rgb_point(0.0, 1.0, 0.0, 0.0);
        ctf.add_rgb_point(10.0, 0.0, 0.0, 1.0);
        let mut mapper = PolyDataMapper::new(line_with_scalars());
        mapper.set_lookup_table(ctf);
        let colors = mapper.point_colors().unwrap();
        assert_eq!(colors[1], Vec3::new(0.5, 0.0, 0.5));
    }

    #[test]
    fn test_scalar_visibility_off() {
        let mut mapper = PolyDataMapper::new(line_with_scalars());
        mapper.set_scalar_visibility(false);
        assert!(mapper.point_colors().is_none());
        assert!(PolyDataMapper::default().point_colors().is_none());
    }

    #[test]
    fn test_vertex_attribute_mapping() {
        let mut pd = line_with_scalars();
        pd.add_array("radii", vec![1.0, 2.0, 3.0]).unwrap();
        let mut mapper = PolyDataMapper::new(pd);
        assert!(mapper.vertex_attribute("radiusAttrib").is_none());
        let before = mapper.generation();
        mapper.map_data_array_to_vertex_attribute("radiusAttrib", "radii");
        assert!(mapper.generation() > before);
        assert_eq!(mapper.vertex_attribute("radiusAttrib"), Some(&[1.0, 2.0, 3.0][..]));
    }
}
