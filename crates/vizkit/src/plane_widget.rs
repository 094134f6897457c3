//! An interactive plane that produces a grid of seed points.
//!
//! The widget is driven from the keyboard: PageUp and PageDown push the
//! plane along its normal, the arrow keys tilt the normal. The first key
//! press of an interaction fires the start callbacks; releasing the key
//! fires the end callbacks with the new seed points.

use std::fmt;

use glam::{Quat, Vec3};
use vizkit_core::{Bounds, PlaneSource, PolyData};

use crate::renderer::Renderer;

/// Fraction of the placed diagonal moved per push.
const PUSH_FRACTION: f32 = 0.02;
/// Degrees per tilt.
const TILT_DEGREES: f32 = 5.0;

/// A single keyboard manipulation of a [`PlaneWidget`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidgetMotion {
    /// Move along the normal by this many steps (negative pushes back).
    Push(f32),
    /// Rotate the normal toward the plane's first axis by this many steps.
    TiltU(f32),
    /// Rotate the normal toward the plane's second axis by this many steps.
    TiltV(f32),
}

type StartCallback = Box<dyn FnMut(&mut Renderer)>;
type EndCallback = Box<dyn FnMut(&mut Renderer, &PolyData)>;

/// A plane placed over some data whose grid points are used as seeds.
pub struct PlaneWidget {
    source: PlaneSource,
    place_factor: f32,
    diagonal: f32,
    interacting: bool,
    enabled: bool,
    modified: u64,
    on_start: Vec<StartCallback>,
    on_end: Vec<EndCallback>,
}

impl fmt::Debug for PlaneWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaneWidget")
            .field("source", &self.source)
            .field("place_factor", &self.place_factor)
            .field("interacting", &self.interacting)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl Default for PlaneWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaneWidget {
    /// Creates an enabled widget with a unit plane facing +Z.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: PlaneSource::default(),
            place_factor: 0.5,
            diagonal: 1.0,
            interacting: false,
            enabled: true,
            modified: 0,
            on_start: Vec::new(),
            on_end: Vec::new(),
        }
    }

    /// Number of subdivisions per side; the seed grid has
    /// `(resolution + 1)^2` points.
    pub fn set_resolution(&mut self, resolution: u32) {
        self.source.x_resolution = resolution.max(1);
        self.source.y_resolution = resolution.max(1);
        self.modified += 1;
    }

    /// Subdivisions per side.
    #[must_use]
    pub fn resolution(&self) -> u32 {
        self.source.x_resolution
    }

    /// Scale applied to the bounds by [`PlaneWidget::place_widget`].
    pub fn set_place_factor(&mut self, factor: f32) {
        self.place_factor = factor;
    }

    /// Places the plane through the center of `bounds`, normal +Z, spanning
    /// the x and y extent scaled by the place factor.
    pub fn place_widget(&mut self, bounds: &Bounds) {
        if bounds.is_empty() {
            log::warn!("plane widget placed on empty bounds");
            return;
        }
        let placed = bounds.scaled(self.place_factor);
        let (c, e) = (placed.center(), placed.extent());
        let origin = Vec3::new(c.x - e.x * 0.5, c.y - e.y * 0.5, c.z);
        self.source.origin = origin;
        self.source.point1 = origin + Vec3::X * e.x;
        self.source.point2 = origin + Vec3::Y * e.y;
        self.diagonal = placed.diagonal().max(f32::EPSILON);
        self.modified += 1;
        log::debug!("plane widget placed at {c}, extent {e}");
    }

    /// Enables or disables keyboard manipulation and drawing.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.modified += 1;
    }

    /// Whether the widget is active.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Plane geometry.
    #[must_use]
    pub fn plane(&self) -> &PlaneSource {
        &self.source
    }

    /// Unit normal.
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.source.normal()
    }

    /// Center of the plane.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.source.center()
    }

    /// Seed points: the plane's grid points, one vertex cell each.
    #[must_use]
    pub fn poly_data(&self) -> PolyData {
        let mut seeds = self.source.output();
        seeds.polys.clear();
        seeds.verts = (0..seeds.num_points() as u32).collect();
        seeds
    }

    /// Drawable outline: the plane's grid as lines plus the normal.
    #[must_use]
    pub fn representation(&self) -> PolyData {
        let grid = self.source.output();
        let mut out = PolyData::new();
        out.points.clone_from(&grid.points);
        out.lines = grid.polygon_edges().into_iter().map(Vec::from).collect();
        let base = out.points.len() as u32;
        let c = self.center();
        out.points.push(c);
        out.points.push(c + self.normal() * self.diagonal * 0.25);
        out.lines.push(vec![base, base + 1]);
        out
    }

    /// Registers a callback fired when an interaction begins.
    pub fn on_start_interaction(&mut self, callback: impl FnMut(&mut Renderer) + 'static) {
        self.on_start.push(Box::new(callback));
    }

    /// Registers a callback fired when an interaction ends, with the new
    /// seed points.
    pub fn on_end_interaction(&mut self, callback: impl FnMut(&mut Renderer, &PolyData) + 'static) {
        self.on_end.push(Box::new(callback));
    }

    /// Whether an interaction is in progress.
    #[must_use]
    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    /// Applies one manipulation step, firing the start callbacks if this
    /// begins an interaction.
    pub fn manipulate(&mut self, motion: WidgetMotion, renderer: &mut Renderer) {
        if !self.enabled {
            return;
        }
        if !self.interacting {
            self.interacting = true;
            for callback in &mut self.on_start {
                callback(renderer);
            }
        }
        self.apply(motion);
    }

    /// Ends the current interaction, firing the end callbacks.
    pub fn end_interaction(&mut self, renderer: &mut Renderer) {
        if !self.interacting {
            return;
        }
        self.interacting = false;
        let seeds = self.poly_data();
        log::debug!("plane widget interaction ended: {} seeds", seeds.num_points());
        for callback in &mut self.on_end {
            callback(renderer, &seeds);
        }
    }

    fn apply(&mut self, motion: WidgetMotion) {
        let p = &mut self.source;
        match motion {
            WidgetMotion::Push(steps) => {
                let offset = p.normal() * (steps * PUSH_FRACTION * self.diagonal);
                p.origin += offset;
                p.point1 += offset;
                p.point2 += offset;
            }
            WidgetMotion::TiltU(steps) | WidgetMotion::TiltV(steps) => {
                let axis_dir = match motion {
                    WidgetMotion::TiltU(_) => p.point2 - p.origin,
                    _ => -(p.point1 - p.origin),
                };
                let axis = axis_dir.normalize_or_zero();
                if axis == Vec3::ZERO {
                    return;
                }
                let rot = Quat::from_axis_angle(axis, (steps * TILT_DEGREES).to_radians());
                let c = p.center();
                p.origin = c + rot * (p.origin - c);
                p.point1 = c + rot * (p.point1 - c);
                p.point2 = c + rot * (p.point2 - c);
            }
        }
        self.modified += 1;
    }

    /// Modification counter.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.modified
    }
}
