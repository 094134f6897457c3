//! Camera and view management.
//!
//! The camera is described by a position, a focal point and a view-up
//! vector. Interaction moves the position around the focal point; the view
//! direction is always from the position toward the focal point.

use glam::{Mat4, Quat, Vec3};
use vizkit_core::Bounds;

/// A perspective camera looking at a focal point.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera looks at.
    pub focal_point: Vec3,
    /// Up direction. Kept orthogonal to the view direction by the
    /// interaction methods.
    pub view_up: Vec3,
    /// Vertical field of view in degrees.
    pub view_angle: f32,
    /// Near and far clipping distances along the view direction.
    pub clipping_range: (f32, f32),
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::Z,
            focal_point: Vec3::ZERO,
            view_up: Vec3::Y,
            view_angle: 30.0,
            clipping_range: (0.01, 1000.01),
        }
    }
}

impl Camera {
    /// Creates a camera with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Distance from the position to the focal point.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.position.distance(self.focal_point)
    }

    /// Unit vector from the position toward the focal point.
    #[must_use]
    pub fn direction_of_projection(&self) -> Vec3 {
        (self.focal_point - self.position).normalize_or(Vec3::NEG_Z)
    }

    /// Unit vector pointing to the right of the view.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.direction_of_projection()
            .cross(self.view_up)
            .normalize_or(Vec3::X)
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.focal_point, self.view_up)
    }

    /// Returns the projection matrix for a viewport aspect ratio.
    #[must_use]
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        let (near, far) = self.clipping_range;
        Mat4::perspective_rh(
            self.view_angle.to_radians(),
            aspect_ratio.max(1e-6),
            near,
            far,
        )
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        self.projection_matrix(aspect_ratio) * self.view_matrix()
    }

    /// Rotates the position about the view-up axis through the focal point.
    pub fn azimuth(&mut self, degrees: f32) {
        let rot = Quat::from_axis_angle(self.view_up.normalize_or(Vec3::Y), degrees.to_radians());
        self.position = self.focal_point + rot * (self.position - self.focal_point);
    }

    /// Rotates the position about the right axis through the focal point.
    pub fn elevation(&mut self, degrees: f32) {
        let axis = self.right();
        // Positive elevation moves the camera up, so rotate about -right.
        let rot = Quat::from_axis_angle(-axis, degrees.to_radians());
        self.position = self.focal_point + rot * (self.position - self.focal_point);
        self.view_up = rot * self.view_up;
        self.orthogonalize_view_up();
    }

    /// Trackball rotation: `dx` degrees of azimuth and `dy` of elevation.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.azimuth(dx);
        self.elevation(dy);
    }

    /// Makes `view_up` perpendicular to the view direction.
    pub fn orthogonalize_view_up(&mut self) {
        let dir = self.direction_of_projection();
        let up = self.view_up - dir * self.view_up.dot(dir);
        self.view_up = up.normalize_or(dir.any_orthonormal_vector());
    }

    /// Moves position and focal point in the view plane.
    ///
    /// `dx` and `dy` are fractions of the viewport height at the focal
    /// distance, so a drag across the full window height pans by exactly the
    /// visible height.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let visible_height = 2.0 * self.distance() * (self.view_angle.to_radians() * 0.5).tan();
        let offset = (self.right() * dx + self.view_up * dy) * visible_height;
        self.position += offset;
        self.focal_point += offset;
    }

    /// Moves the position toward the focal point; factors above 1 move
    /// closer, below 1 move away.
    pub fn dolly(&mut self, factor: f32) {
        if factor <= 0.0 {
            return;
        }
        let distance = self.distance() / factor;
        self.position = self.focal_point - self.direction_of_projection() * distance;
    }

    /// Places the camera so that the bounding sphere of `bounds` fills the
    /// view, keeping the current view direction and view-up.
    pub fn reset(&mut self, bounds: &Bounds) {
        if bounds.is_empty() {
            log::debug!("camera reset skipped: empty bounds");
            return;
        }
        let center = bounds.center();
        let mut radius = bounds.diagonal() * 0.5;
        if radius <= 0.0 {
            radius = 0.5;
        }
        let distance = radius / (self.view_angle.to_radians() * 0.5).sin();
        let dir = self.direction_of_projection();
        self.focal_point = center;
        self.position = center - dir * distance;
        self.orthogonalize_view_up();
        self.reset_clipping_range(bounds);
        log::info!("camera reset: focal point {center}, distance {distance}");
    }

    /// Fits the clipping range tightly around `bounds`.
    pub fn reset_clipping_range(&mut self, bounds: &Bounds) {
        if bounds.is_empty() {
            return;
        }
        let dir = self.direction_of_projection();
        let (mut near, mut far) = bounds
            .corners()
            .iter()
            .map(|c| (*c - self.position).dot(dir))
            .fold((f32::MAX, f32::MIN), |(lo, hi), d| (lo.min(d), hi.max(d)));
        // Pad so geometry on the box faces is not clipped.
        let pad = (far - near).max(1e-3) * 0.01;
        near -= pad;
        far += pad;
        let min_near = far * 1e-3;
        self.clipping_range = (near.max(min_near), far.max(min_near * 2.0));
    }
}
