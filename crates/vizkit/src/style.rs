//! Mouse-driven camera interaction styles.
//!
//! Both styles rotate with the left button, pan with the middle button (or
//! shift + left) and dolly with the right button or the wheel. The trackball
//! style moves the camera by the distance the mouse travels; the joystick
//! style keeps moving while a button is held, at a rate set by the cursor's
//! offset from the window center.

#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use vizkit_render::Camera;

/// Degrees of rotation per window width of mouse travel (trackball) or per
/// second at the window edge (joystick, before scaling).
const MOTION_FACTOR: f32 = 10.0;
/// Base of the exponential dolly.
const DOLLY_BASE: f32 = 1.1;
/// Joystick updates per second the rates are expressed in.
const JOYSTICK_RATE: f32 = 100.0;

/// What a held button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMotion {
    /// Orbit around the focal point.
    Rotate,
    /// Translate in the view plane.
    Pan,
    /// Move toward or away from the focal point.
    Dolly,
}

/// Camera interaction style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InteractorStyle {
    /// Motion follows mouse movement.
    #[default]
    TrackballCamera,
    /// Motion continues while a button is held.
    JoystickCamera,
}

impl InteractorStyle {
    /// Applies a mouse drag of `(dx, dy)` pixels (y down) in a viewport of
    /// `size` pixels. Does nothing for the joystick style.
    pub fn drag(self, camera: &mut Camera, motion: CameraMotion, delta: (f32, f32), size: (u32, u32)) {
        if self != Self::TrackballCamera {
            return;
        }
        let (w, h) = (size.0.max(1) as f32, size.1.max(1) as f32);
        let (dx, dy) = delta;
        match motion {
            CameraMotion::Rotate => {
                camera.azimuth(-dx * 20.0 / w * MOTION_FACTOR);
                camera.elevation(dy * 20.0 / h * MOTION_FACTOR);
                camera.orthogonalize_view_up();
            }
            CameraMotion::Pan => camera.pan(-dx / h, dy / h),
            CameraMotion::Dolly => {
                // Dragging up moves in.
                let amount = -dy * MOTION_FACTOR / (h * 0.5);
                camera.dolly(DOLLY_BASE.powf(amount));
            }
        }
    }

    /// Advances a held joystick motion by `dt` seconds. `offset` is the
    /// cursor position relative to the window center in pixels (y down).
    /// Does nothing for the trackball style.
    pub fn hold(self, camera: &mut Camera, motion: CameraMotion, offset: (f32, f32), size: (u32, u32), dt: f32) {
        if self != Self::JoystickCamera {
            return;
        }
        let (w, h) = (size.0.max(1) as f32, size.1.max(1) as f32);
        let (ox, oy) = offset;
        let ticks = dt * JOYSTICK_RATE;
        match motion {
            CameraMotion::Rotate => {
                camera.azimuth(-ox * 20.0 / w * ticks);
                camera.elevation(oy * 20.0 / h * ticks);
                camera.orthogonalize_view_up();
            }
            CameraMotion::Pan => camera.pan(-ox / h * 0.1 * ticks, oy / h * 0.1 * ticks),
            CameraMotion::Dolly => {
                let amount = -oy / (h * 0.5) * 0.5 * ticks;
                camera.dolly(DOLLY_BASE.powf(amount));
            }
        }
    }

    /// Applies `lines` wheel notches (positive away from the user).
    pub fn wheel(self, camera: &mut Camera, lines: f32) {
        camera.dolly(DOLLY_BASE.powf(MOTION_FACTOR * 0.2 * lines));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use glam::Vec3;

    fn camera() -> Camera {
        let mut c = Camera::default();
        c.position = Vec3::new(0.0, 0.0, 10.0);
        c
    }

    #[test]
    fn test_trackball_drag_right_orbits_left() {
        let mut c = camera();
        InteractorStyle::TrackballCamera.drag(&mut c, CameraMotion::Rotate, (40.0, 0.0), (800, 800));
        assert!(c.position.x < 0.0);
        assert!((c.distance() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_trackball_dolly_up_moves_in() {
        let mut c = camera();
        InteractorStyle::TrackballCamera.drag(&mut c, CameraMotion::Dolly, (0.0, -40.0), (800, 800));
        assert!(c.distance() < 10.0);
    }

    #[test]
    fn test_trackball_ignores_hold() {
        let mut c = camera();
        InteractorStyle::TrackballCamera.hold(&mut c, CameraMotion::Rotate, (400.0, 0.0), (800, 800), 1.0);
        assert_eq!(c, camera());
    }

    #[test]
    fn test_joystick_rotates_while_held() {
        let mut c = camera();
        let style = InteractorStyle::JoystickCamera;
        style.drag(&mut c, CameraMotion::Rotate, (100.0, 0.0), (800, 800));
        assert_eq!(c, camera());
        style.hold(&mut c, CameraMotion::Rotate, (400.0, 0.0), (800, 800), 0.01);
        // Edge of the window: 10 degrees per tick.
        let angle = c.position.x.atan2(c.position.z).to_degrees();
        assert!((angle + 10.0).abs() < 1e-2);
    }

    #[test]
    fn test_wheel_forward_moves_in() {
        let mut c = camera();
        InteractorStyle::TrackballCamera.wheel(&mut c, 1.0);
        assert!((c.distance() - 10.0 / 1.1_f32.powi(2)).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_wheel_forward_then_back_restores_distance(lines in -5.0f32..5.0) {
            let mut c = camera();
            let style = InteractorStyle::TrackballCamera;
            style.wheel(&mut c, lines);
            style.wheel(&mut c, -lines);
            prop_assert!((c.distance() - 10.0).abs() < 1e-3);
        }

        #[test]
        fn prop_rotate_keeps_focal_distance(dx in -200.0f32..200.0, dy in -200.0f32..200.0) {
            let mut c = camera();
            InteractorStyle::TrackballCamera.drag(&mut c, CameraMotion::Rotate, (dx, dy), (800, 600));
            prop_assert!((c.distance() - 10.0).abs() < 1e-3);
            prop_assert_eq!(c.focal_point, Vec3::ZERO);
        }
    }
}
