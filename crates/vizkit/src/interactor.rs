//! The interactor: opens the window and runs the event loop.

use winit::event_loop::EventLoop;
use winit::keyboard::KeyCode;

use crate::app::App;
use crate::error::Result;
use crate::plane_widget::{PlaneWidget, WidgetMotion};
use crate::property::Representation;
use crate::render_window::RenderWindow;
use crate::renderer::Renderer;
use crate::style::InteractorStyle;

/// What a key press does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum KeyAction {
    ResetCamera,
    SetRepresentation(Representation),
    SetStyle(InteractorStyle),
    Widget(WidgetMotion),
    Quit,
}

/// Default key bindings.
pub(crate) fn key_action(key: KeyCode) -> Option<KeyAction> {
    let action = match key {
        KeyCode::KeyR => KeyAction::ResetCamera,
        KeyCode::KeyW => KeyAction::SetRepresentation(Representation::Wireframe),
        KeyCode::KeyS => KeyAction::SetRepresentation(Representation::Surface),
        KeyCode::KeyT => KeyAction::SetStyle(InteractorStyle::TrackballCamera),
        KeyCode::KeyJ => KeyAction::SetStyle(InteractorStyle::JoystickCamera),
        KeyCode::KeyQ | KeyCode::KeyE | KeyCode::Escape => KeyAction::Quit,
        KeyCode::PageUp => KeyAction::Widget(WidgetMotion::Push(1.0)),
        KeyCode::PageDown => KeyAction::Widget(WidgetMotion::Push(-1.0)),
        KeyCode::ArrowLeft => KeyAction::Widget(WidgetMotion::TiltU(-1.0)),
        KeyCode::ArrowRight => KeyAction::Widget(WidgetMotion::TiltU(1.0)),
        KeyCode::ArrowUp => KeyAction::Widget(WidgetMotion::TiltV(1.0)),
        KeyCode::ArrowDown => KeyAction::Widget(WidgetMotion::TiltV(-1.0)),
        _ => return None,
    };
    Some(action)
}

/// Applies a scene-level key action. Returns false for actions the scene
/// does not handle (style changes, widget motion, quitting).
pub(crate) fn apply_scene_action(action: KeyAction, renderer: &mut Renderer) -> bool {
    match action {
        KeyAction::ResetCamera => {
            renderer.reset_camera();
            true
        }
        KeyAction::SetRepresentation(rep) => {
            for (_, actor) in renderer.actors_mut() {
                actor.property_mut().representation = rep;
            }
            log::debug!("representation set to {rep:?}");
            true
        }
        KeyAction::SetStyle(_) | KeyAction::Widget(_) | KeyAction::Quit => false,
    }
}

/// Owns a [`RenderWindow`], its interaction style and an optional plane
/// widget. [`RenderWindowInteractor::start`] opens the window and blocks
/// until it is closed.
///
/// Keys: `r` reset camera, `w`/`s` wireframe/surface, `t`/`j` trackball or
/// joystick style, `q`/`e`/Escape quit. With a plane widget, PageUp and
/// PageDown push the plane and the arrow keys tilt it.
#[derive(Debug)]
pub struct RenderWindowInteractor {
    render_window: RenderWindow,
    style: InteractorStyle,
    plane_widget: Option<PlaneWidget>,
}

impl RenderWindowInteractor {
    /// Creates an interactor for `render_window` with the trackball style.
    #[must_use]
    pub fn new(render_window: RenderWindow) -> Self {
        Self {
            render_window,
            style: InteractorStyle::default(),
            plane_widget: None,
        }
    }

    /// Sets the interaction style.
    pub fn set_interactor_style(&mut self, style: InteractorStyle) {
        self.style = style;
    }

    /// The interaction style.
    #[must_use]
    pub fn interactor_style(&self) -> InteractorStyle {
        self.style
    }

    /// Attaches a plane widget.
    pub fn set_plane_widget(&mut self, widget: PlaneWidget) {
        self.plane_widget = Some(widget);
    }

    /// The plane widget, if attached.
    pub fn plane_widget_mut(&mut self) -> Option<&mut PlaneWidget> {
        self.plane_widget.as_mut()
    }

    /// The window.
    pub fn render_window_mut(&mut self) -> &mut RenderWindow {
        &mut self.render_window
    }

    /// Shorthand for the window's renderer.
    pub fn renderer_mut(&mut self) -> &mut Renderer {
        self.render_window.renderer_mut()
    }

    /// Opens the window and runs the event loop until the window closes.
    pub fn start(self) -> Result<()> {
        let _ = env_logger::try_init();
        let event_loop = EventLoop::new()?;
        let (renderer, size, title, vsync) = self.render_window.into_parts();
        let mut app = App::new(renderer, size, title, vsync, self.style, self.plane_widget);
        log::info!("starting event loop");
        event_loop.run_app(&mut app)?;
        match app.take_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl From<RenderWindow> for RenderWindowInteractor {
    fn from(render_window: RenderWindow) -> Self {
        Self::new(render_window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Actor;
    use vizkit_core::SphereSource;

    #[test]
    fn test_key_bindings() {
        assert_eq!(key_action(KeyCode::KeyR), Some(KeyAction::ResetCamera));
        assert_eq!(key_action(KeyCode::Escape), Some(KeyAction::Quit));
        assert_eq!(key_action(KeyCode::KeyE), Some(KeyAction::Quit));
        assert_eq!(
            key_action(KeyCode::KeyJ),
            Some(KeyAction::SetStyle(InteractorStyle::JoystickCamera))
        );
        assert_eq!(
            key_action(KeyCode::PageDown),
            Some(KeyAction::Widget(WidgetMotion::Push(-1.0)))
        );
        assert_eq!(key_action(KeyCode::KeyZ), None);
    }

    #[test]
    fn test_wireframe_key_changes_every_actor() {
        let mut renderer = Renderer::new();
        let a = renderer.add_actor(Actor::from_poly_data(SphereSource::default().output()));
        let b = renderer.add_actor(Actor::from_poly_data(SphereSource::default().output()));
        let action = key_action(KeyCode::KeyW).unwrap();
        assert!(apply_scene_action(action, &mut renderer));
        for id in [a, b] {
            assert_eq!(
                renderer.actor(id).unwrap().property().representation,
                Representation::Wireframe
            );
        }
        assert!(!apply_scene_action(KeyAction::Quit, &mut renderer));
    }

    #[test]
    fn test_reset_key_places_camera() {
        let mut renderer = Renderer::new();
        renderer.add_actor(Actor::from_poly_data(SphereSource::new(glam::Vec3::splat(3.0), 1.0).output()));
        apply_scene_action(KeyAction::ResetCamera, &mut renderer);
        assert!((renderer.camera().focal_point - glam::Vec3::splat(3.0)).length() < 1e-4);
    }
}
