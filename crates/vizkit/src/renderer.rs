//! The renderer: scene contents, background, camera and render observers.

use std::fmt;

use glam::Vec3;
use vizkit_core::Bounds;
use vizkit_render::Camera;

use crate::actor::Actor;
use crate::volume::Volume;

/// Handle to an actor added to a [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub(crate) usize);

/// Handle to a volume added to a [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VolumeId(pub(crate) usize);

/// Events fired around every rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderEvent {
    /// Before the frame is drawn; changes made here show in the frame.
    Start,
    /// After the frame is presented.
    End,
}

type Observer = Box<dyn FnMut(&mut Renderer)>;

/// Holds everything drawn in a window.
pub struct Renderer {
    actors: Vec<Option<Actor>>,
    volumes: Vec<Option<Volume>>,
    background: Vec3,
    camera: Camera,
    camera_set: bool,
    observers: Vec<(RenderEvent, Observer)>,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("actors", &self.actors().count())
            .field("volumes", &self.volumes().count())
            .field("background", &self.background)
            .field("camera", &self.camera)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Creates an empty renderer with a black background.
    #[must_use]
    pub fn new() -> Self {
        Self {
            actors: Vec::new(),
            volumes: Vec::new(),
            background: Vec3::ZERO,
            camera: Camera::default(),
            camera_set: false,
            observers: Vec::new(),
        }
    }

    /// Adds an actor.
    pub fn add_actor(&mut self, actor: Actor) -> ActorId {
        self.actors.push(Some(actor));
        ActorId(self.actors.len() - 1)
    }

    /// Removes an actor, returning it.
    pub fn remove_actor(&mut self, id: ActorId) -> Option<Actor> {
        self.actors.get_mut(id.0)?.take()
    }

    /// Looks up an actor.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id.0)?.as_ref()
    }

    /// Looks up an actor for modification.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id.0)?.as_mut()
    }

    /// All actors with their handles.
    pub fn actors(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.actors
            .iter()
            .enumerate()
            .filter_map(|(i, a)| Some((ActorId(i), a.as_ref()?)))
    }

    /// All actors, mutably.
    pub fn actors_mut(&mut self) -> impl Iterator<Item = (ActorId, &mut Actor)> {
        self.actors
            .iter_mut()
            .enumerate()
            .filter_map(|(i, a)| Some((ActorId(i), a.as_mut()?)))
    }

    /// Adds a volume.
    pub fn add_volume(&mut self, volume: Volume) -> VolumeId {
        self.volumes.push(Some(volume));
        VolumeId(self.volumes.len() - 1)
    }

    /// Removes a volume, returning it.
    pub fn remove_volume(&mut self, id: VolumeId) -> Option<Volume> {
        self.volumes.get_mut(id.0)?.take()
    }

    /// Looks up a volume.
    #[must_use]
    pub fn volume(&self, id: VolumeId) -> Option<&Volume> {
        self.volumes.get(id.0)?.as_ref()
    }

    /// Looks up a volume for modification.
    pub fn volume_mut(&mut self, id: VolumeId) -> Option<&mut Volume> {
        self.volumes.get_mut(id.0)?.as_mut()
    }

    /// All volumes with their handles.
    pub fn volumes(&self) -> impl Iterator<Item = (VolumeId, &Volume)> {
        self.volumes
            .iter()
            .enumerate()
            .filter_map(|(i, v)| Some((VolumeId(i), v.as_ref()?)))
    }

    /// Background color.
    #[must_use]
    pub fn background(&self) -> Vec3 {
        self.background
    }

    /// Sets the background color.
    pub fn set_background(&mut self, r: f32, g: f32, b: f32) {
        self.background = Vec3::new(r, g, b);
    }

    /// The active camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The active camera, for modification. A camera touched before the
    /// first frame is not reset automatically.
    pub fn camera_mut(&mut self) -> &mut Camera {
        self.camera_set = true;
        &mut self.camera
    }

    /// Whether the camera has been placed, explicitly or by a reset.
    #[must_use]
    pub fn is_camera_set(&self) -> bool {
        self.camera_set
    }

    /// Bounds of everything visible.
    #[must_use]
    pub fn visible_bounds(&self) -> Bounds {
        let actors = self
            .actors()
            .filter(|(_, a)| a.visibility())
            .map(|(_, a)| a.bounds());
        let volumes = self
            .volumes()
            .filter(|(_, v)| v.visibility())
            .map(|(_, v)| v.bounds());
        actors
            .chain(volumes)
            .fold(Bounds::EMPTY, |acc, b| acc.union(&b))
    }

    /// Points the camera at the visible bounds, keeping its view direction.
    pub fn reset_camera(&mut self) {
        let bounds = self.visible_bounds();
        self.camera.reset(&bounds);
        self.camera_set = true;
    }

    /// Registers a callback for `event`. Callbacks run in registration order
    /// and may modify the renderer.
    pub fn add_observer(&mut self, event: RenderEvent, callback: impl FnMut(&mut Renderer) + 'static) {
        self.observers.push((event, Box::new(callback)));
    }

    /// Runs the callbacks registered for `event`.
    pub fn invoke(&mut self, event: RenderEvent) {
        let mut observers = std::mem::take(&mut self.observers);
        for (e, callback) in &mut observers {
            if *e == event {
                callback(self);
            }
        }
        // Keep observers registered from inside a callback.
        observers.append(&mut self.observers);
        self.observers = observers;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use vizkit_core::SphereSource;

    #[test]
    fn test_add_remove_actor() {
        let mut renderer = Renderer::new();
        let a = renderer.add_actor(Actor::default());
        let b = renderer.add_actor(Actor::default());
        assert!(renderer.remove_actor(a).is_some());
        assert!(renderer.actor(a).is_none());
        assert!(renderer.remove_actor(a).is_none());
        assert_eq!(renderer.actors().map(|(id, _)| id).collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn test_visible_bounds_skip_hidden() {
        let mut renderer = Renderer::new();
        renderer.add_actor(Actor::from_poly_data(SphereSource::new(Vec3::ZERO, 1.0).output()));
        let far = renderer.add_actor(Actor::from_poly_data(
            SphereSource::new(Vec3::splat(10.0), 1.0).output(),
        ));
        assert!(renderer.visible_bounds().max.x > 10.0);
        renderer.actor_mut(far).unwrap().set_visibility(false);
        assert!(renderer.visible_bounds().max.x <= 1.0 + 1e-5);
    }

    #[test]
    fn test_reset_camera_marks_camera_set() {
        let mut renderer = Renderer::new();
        renderer.add_actor(Actor::from_poly_data(SphereSource::default().output()));
        assert!(!renderer.is_camera_set());
        renderer.reset_camera();
        assert!(renderer.is_camera_set());
        assert_eq!(renderer.camera().focal_point, Vec3::ZERO);
    }

    #[test]
    fn test_observers_filter_by_event_and_can_modify() {
        let mut renderer = Renderer::new();
        let ends = Rc::new(Cell::new(0));
        let counter = ends.clone();
        renderer.add_observer(RenderEvent::Start, |r| r.camera_mut().azimuth(1.0));
        renderer.add_observer(RenderEvent::End, move |_| counter.set(counter.get() + 1));

        let before = renderer.camera().position;
        renderer.invoke(RenderEvent::Start);
        assert_ne!(renderer.camera().position, before);
        assert_eq!(ends.get(), 0);
        renderer.invoke(RenderEvent::End);
        renderer.invoke(RenderEvent::End);
        assert_eq!(ends.get(), 2);
    }

    #[test]
    fn test_observer_added_during_invoke_is_kept() {
        let mut renderer = Renderer::new();
        renderer.add_observer(RenderEvent::Start, |r| {
            r.set_background(1.0, 1.0, 1.0);
        });
        renderer.add_observer(RenderEvent::End, |r| {
            r.add_observer(RenderEvent::Start, |r| r.set_background(0.5, 0.5, 0.5));
        });
        renderer.invoke(RenderEvent::End);
        renderer.invoke(RenderEvent::Start);
        assert_eq!(renderer.background(), Vec3::splat(0.5));
    }
}
