//! Application window and event loop management.

mod input;
mod render;

use std::sync::Arc;
use std::time::Instant;

use winit::keyboard::KeyCode;
use winit::window::Window;

use vizkit_render::RenderEngine;

use crate::error::Error;
use crate::plane_widget::PlaneWidget;
use crate::renderer::Renderer;
use crate::style::{CameraMotion, InteractorStyle};

/// State of a running interactor.
pub(crate) struct App {
    pub(super) window: Option<Arc<Window>>,
    pub(super) engine: Option<RenderEngine>,
    pub(super) renderer: Renderer,
    pub(super) plane_widget: Option<PlaneWidget>,
    pub(super) style: InteractorStyle,
    pub(super) size: (u32, u32),
    pub(super) title: String,
    pub(super) vsync: bool,
    pub(super) gpu: render::GpuScene,
    // Mouse state for camera control
    pub(super) mouse_pos: (f64, f64),
    pub(super) motion: Option<CameraMotion>,
    pub(super) shift_down: bool,
    // Widget key currently held, released to end the interaction
    pub(super) widget_key: Option<KeyCode>,
    pub(super) last_frame_time: Option<Instant>,
    pub(super) close_requested: bool,
    pub(super) error: Option<Error>,
}

impl App {
    pub(crate) fn new(
        renderer: Renderer,
        size: (u32, u32),
        title: String,
        vsync: bool,
        style: InteractorStyle,
        plane_widget: Option<PlaneWidget>,
    ) -> Self {
        Self {
            window: None,
            engine: None,
            renderer,
            plane_widget,
            style,
            size,
            title,
            vsync,
            gpu: render::GpuScene::default(),
            mouse_pos: (0.0, 0.0),
            motion: None,
            shift_down: false,
            widget_key: None,
            last_frame_time: None,
            close_requested: false,
            error: None,
        }
    }

    /// Records a fatal error and asks the loop to stop.
    pub(super) fn fail(&mut self, err: impl Into<Error>) {
        let err = err.into();
        log::error!("{err}");
        self.error.get_or_insert(err);
        self.close_requested = true;
    }

    pub(crate) fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }
}
