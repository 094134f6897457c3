//! Error type for the scene API and application loop.

use thiserror::Error;
use vizkit_core::VizError;
use vizkit_render::RenderError;

/// Errors raised while building or showing a scene.
#[derive(Error, Debug)]
pub enum Error {
    /// Data loading or processing failed.
    #[error(transparent)]
    Data(#[from] VizError),

    /// GPU setup or rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The event loop could not be created or exited with an error.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The OS refused to create the window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
}

/// A specialized Result type for the scene API.
pub type Result<T> = std::result::Result<T, Error>;
