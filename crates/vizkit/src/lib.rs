//! vizkit: a small pipeline-style 3D visualization toolkit.
//!
//! Data flows from sources and readers through filters into mappers, which
//! feed actors placed in a [`Renderer`]. A [`RenderWindowInteractor`] opens
//! the window and runs the event loop.
//!
//! # Quick Start
//!
//! ```no_run
//! use vizkit::*;
//!
//! fn main() -> vizkit::Result<()> {
//!     let cone = ConeSource::default().output();
//!     let mut actor = Actor::from_poly_data(cone);
//!     actor.property_mut().set_color(1.0, 0.5, 0.2);
//!
//!     let mut window = RenderWindow::new();
//!     window.renderer_mut().add_actor(actor);
//!     window.renderer_mut().set_background(0.1, 0.2, 0.4);
//!
//!     RenderWindowInteractor::new(window).start()
//! }
//! ```
//!
//! # Scene objects
//!
//! - [`Actor`] - polygonal data with a [`Property`] and a transform
//! - [`Volume`] - scalar image data composited by ray casting
//! - [`PlaneWidget`] - a keyboard-driven plane for seeding and probing

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

mod app;

pub mod actor;
pub mod error;
pub mod interactor;
pub mod mapper;
pub mod plane_widget;
pub mod property;
pub mod render_window;
pub mod renderer;
pub mod style;
pub mod volume;

pub use actor::{Actor, RADIUS_ATTRIBUTE};
pub use error::{Error, Result};
pub use interactor::RenderWindowInteractor;
pub use mapper::PolyDataMapper;
pub use plane_widget::{PlaneWidget, WidgetMotion};
pub use property::{Property, Representation};
pub use render_window::RenderWindow;
pub use renderer::{ActorId, RenderEvent, Renderer, VolumeId};
pub use style::{CameraMotion, InteractorStyle};
pub use volume::{Interpolation, Volume, VolumeProperty};

// Re-export data types
pub use vizkit_core::{
    paths, read_vector_field, Bounds, ColorTransferFunction, ConeSource, ContourFilter, Cutter,
    ImageData, ImageDataGeometryFilter, IntegrationDirection, LegacyVtkReader, LookupTable,
    Options, OutlineFilter, PiecewiseFunction, Plane, PlaneSource, PlyReader, PolyData,
    PolyDataNormals, RibbonFilter, ScalarsToColors, SphereSource, StreamTracer, TubeFilter,
    VizError,
};
pub use vizkit_core::{Mat4, Quat, Vec3, Vec4};

// Re-export render types
pub use vizkit_render::{Camera, RenderError, ShaderProgram};
