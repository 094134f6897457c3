//! Data model and processing for vizkit.
//!
//! This crate has no GPU dependencies. It provides:
//! - [`PolyData`] and [`ImageData`] datasets
//! - procedural [`sources`] and dataset [`filters`]
//! - readers for PLY, legacy VTK structured points and raw `.vec` fields
//! - color and opacity transfer functions
//! - [`Options`] and resource [`paths`]

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Grid and mesh code uses short coordinate names (i, j, k, nx, ny, nz)
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]

pub mod bounds;
pub mod error;
pub mod filters;
pub mod image_data;
pub mod io;
pub mod marching_cubes;
pub mod options;
pub mod paths;
pub mod poly_data;
pub mod sources;
pub mod transfer_function;

pub use bounds::Bounds;
pub use error::{Result, VizError};
pub use filters::{
    ContourFilter, Cutter, ImageDataGeometryFilter, IntegrationDirection, OutlineFilter, Plane,
    PolyDataNormals, RibbonFilter, StreamTracer, TubeFilter,
};
pub use image_data::{ImageData, Named};
pub use io::{read_vector_field, LegacyVtkReader, PlyReader};
pub use options::Options;
pub use poly_data::{PointData, PolyData};
pub use sources::{ConeSource, PlaneSource, SphereSource};
pub use transfer_function::{
    ColorTransferFunction, LookupTable, PiecewiseFunction, ScalarsToColors,
};

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec3, Vec4};
