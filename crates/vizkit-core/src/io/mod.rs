//! Readers for the file formats used by the demos.

mod legacy_vtk;
mod ply;
mod vector_field;

pub use legacy_vtk::LegacyVtkReader;
pub use ply::PlyReader;
pub use vector_field::{read_vector_field, VELOCITY};
