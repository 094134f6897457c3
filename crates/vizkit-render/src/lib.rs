//! wgpu rendering backend for vizkit.
//!
//! This crate provides:
//! - [`Camera`] with trackball and joystick style manipulation helpers
//! - [`RenderEngine`], a windowed wgpu engine with pipelines for triangles,
//!   lines, points, ray-cast sphere impostors and volume ray marching
//! - [`ShaderProgram`] sources, built in or loaded at runtime
//! - per-object GPU resources ([`MeshRenderData`], [`SphereRenderData`],
//!   [`VolumeRenderData`])

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// GPU counts are u32; datasets never approach that limit
#![allow(clippy::cast_possible_truncation)]

pub mod buffer;
pub mod camera;
pub mod engine;
pub mod error;
pub mod mesh_render;
pub mod shader;
pub mod sphere_render;
pub mod volume_render;

pub use camera::Camera;
pub use engine::{CameraUniforms, FrameContents, RenderEngine};
pub use error::{RenderError, RenderResult};
pub use mesh_render::{MeshGeometry, MeshRenderData, MeshUniforms, Primitive};
pub use shader::ShaderProgram;
pub use sphere_render::{SphereGeometry, SphereRenderData, SphereUniforms};
pub use volume_render::{VolumeDescriptor, VolumeRenderData, VolumeUniforms, LUT_SIZE};
