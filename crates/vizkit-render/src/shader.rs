//! Shader programs.
//!
//! A [`ShaderProgram`] is WGSL source plus a label. Programs are either
//! built in (compiled into the binary) or read from the shader directory at
//! runtime; a file that cannot be read falls back to the built-in program.

use std::borrow::Cow;

use crate::error::{RenderError, RenderResult};

/// Built-in lit surface, line and point shader.
pub const SURFACE_WGSL: &str = include_str!("shaders/surface.wgsl");
/// Built-in ray-cast sphere impostor shader.
pub const SPHERE_WGSL: &str = include_str!("shaders/point_sphere.wgsl");
/// Built-in volume ray marching shader.
pub const VOLUME_WGSL: &str = include_str!("shaders/volume.wgsl");

/// WGSL source for a sphere impostor pipeline.
///
/// Every program must provide `vs_main` and `fs_main` entry points and use
/// the bind group layout of the built-in sphere shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderProgram {
    label: String,
    source: Cow<'static, str>,
}

impl ShaderProgram {
    /// Creates a program from source.
    pub fn new(label: impl Into<String>, source: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
        }
    }

    /// The built-in sphere impostor program.
    #[must_use]
    pub fn builtin_sphere() -> Self {
        Self::new("builtin sphere", SPHERE_WGSL)
    }

    /// Reads `name` from the shader directory, falling back to the built-in
    /// sphere program when the file cannot be read.
    #[must_use]
    pub fn sphere_from_file_or_builtin(name: &str) -> Self {
        match vizkit_core::paths::read_shader_source(name) {
            Ok(source) => {
                log::info!("loaded shader program {name}");
                Self::new(name, source)
            }
            Err(err) => {
                log::error!("{err}; using the built-in sphere shader");
                Self::builtin_sphere()
            }
        }
    }

    /// Label used for the wgpu objects and as the pipeline cache key.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// WGSL source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Compiles the program, reporting validation errors instead of
    /// panicking.
    pub fn compile(&self, device: &wgpu::Device) -> RenderResult<wgpu::ShaderModule> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&self.label),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(self.source())),
        });
        match pollster::block_on(device.pop_error_scope()) {
            None => Ok(module),
            Some(err) => Err(RenderError::ShaderCompilationFailed {
                label: self.label.clone(),
                message: err.to_string(),
            }),
        }
    }
}

impl Default for ShaderProgram {
    fn default() -> Self {
        Self::builtin_sphere()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sources_have_entry_points() {
        for src in [SURFACE_WGSL, SPHERE_WGSL, VOLUME_WGSL] {
            assert!(src.contains("fn vs_main"));
            assert!(src.contains("fn fs_main"));
        }
    }

    #[test]
    fn test_missing_file_falls_back() {
        let program = ShaderProgram::sphere_from_file_or_builtin("not_a_shader.wgsl");
        assert_eq!(program, ShaderProgram::builtin_sphere());
    }
}
