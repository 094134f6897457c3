//! The main rendering engine.

mod pipelines;
mod rendering;

use std::collections::HashMap;
use std::sync::Arc;

use crate::buffer;
use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};
use crate::mesh_render::{MeshGeometry, MeshRenderData, MeshUniforms};
use crate::shader::{ShaderProgram, SURFACE_WGSL, VOLUME_WGSL};
use crate::sphere_render::{SphereGeometry, SphereRenderData, SphereUniforms};
use crate::volume_render::{VolumeDescriptor, VolumeRenderData};

pub use rendering::FrameContents;

/// Depth buffer format.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Camera uniforms for GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

impl CameraUniforms {
    /// Computes the uniforms of `camera` for a viewport aspect ratio.
    #[must_use]
    pub fn new(camera: &Camera, aspect_ratio: f32) -> Self {
        let view = camera.view_matrix();
        let proj = camera.projection_matrix(aspect_ratio);
        let view_proj = proj * view;
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            eye: camera.position.extend(1.0).to_array(),
        }
    }
}

impl Default for CameraUniforms {
    fn default() -> Self {
        Self::new(&Camera::default(), 1.0)
    }
}

/// The main rendering engine backed by wgpu.
pub struct RenderEngine {
    /// The wgpu instance.
    pub instance: wgpu::Instance,
    /// The wgpu adapter.
    pub adapter: wgpu::Adapter,
    /// The wgpu device.
    pub device: wgpu::Device,
    /// The wgpu queue.
    pub queue: wgpu::Queue,
    /// The window surface.
    pub surface: wgpu::Surface<'static>,
    /// Surface configuration.
    pub surface_config: wgpu::SurfaceConfiguration,
    /// Depth texture.
    pub depth_texture: wgpu::Texture,
    /// Depth texture view.
    pub depth_view: wgpu::TextureView,
    /// Current viewport width.
    pub width: u32,
    /// Current viewport height.
    pub height: u32,
    /// Camera uniform buffer, bound at binding 0 of every object.
    pub camera_buffer: wgpu::Buffer,
    /// Mesh bind group layout (triangles, lines and points).
    pub(crate) mesh_bind_group_layout: wgpu::BindGroupLayout,
    /// Filled triangle pipeline.
    pub(crate) triangle_pipeline: wgpu::RenderPipeline,
    /// Line segment pipeline.
    pub(crate) line_pipeline: wgpu::RenderPipeline,
    /// Point pipeline.
    pub(crate) point_pipeline: wgpu::RenderPipeline,
    /// Sphere bind group layout, shared by every sphere program.
    pub(crate) sphere_bind_group_layout: wgpu::BindGroupLayout,
    /// Sphere pipelines keyed by shader program label.
    pub(crate) sphere_pipelines: HashMap<String, wgpu::RenderPipeline>,
    /// Volume bind group layout.
    pub(crate) volume_bind_group_layout: wgpu::BindGroupLayout,
    /// Volume ray marching pipeline.
    pub(crate) volume_pipeline: wgpu::RenderPipeline,
}

impl RenderEngine {
    /// Creates a render engine drawing into `window`.
    #[allow(clippy::cast_precision_loss)]
    pub async fn new_windowed(
        window: Arc<winit::window::Window>,
        vsync: bool,
    ) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::AdapterCreationFailed)?;
        log::info!("using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("vizkit device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        // Colors are given in display space, so prefer a non-sRGB target.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::SurfaceConfigurationFailed)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let (depth_texture, depth_view) = Self::create_depth_texture(&device, width, height);
        let camera_buffer =
            buffer::uniform_buffer(&device, "camera uniforms", &CameraUniforms::default());

        let surface_program = ShaderProgram::new("surface shader", SURFACE_WGSL);
        let surface_shader = surface_program.compile(&device)?;
        let mesh_bind_group_layout = pipelines::create_mesh_bind_group_layout(&device);
        let [triangle_pipeline, line_pipeline, point_pipeline] = [
            wgpu::PrimitiveTopology::TriangleList,
            wgpu::PrimitiveTopology::LineList,
            wgpu::PrimitiveTopology::PointList,
        ]
        .map(|topology| {
            pipelines::create_mesh_pipeline(
                &device,
                &mesh_bind_group_layout,
                &surface_shader,
                surface_format,
                topology,
            )
        });

        let volume_program = ShaderProgram::new("volume shader", VOLUME_WGSL);
        let volume_shader = volume_program.compile(&device)?;
        let volume_bind_group_layout = pipelines::create_volume_bind_group_layout(&device);
        let volume_pipeline = pipelines::create_volume_pipeline(
            &device,
            &volume_bind_group_layout,
            &volume_shader,
            surface_format,
        );

        let sphere_bind_group_layout = pipelines::create_sphere_bind_group_layout(&device);

        let mut engine = Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            surface_config,
            depth_texture,
            depth_view,
            width,
            height,
            camera_buffer,
            mesh_bind_group_layout,
            triangle_pipeline,
            line_pipeline,
            point_pipeline,
            sphere_bind_group_layout,
            sphere_pipelines: HashMap::new(),
            volume_bind_group_layout,
            volume_pipeline,
        };
        engine.sphere_pipeline_for(&ShaderProgram::builtin_sphere())?;
        log::info!("render engine ready: {width}x{height}, {surface_format:?}");
        Ok(engine)
    }

    /// Resizes the surface and depth buffer. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);

        let (depth_texture, depth_view) = Self::create_depth_texture(&self.device, width, height);
        self.depth_texture = depth_texture;
        self.depth_view = depth_view;
        log::debug!("resized to {width}x{height}");
    }

    /// Viewport aspect ratio.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Uploads the camera for the next frame.
    pub fn update_camera(&self, camera: &Camera) {
        let uniforms = CameraUniforms::new(camera, self.aspect_ratio());
        buffer::write_uniform(&self.queue, &self.camera_buffer, &uniforms);
    }

    /// Returns the label of the pipeline that will draw spheres with
    /// `program`, compiling it on first use.
    ///
    /// A program that fails to compile or link is logged and replaced by the
    /// built-in sphere program.
    pub fn sphere_pipeline_for(&mut self, program: &ShaderProgram) -> RenderResult<String> {
        if self.sphere_pipelines.contains_key(program.label()) {
            return Ok(program.label().to_string());
        }
        match self.build_sphere_pipeline(program) {
            Ok(pipeline) => {
                self.sphere_pipelines
                    .insert(program.label().to_string(), pipeline);
                Ok(program.label().to_string())
            }
            Err(err) => {
                let builtin = ShaderProgram::builtin_sphere();
                if program == &builtin {
                    return Err(err);
                }
                log::error!("{err}; using the built-in sphere shader");
                self.sphere_pipeline_for(&builtin)
            }
        }
    }

    fn build_sphere_pipeline(&self, program: &ShaderProgram) -> RenderResult<wgpu::RenderPipeline> {
        let module = program.compile(&self.device)?;
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = pipelines::create_sphere_pipeline(
            &self.device,
            &self.sphere_bind_group_layout,
            &module,
            self.surface_config.format,
            program.label(),
        );
        match pollster::block_on(self.device.pop_error_scope()) {
            None => {
                log::debug!("built sphere pipeline '{}'", program.label());
                Ok(pipeline)
            }
            Some(err) => Err(RenderError::ShaderCompilationFailed {
                label: program.label().to_string(),
                message: err.to_string(),
            }),
        }
    }

    /// Uploads mesh geometry.
    #[must_use]
    pub fn create_mesh(&self, geometry: &MeshGeometry, uniforms: &MeshUniforms) -> MeshRenderData {
        MeshRenderData::new(
            &self.device,
            &self.mesh_bind_group_layout,
            &self.camera_buffer,
            geometry,
            uniforms,
        )
    }

    /// Uploads spheres drawn with `program`.
    pub fn create_spheres(
        &mut self,
        geometry: &SphereGeometry,
        uniforms: &SphereUniforms,
        program: &ShaderProgram,
    ) -> RenderResult<SphereRenderData> {
        let key = self.sphere_pipeline_for(program)?;
        Ok(SphereRenderData::new(
            &self.device,
            &self.sphere_bind_group_layout,
            &self.camera_buffer,
            geometry,
            uniforms,
            key,
        ))
    }

    /// Uploads a volume.
    #[must_use]
    pub fn create_volume(&self, desc: &VolumeDescriptor<'_>) -> VolumeRenderData {
        VolumeRenderData::new(
            &self.device,
            &self.queue,
            &self.volume_bind_group_layout,
            &self.camera_buffer,
            desc,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_uniform_size() {
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 272);
    }

    #[test]
    fn test_camera_uniform_eye() {
        let mut camera = Camera::default();
        camera.position = glam::Vec3::new(1.0, 2.0, 3.0);
        let u = CameraUniforms::new(&camera, 1.0);
        assert_eq!(u.eye, [1.0, 2.0, 3.0, 1.0]);
    }
}
