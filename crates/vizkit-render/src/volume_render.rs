//! Volume ray marching GPU rendering resources.
//!
//! Scalars are normalized to `[0, 1]` over the scalar range and uploaded as
//! an `R16Float` 3D texture. Color and opacity come from a 256-entry RGBA
//! lookup texture spanning the same range.

use glam::{Mat4, Vec3};
use half::f16;
use vizkit_core::Bounds;
use wgpu::util::DeviceExt;

use crate::buffer;

/// Number of entries in a volume lookup table.
pub const LUT_SIZE: usize = 256;

/// Upper bound on ray marching steps per fragment.
const MAX_STEPS: f32 = 8192.0;

/// Everything needed to upload one volume.
#[derive(Debug, Clone)]
pub struct VolumeDescriptor<'a> {
    /// Grid dimensions in points.
    pub dimensions: [usize; 3],
    /// Point scalars, x fastest.
    pub scalars: &'a [f32],
    /// Scalar range mapped onto the lookup table.
    pub scalar_range: (f32, f32),
    /// World-space bounds of the grid before `model` is applied.
    pub bounds: Bounds,
    /// Actor transform.
    pub model: Mat4,
    /// RGBA lookup table with [`LUT_SIZE`] entries; alpha is the opacity per
    /// `unit_distance`.
    pub lut: &'a [[u8; 4]],
    /// Trilinear (true) or nearest (false) scalar sampling.
    pub linear: bool,
    /// Distance over which a lookup table opacity applies.
    pub unit_distance: f32,
    /// World-space distance between samples along a ray.
    pub sample_distance: f32,
}

/// Uniforms for the volume pipeline.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VolumeUniforms {
    pub model: [[f32; 4]; 4],
    pub inv_model: [[f32; 4]; 4],
    pub dims: [f32; 4],
    /// x: sample distance, y: unit distance, z: max steps.
    pub params: [f32; 4],
}

impl VolumeUniforms {
    /// Builds uniforms mapping the unit cube onto the volume's box.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(desc: &VolumeDescriptor<'_>) -> Self {
        let extent = desc.bounds.extent().max(Vec3::splat(1e-6));
        let model = desc.model
            * Mat4::from_translation(desc.bounds.min)
            * Mat4::from_scale(extent);
        let world_diagonal = model.transform_vector3(Vec3::ONE).length();
        let step = desc.sample_distance.max(1e-6);
        let [nx, ny, nz] = desc.dimensions;
        Self {
            model: model.to_cols_array_2d(),
            inv_model: model.inverse().to_cols_array_2d(),
            dims: [nx as f32, ny as f32, nz as f32, 0.0],
            params: [
                step,
                desc.unit_distance.max(1e-6),
                (world_diagonal / step + 2.0).min(MAX_STEPS),
                0.0,
            ],
        }
    }
}

/// Maps scalars onto `[0, 1]` over `range` as half floats. A degenerate
/// range maps everything to 0; NaN maps to 0.
#[must_use]
pub fn normalize_scalars(scalars: &[f32], range: (f32, f32)) -> Vec<f16> {
    let (lo, hi) = range;
    let span = hi - lo;
    scalars
        .iter()
        .map(|&v| {
            let t = if span > 0.0 { (v - lo) / span } else { 0.0 };
            let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
            f16::from_f32(t)
        })
        .collect()
}

/// GPU resources for one volume.
pub struct VolumeRenderData {
    /// Scalar 3D texture.
    pub scalar_texture: wgpu::Texture,
    /// Lookup table texture.
    pub lut_texture: wgpu::Texture,
    /// Uniform buffer.
    pub uniform_buffer: wgpu::Buffer,
    /// Bind group.
    pub bind_group: wgpu::BindGroup,
}

impl VolumeRenderData {
    /// Uploads a volume. The caller guarantees that `scalars` has one value
    /// per grid point and that `lut` has [`LUT_SIZE`] entries.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bind_group_layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        desc: &VolumeDescriptor<'_>,
    ) -> Self {
        let [nx, ny, nz] = desc.dimensions;
        let normalized = normalize_scalars(desc.scalars, desc.scalar_range);
        let scalar_texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("volume scalars"),
                size: wgpu::Extent3d {
                    width: nx as u32,
                    height: ny as u32,
                    depth_or_array_layers: nz as u32,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D3,
                format: wgpu::TextureFormat::R16Float,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            bytemuck::cast_slice(&normalized),
        );
        let lut_texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("volume lookup table"),
                size: wgpu::Extent3d {
                    width: desc.lut.len() as u32,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            bytemuck::cast_slice(desc.lut),
        );

        let filter = if desc.linear {
            wgpu::FilterMode::Linear
        } else {
            wgpu::FilterMode::Nearest
        };
        let scalar_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("volume scalar sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter,
            min_filter: filter,
            ..wgpu::SamplerDescriptor::default()
        });
        let lut_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("volume lookup sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..wgpu::SamplerDescriptor::default()
        });

        let uniform_buffer =
            buffer::uniform_buffer(device, "volume uniforms", &VolumeUniforms::new(desc));
        let scalar_view = scalar_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let lut_view = lut_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("volume bind group"),
            layout: bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&scalar_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&scalar_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&lut_view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(&lut_sampler),
                },
            ],
        });

        log::debug!("uploaded volume {nx}x{ny}x{nz}");
        Self {
            scalar_texture,
            lut_texture,
            uniform_buffer,
            bind_group,
        }
    }

    /// Rewrites the uniforms, e.g. after the actor moved.
    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &VolumeUniforms) {
        buffer::write_uniform(queue, &self.uniform_buffer, uniforms);
    }
}
