//! Ray-cast sphere impostor GPU rendering resources.

use glam::{Mat4, Vec3, Vec4};

use crate::buffer;

/// Sphere centers and radii ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereGeometry {
    /// Sphere centers.
    pub centers: Vec<Vec3>,
    /// One radius per sphere.
    pub radii: Vec<f32>,
    /// Optional per-sphere colors.
    pub colors: Option<Vec<Vec3>>,
}

impl SphereGeometry {
    /// Spheres of a common radius.
    #[must_use]
    pub fn uniform(centers: Vec<Vec3>, radius: f32) -> Self {
        let radii = vec![radius; centers.len()];
        Self {
            centers,
            radii,
            colors: None,
        }
    }

    /// Packs `(center, radius)` rows; missing radii repeat the last one
    /// (or 1 when there are none).
    #[must_use]
    pub fn packed(&self) -> Vec<[f32; 4]> {
        let fallback = self.radii.last().copied().unwrap_or(1.0);
        self.centers
            .iter()
            .enumerate()
            .map(|(i, c)| c.extend(self.radii.get(i).copied().unwrap_or(fallback)).to_array())
            .collect()
    }
}

/// Uniforms for the sphere pipelines.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereUniforms {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// Ambient, diffuse, specular, specular power.
    pub lighting: [f32; 4],
    /// x: use per-sphere colors, y: radius scale.
    pub params: [f32; 4],
}

impl Default for SphereUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Vec4::ONE, Vec4::new(0.0, 1.0, 0.0, 1.0), false)
    }
}

impl SphereUniforms {
    /// Builds uniforms. Radii scale with the largest axis scale of `model`.
    #[must_use]
    pub fn new(model: Mat4, color: Vec4, lighting: Vec4, use_sphere_colors: bool) -> Self {
        let (scale, _, _) = model.to_scale_rotation_translation();
        Self {
            model: model.to_cols_array_2d(),
            color: color.to_array(),
            lighting: lighting.to_array(),
            params: [
                f32::from(u8::from(use_sphere_colors)),
                scale.abs().max_element(),
                0.0,
                0.0,
            ],
        }
    }
}

/// GPU resources for a set of sphere impostors.
pub struct SphereRenderData {
    /// Center/radius buffer (storage buffer).
    pub sphere_buffer: wgpu::Buffer,
    /// Color buffer (storage buffer).
    pub color_buffer: wgpu::Buffer,
    /// Uniform buffer.
    pub uniform_buffer: wgpu::Buffer,
    /// Bind group.
    pub bind_group: wgpu::BindGroup,
    /// Number of spheres.
    pub num_spheres: u32,
    /// Label of the shader program whose pipeline draws these spheres.
    pub program: String,
}

impl SphereRenderData {
    /// Uploads `geometry` to be drawn with the pipeline of `program`.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        geometry: &SphereGeometry,
        uniforms: &SphereUniforms,
        program: impl Into<String>,
    ) -> Self {
        let sphere_buffer = buffer::storage_buffer(device, "sphere centers", &geometry.packed());
        let colors = geometry
            .colors
            .as_deref()
            .map(|c| buffer::pack_vec4(c, 1.0))
            .unwrap_or_default();
        let color_buffer = buffer::storage_buffer(device, "sphere colors", &colors);
        let uniform_buffer = buffer::uniform_buffer(device, "sphere uniforms", uniforms);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sphere bind group"),
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
                    resource: sphere_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: color_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            sphere_buffer,
            color_buffer,
            uniform_buffer,
            bind_group,
            num_spheres: geometry.centers.len() as u32,
            program: program.into(),
        }
    }

    /// Updates uniforms.
    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &SphereUniforms) {
        buffer::write_uniform(queue, &self.uniform_buffer, uniforms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_size_matches_shader() {
        assert_eq!(std::mem::size_of::<SphereUniforms>(), 112);
    }

    #[test]
    fn test_packed_repeats_last_radius() {
        let g = SphereGeometry {
            centers: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            radii: vec![2.0, 3.0],
            colors: None,
        };
        let rows = g.packed();
        assert_eq!(rows[0], [0.0, 0.0, 0.0, 2.0]);
        assert_eq!(rows[2], [0.0, 1.0, 0.0, 3.0]);
    }

    #[test]
    fn test_radius_scale_follows_model() {
        let u = SphereUniforms::new(
            Mat4::from_scale(Vec3::new(1.0, 4.0, 2.0)),
            Vec4::ONE,
            Vec4::ZERO,
            false,
        );
        assert!((u.params[1] - 4.0).abs() < 1e-6);
    }
}
