//! Triangle, line and point GPU rendering resources.

use glam::{Mat4, Vec3, Vec4};
use vizkit_core::PolyData;

use crate::buffer;

/// Primitive topology of a [`MeshGeometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Indexed triangle list.
    Triangles,
    /// Indexed line segment list.
    Lines,
    /// Indexed point list.
    Points,
}

/// CPU-side geometry ready for upload: flat index list over shared
/// per-vertex arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGeometry {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Vertex normals; absent normals render unlit.
    pub normals: Option<Vec<Vec3>>,
    /// Vertex colors; absent colors use the uniform color.
    pub colors: Option<Vec<Vec3>>,
    /// Indices into the vertex arrays.
    pub indices: Vec<u32>,
    /// How the indices are assembled.
    pub primitive: Primitive,
}

impl MeshGeometry {
    fn from_indices(data: &PolyData, indices: Vec<u32>, primitive: Primitive) -> Self {
        Self {
            positions: data.points.clone(),
            normals: data.point_data.normals.clone(),
            colors: None,
            indices,
            primitive,
        }
    }

    /// Triangulated polygon cells.
    #[must_use]
    pub fn triangles(data: &PolyData) -> Self {
        let indices = data.triangles().into_iter().flatten().collect();
        Self::from_indices(data, indices, Primitive::Triangles)
    }

    /// Polyline cells as segments, plus polygon edges when `polygon_edges`
    /// is set (wireframe).
    #[must_use]
    pub fn lines(data: &PolyData, polygon_edges: bool) -> Self {
        let mut indices: Vec<u32> = data
            .lines
            .iter()
            .flat_map(|line| line.windows(2).flat_map(|w| [w[0], w[1]]))
            .collect();
        if polygon_edges {
            indices.extend(data.polygon_edges().into_iter().flatten());
        }
        Self::from_indices(data, indices, Primitive::Lines)
    }

    /// Vertex cells, or every point when `all_points` is set.
    #[must_use]
    pub fn points(data: &PolyData, all_points: bool) -> Self {
        let indices = if all_points {
            (0..data.num_points() as u32).collect()
        } else {
            data.verts.clone()
        };
        Self::from_indices(data, indices, Primitive::Points)
    }

    /// Attaches per-vertex colors.
    #[must_use]
    pub fn with_colors(mut self, colors: Option<Vec<Vec3>>) -> Self {
        self.colors = colors;
        self
    }

    /// Returns true if nothing would be drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() || self.positions.is_empty()
    }
}

/// Uniforms shared by the triangle, line and point pipelines.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// Ambient, diffuse, specular, specular power.
    pub lighting: [f32; 4],
    /// x: use vertex colors, y: unlit.
    pub params: [f32; 4],
}

impl Default for MeshUniforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            normal_matrix: Mat4::IDENTITY.to_cols_array_2d(),
            color: [1.0; 4],
            lighting: [0.0, 1.0, 0.0, 1.0],
            params: [0.0; 4],
        }
    }
}

impl MeshUniforms {
    /// Builds uniforms for a model transform and surface appearance.
    #[must_use]
    pub fn new(model: Mat4, color: Vec4, lighting: Vec4, use_vertex_colors: bool, unlit: bool) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            color: color.to_array(),
            lighting: lighting.to_array(),
            params: [
                f32::from(u8::from(use_vertex_colors)),
                f32::from(u8::from(unlit)),
                0.0,
                0.0,
            ],
        }
    }
}

/// GPU resources for one mesh draw.
pub struct MeshRenderData {
    /// Position buffer (storage buffer).
    pub position_buffer: wgpu::Buffer,
    /// Normal buffer (storage buffer).
    pub normal_buffer: wgpu::Buffer,
    /// Color buffer (storage buffer).
    pub color_buffer: wgpu::Buffer,
    /// Index buffer.
    pub index_buffer: wgpu::Buffer,
    /// Uniform buffer.
    pub uniform_buffer: wgpu::Buffer,
    /// Bind group for this mesh.
    pub bind_group: wgpu::BindGroup,
    /// Number of indices to draw.
    pub num_indices: u32,
    /// Topology, selecting the pipeline.
    pub primitive: Primitive,
}

impl MeshRenderData {
    /// Uploads `geometry`.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        geometry: &MeshGeometry,
        uniforms: &MeshUniforms,
    ) -> Self {
        let position_buffer = buffer::storage_buffer(
            device,
            "mesh positions",
            &buffer::pack_vec4(&geometry.positions, 1.0),
        );
        // Zero normals switch the shader to unlit shading.
        let normals = geometry
            .normals
            .as_deref()
            .map(|n| buffer::pack_vec4(n, 0.0))
            .unwrap_or_else(|| vec![[0.0; 4]; geometry.positions.len()]);
        let normal_buffer = buffer::storage_buffer(device, "mesh normals", &normals);
        let colors = geometry
            .colors
            .as_deref()
            .map(|c| buffer::pack_vec4(c, 1.0))
            .unwrap_or_default();
        let color_buffer = buffer::storage_buffer(device, "mesh colors", &colors);
        let index_buffer = buffer::index_buffer(device, "mesh indices", &geometry.indices);
        let uniform_buffer = buffer::uniform_buffer(device, "mesh uniforms", uniforms);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mesh bind group"),
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
                    resource: position_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: normal_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: color_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            position_buffer,
            normal_buffer,
            color_buffer,
            index_buffer,
            uniform_buffer,
            bind_group,
            num_indices: geometry.indices.len() as u32,
            primitive: geometry.primitive,
        }
    }

    /// Updates uniforms.
    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &MeshUniforms) {
        buffer::write_uniform(queue, &self.uniform_buffer, uniforms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_with_outline() -> PolyData {
        let mut pd = PolyData::from_polygons(
            vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y],
            vec![vec![0, 1, 2, 3]],
        );
        pd.lines.push(vec![0, 1, 2]);
        pd.verts.push(3);
        pd
    }

    #[test]
    fn test_uniform_size_matches_shader() {
        assert_eq!(std::mem::size_of::<MeshUniforms>(), 176);
    }

    #[test]
    fn test_triangles() {
        let g = MeshGeometry::triangles(&square_with_outline());
        assert_eq!(g.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(g.primitive, Primitive::Triangles);
    }

    #[test]
    fn test_lines_split_polylines_and_add_wireframe_edges() {
        let pd = square_with_outline();
        assert_eq!(MeshGeometry::lines(&pd, false).indices, vec![0, 1, 1, 2]);
        let wire = MeshGeometry::lines(&pd, true);
        assert_eq!(wire.indices.len(), 4 + 2 * 4);
    }

    #[test]
    fn test_points() {
        let pd = square_with_outline();
        assert_eq!(MeshGeometry::points(&pd, false).indices, vec![3]);
        assert_eq!(MeshGeometry::points(&pd, true).indices, vec![0, 1, 2, 3]);
        assert!(MeshGeometry::points(&PolyData::new(), true).is_empty());
    }

    #[test]
    fn test_uniform_flags() {
        let u = MeshUniforms::new(Mat4::IDENTITY, Vec4::ONE, Vec4::ZERO, true, false);
        assert_eq!(u.params[..2], [1.0, 0.0]);
        assert_eq!(u.normal_matrix, Mat4::IDENTITY.to_cols_array_2d());
    }
}
