use glam::Vec3;

use super::RenderEngine;
use crate::error::RenderResult;
use crate::mesh_render::{MeshRenderData, Primitive};
use crate::sphere_render::SphereRenderData;
use crate::volume_render::VolumeRenderData;

/// What to draw in one frame.
#[derive(Default)]
pub struct FrameContents<'a> {
    /// Clear color.
    pub background: Vec3,
    /// Triangles, lines and points.
    pub meshes: Vec<&'a MeshRenderData>,
    /// Sphere impostors.
    pub spheres: Vec<&'a SphereRenderData>,
    /// Volumes, composited after all opaque geometry.
    pub volumes: Vec<&'a VolumeRenderData>,
}

impl RenderEngine {
    /// Renders one frame to the window surface and presents it.
    ///
    /// A lost or outdated surface is reported as
    /// [`RenderError::SurfaceLost`](crate::RenderError::SurfaceLost); the
    /// caller reconfigures with [`RenderEngine::resize`] and retries on the
    /// next frame.
    pub fn render(&self, frame: &FrameContents<'_>) -> RenderResult<()> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });
        {
            let bg = frame.background.as_dvec3();
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg.x,
                            g: bg.y,
                            b: bg.z,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for mesh in &frame.meshes {
                if mesh.num_indices == 0 {
                    continue;
                }
                let pipeline = match mesh.primitive {
                    Primitive::Triangles => &self.triangle_pipeline,
                    Primitive::Lines => &self.line_pipeline,
                    Primitive::Points => &self.point_pipeline,
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &mesh.bind_group, &[]);
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.num_indices, 0, 0..1);
            }

            for spheres in &frame.spheres {
                if spheres.num_spheres == 0 {
                    continue;
                }
                let Some(pipeline) = self.sphere_pipelines.get(&spheres.program) else {
                    log::warn!("no sphere pipeline '{}'", spheres.program);
                    continue;
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &spheres.bind_group, &[]);
                render_pass.draw(0..6, 0..spheres.num_spheres);
            }

            // Volumes blend over everything drawn so far.
            for volume in &frame.volumes {
                render_pass.set_pipeline(&self.volume_pipeline);
                render_pass.set_bind_group(0, &volume.bind_group, &[]);
                render_pass.draw(0..36, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
