//! GPU buffer helpers.
//!
//! Per-vertex data is stored in storage buffers as `vec4<f32>` so that the
//! WGSL side can index it with `vertex_index` without layout surprises.

use glam::Vec3;
use wgpu::util::DeviceExt;

/// Packs points into `vec4` rows with the given `w`.
#[must_use]
pub fn pack_vec4(values: &[Vec3], w: f32) -> Vec<[f32; 4]> {
    values.iter().map(|v| v.extend(w).to_array()).collect()
}

/// Creates a read-only storage buffer. Empty data gets one zeroed row,
/// since wgpu rejects zero-sized bindings.
pub fn storage_buffer(device: &wgpu::Device, label: &str, rows: &[[f32; 4]]) -> wgpu::Buffer {
    let fallback = [[0.0_f32; 4]];
    let rows = if rows.is_empty() { &fallback[..] } else { rows };
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(rows),
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
    })
}

/// Creates a uniform buffer holding one value.
pub fn uniform_buffer<T: bytemuck::Pod>(device: &wgpu::Device, label: &str, value: &T) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(value),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

/// Creates an index buffer.
pub fn index_buffer(device: &wgpu::Device, label: &str, indices: &[u32]) -> wgpu::Buffer {
    let fallback = [0_u32];
    let indices = if indices.is_empty() { &fallback[..] } else { indices };
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(indices),
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
    })
}

/// Overwrites a uniform buffer.
pub fn write_uniform<T: bytemuck::Pod>(queue: &wgpu::Queue, buffer: &wgpu::Buffer, value: &T) {
    queue.write_buffer(buffer, 0, bytemuck::bytes_of(value));
}
