//! Vertex buffers for the scene meshes

use wgpu::util::DeviceExt;

use crate::gfx::scene::vertex::Vertex;

/// A non-indexed triangle list living in a GPU vertex buffer
pub struct MeshResource {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl MeshResource {
    pub fn upload(device: &wgpu::Device, vertices: &[Vertex], label: &str) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            buffer,
            vertex_count: vertices.len() as u32,
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}
