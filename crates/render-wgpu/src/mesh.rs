use primer_assets::{Geometry, VertexLayout};
use wgpu::util::DeviceExt;

/// Static geometry resident on the GPU.
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
    layout: VertexLayout,
    count: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, geometry: &Geometry) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertex_buffer"),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = geometry.indices.as_ref().map(|indices| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_index_buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });
        tracing::debug!(
            vertices = geometry.vertex_count(),
            indexed = index_buffer.is_some(),
            "uploaded mesh"
        );
        Self {
            vertex_buffer,
            index_buffer,
            layout: geometry.layout,
            count: geometry.draw_count(),
        }
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    /// Bind into slot 0 and draw `instances` copies. Slot 1 holds instance data.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, instances: u32) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        match &self.index_buffer {
            Some(index_buffer) => {
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..self.count, 0, 0..instances);
            }
            None => pass.draw(0..self.count, 0..instances),
        }
    }
}
