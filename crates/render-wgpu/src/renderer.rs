use crate::GpuError;
use crate::mesh::GpuMesh;
use crate::pipeline::PipelineBuilder;
use crate::texture::{GpuTexture, create_depth_view, texture_bind_group_layout};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use primer_assets::{LessonAssets, TextureImage, VertexLayout};
use primer_common::SurfaceSize;
use primer_render::{ShaderError, ShaderProgram};
use wgpu::util::DeviceExt;

/// Group 0, binding 0 in every lesson shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub light_position: [f32; 4],
    pub view_position: [f32; 4],
    /// Lesson-specific scalars; the quad lesson puts its offset in `xy`.
    pub params: [f32; 4],
}

impl Default for SceneUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

impl SceneUniforms {
    pub fn new(view: Mat4, proj: Mat4) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            light_position: [0.0; 4],
            view_position: [0.0; 4],
            params: [0.0; 4],
        }
    }

    pub fn with_light(mut self, light: Vec3, eye: Vec3) -> Self {
        self.light_position = light.extend(1.0).to_array();
        self.view_position = eye.extend(1.0).to_array();
        self
    }

    pub fn with_params(mut self, params: Vec4) -> Self {
        self.params = params.to_array();
        self
    }
}

/// Per-instance model matrix, read as four column attributes.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct InstanceData {
    model: [[f32; 4]; 4],
}

impl From<Mat4> for InstanceData {
    fn from(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
        }
    }
}

/// Pack model matrices for the instance buffer, dropping any past `max`.
fn instance_data(models: &[Mat4], max: u32) -> Vec<InstanceData> {
    if models.len() > max as usize {
        tracing::warn!(
            requested = models.len(),
            max,
            "instance buffer full, extra instances dropped"
        );
    }
    models
        .iter()
        .take(max as usize)
        .map(|&model| InstanceData::from(model))
        .collect()
}

/// Everything that changes from one frame to the next.
pub struct FrameData<'a> {
    pub uniforms: SceneUniforms,
    pub instances: &'a [Mat4],
    pub clear: wgpu::Color,
}

/// Draws one lesson: a hot-reloadable shader program, one mesh, one texture.
pub struct LessonRenderer {
    shader: ShaderProgram<wgpu::RenderPipeline>,
    pipeline_layout: wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture: GpuTexture,
    mesh: GpuMesh,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_view: wgpu::TextureView,
    reloads: u32,
}

impl LessonRenderer {
    /// Upload the lesson's geometry and texture and build its shader program.
    ///
    /// `assets` paths must already be resolved against the assets root.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        surface: SurfaceSize,
        assets: &LessonAssets,
    ) -> Result<Self, GpuError> {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&SceneUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = texture_bind_group_layout(device);
        let image = match &assets.texture {
            Some(path) => TextureImage::load(path)?,
            None => TextureImage::white(),
        };
        let texture = GpuTexture::upload(device, queue, &texture_layout, &image);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lesson_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let geometry = assets.geometry.build();
        let mesh = GpuMesh::upload(device, &geometry);

        let shader = ShaderProgram::load(
            &mut PipelineBuilder {
                device,
                layout: &pipeline_layout,
                vertex_layout: geometry.layout,
                color_format,
            },
            &assets.vertex_shader,
            &assets.fragment_shader,
        )?;

        // Pre-allocated; scenes never draw more than a handful of copies.
        let max_instances = 64u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: max_instances as u64 * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            shader,
            pipeline_layout,
            color_format,
            uniform_buffer,
            uniform_bind_group,
            texture,
            mesh,
            instance_buffer,
            max_instances,
            depth_view: create_depth_view(device, surface),
            reloads: 0,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, surface: SurfaceSize) {
        self.depth_view = create_depth_view(device, surface);
    }

    pub fn vertex_layout(&self) -> VertexLayout {
        self.mesh.layout()
    }

    pub fn texture_size(&self) -> (u32, u32) {
        self.texture.size()
    }

    /// Number of hot reloads since startup.
    pub fn reload_count(&self) -> u32 {
        self.reloads
    }

    pub fn shader(&self) -> &ShaderProgram<wgpu::RenderPipeline> {
        &self.shader
    }

    /// Relink the program if either source file changed. Errors are fatal.
    pub fn check_shaders(&mut self, device: &wgpu::Device) -> Result<bool, ShaderError> {
        let mut builder = PipelineBuilder {
            device,
            layout: &self.pipeline_layout,
            vertex_layout: self.mesh.layout(),
            color_format: self.color_format,
        };
        let reloaded = self.shader.refresh(&mut builder)?;
        if reloaded {
            self.reloads += 1;
            tracing::info!(reloads = self.reloads, "shader program relinked");
        }
        Ok(reloaded)
    }

    /// Record and submit one frame into `target`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        frame: &FrameData<'_>,
    ) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&frame.uniforms));

        let instances = instance_data(frame.instances, self.max_instances);
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("lesson_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lesson_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame.clear),
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
                ..Default::default()
            });

            if !instances.is_empty() {
                pass.set_pipeline(self.shader.program());
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_bind_group(1, &self.texture.bind_group, &[]);
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                self.mesh.draw(&mut pass, instances.len() as u32);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}
