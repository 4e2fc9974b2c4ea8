use crate::{DEPTH_FORMAT, InstanceData};
use primer_assets::{AttributeKind, VertexLayout};
use primer_render::{ShaderBackend, ShaderError, ShaderStages, StageSource};

/// Entry point every vertex source must define.
pub const VERTEX_ENTRY: &str = "vs_main";
/// Entry point every fragment source must define.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Builds render pipelines from a vertex and a fragment WGSL file.
///
/// Each stage is compiled inside a validation error scope so a bad edit comes
/// back as a [`ShaderError`] carrying the naga diagnostic instead of tripping
/// the device's uncaptured-error handler.
pub struct PipelineBuilder<'a> {
    pub device: &'a wgpu::Device,
    pub layout: &'a wgpu::PipelineLayout,
    pub vertex_layout: VertexLayout,
    pub color_format: wgpu::TextureFormat,
}

impl PipelineBuilder<'_> {
    fn compile(&self, source: &StageSource) -> Result<wgpu::ShaderModule, ShaderError> {
        let label = source.path.display().to_string();
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label.as_str()),
                source: wgpu::ShaderSource::Wgsl(source.text.as_str().into()),
            });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(ShaderError::Compile {
                stage: source.stage,
                path: source.path.clone(),
                log: err.to_string(),
            });
        }
        Ok(module)
    }
}

fn vertex_format(kind: AttributeKind) -> wgpu::VertexFormat {
    match kind {
        AttributeKind::Vec2 => wgpu::VertexFormat::Float32x2,
        AttributeKind::Vec3 => wgpu::VertexFormat::Float32x3,
    }
}

/// Per-vertex attributes for `layout`, in shader location order.
pub fn vertex_attributes(layout: VertexLayout) -> Vec<wgpu::VertexAttribute> {
    layout
        .attributes()
        .iter()
        .map(|attr| wgpu::VertexAttribute {
            format: vertex_format(attr.kind),
            offset: (attr.offset_floats as usize * std::mem::size_of::<f32>()) as u64,
            shader_location: attr.location,
        })
        .collect()
}

/// Per-instance model matrix columns, placed right after the vertex attributes.
pub fn instance_attributes(layout: VertexLayout) -> Vec<wgpu::VertexAttribute> {
    let base = layout.next_location();
    (0..4)
        .map(|column| wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x4,
            offset: column as u64 * 16,
            shader_location: base + column,
        })
        .collect()
}

impl ShaderBackend for PipelineBuilder<'_> {
    type Program = wgpu::RenderPipeline;

    fn link(&mut self, stages: &ShaderStages) -> Result<wgpu::RenderPipeline, ShaderError> {
        let vertex = self.compile(&stages.vertex)?;
        let fragment = self.compile(&stages.fragment)?;

        let vertex_attributes = vertex_attributes(self.vertex_layout);
        let instance_attributes = instance_attributes(self.vertex_layout);

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("lesson_pipeline"),
                layout: Some(self.layout),
                vertex: wgpu::VertexState {
                    module: &vertex,
                    entry_point: Some(VERTEX_ENTRY),
                    compilation_options: Default::default(),
                    buffers: &[
                        wgpu::VertexBufferLayout {
                            array_stride: self.vertex_layout.stride_bytes(),
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &vertex_attributes,
                        },
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<InstanceData>() as u64,
                            step_mode: wgpu::VertexStepMode::Instance,
                            attributes: &instance_attributes,
                        },
                    ],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment,
                    entry_point: Some(FRAGMENT_ENTRY),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.color_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(ShaderError::Link {
                log: err.to_string(),
            });
        }
        Ok(pipeline)
    }

    fn release(&mut self, program: wgpu::RenderPipeline) {
        tracing::debug!("releasing replaced pipeline");
        drop(program);
    }
}
