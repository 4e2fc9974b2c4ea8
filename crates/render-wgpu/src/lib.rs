//! wgpu render backend for the primer lessons.
//!
//! Bootstraps the window surface, builds render pipelines from WGSL source
//! files (relinking them when the files change), and draws a lesson's mesh
//! with its texture and per-frame uniforms.
//!
//! # Invariants
//! - A failed shader compile or link is returned, never swallowed.
//! - Geometry and textures are uploaded once and never mutated.

mod context;
mod mesh;
mod pipeline;
mod renderer;
mod texture;

#[cfg(test)]
mod test_gpu;

pub use context::GpuContext;
pub use mesh::GpuMesh;
pub use pipeline::{FRAGMENT_ENTRY, PipelineBuilder, VERTEX_ENTRY};
pub use renderer::{FrameData, InstanceData, LessonRenderer, SceneUniforms};
pub use texture::GpuTexture;

/// Depth buffer format shared by every lesson pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Errors from GPU setup and lesson loading.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    UnsupportedSurface,
    #[error("GPU out of memory")]
    OutOfMemory,
    #[error(transparent)]
    Shader(#[from] primer_render::ShaderError),
    #[error(transparent)]
    Asset(#[from] primer_assets::AssetError),
}
