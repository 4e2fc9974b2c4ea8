//! Lesson assets: the lesson catalogue, built-in geometry, and textures.
//!
//! Shader sources are not loaded here; the render crate reads and watches
//! them so it can hot reload. This crate only says where they live.
//!
//! # Layout
//! ```text
//! assets/
//!   shaders/<name>.vert.wgsl
//!   shaders/<name>.frag.wgsl
//!   textures/test.png
//! ```

pub mod geometry;
pub mod manifest;
pub mod texture;

use std::path::PathBuf;

pub use geometry::{AttributeKind, Geometry, GeometryKind, VertexAttribute, VertexLayout};
pub use manifest::{AssetManifest, Instances, Lesson, LessonAssets, ParseLessonError};
pub use texture::{MipLevel, TextureImage};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid lesson manifest {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
