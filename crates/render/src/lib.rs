//! Renderer-agnostic core for the primer lessons.
//!
//! Holds the pieces with real logic in them: the fly camera (pure math over
//! per-frame input) and shader programs that relink when their source files
//! change on disk. GPU specifics live behind [`ShaderBackend`].
//!
//! # Invariants
//! - Camera basis vectors are orthonormal after every update.
//! - A [`ShaderProgram`] always holds a linked program; failures propagate.

mod camera;
pub mod shader;

pub use camera::{FlyCamera, MAX_PITCH};
pub use shader::{ShaderBackend, ShaderError, ShaderProgram, ShaderStages, Stage, StageSource};
