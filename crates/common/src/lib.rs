//! Shared plain types used across the primer crates.

mod types;

pub use types::{Axis, MovementIntent, SurfaceSize};
