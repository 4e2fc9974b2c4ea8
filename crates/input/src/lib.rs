//! Desktop input: held keys, raw mouse motion, and window-size state.
//!
//! The frame loop never reads globals. Window events go through
//! [`InputState::on_window_event`], which returns a [`FrameSignal`] for
//! anything the loop must act on (resize, quit, capture changes).
//!
//! # Invariants
//! - Mouse motion only accumulates while look capture is active.
//! - Losing focus releases every held key.

mod bindings;
mod state;

pub use bindings::{Binding, KeyBindings};
pub use state::{FrameSignal, InputState};
