use crate::bindings::{Binding, KeyBindings};
use glam::Vec2;
use primer_common::{Axis, MovementIntent, SurfaceSize};
use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Something the frame loop has to react to after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSignal {
    /// The surface changed size; reconfigure and update the projection.
    Resized(SurfaceSize),
    /// Look capture turned on or off; show or hide the cursor.
    Capture(bool),
    /// Toggle the debug overlay.
    ToggleOverlay,
    Quit,
}

/// Input accumulated between frames.
#[derive(Debug)]
pub struct InputState {
    bindings: KeyBindings,
    held: HashSet<KeyCode>,
    look_delta: Vec2,
    capturing: bool,
    surface: SurfaceSize,
}

impl InputState {
    pub fn new(surface: SurfaceSize) -> Self {
        Self::with_bindings(KeyBindings::default(), surface)
    }

    pub fn with_bindings(bindings: KeyBindings, surface: SurfaceSize) -> Self {
        Self {
            bindings,
            held: HashSet::new(),
            look_delta: Vec2::ZERO,
            capturing: false,
            surface,
        }
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Route a window event. Returns a signal when the frame loop must act.
    pub fn on_window_event(&mut self, event: &WindowEvent) -> Option<FrameSignal> {
        match event {
            WindowEvent::CloseRequested => Some(FrameSignal::Quit),
            WindowEvent::Resized(size) => Some(self.resize(size.width, size.height)),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => self.key(*code, *state == ElementState::Pressed, *repeat),
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state,
                ..
            } => self.set_capture(*state == ElementState::Pressed),
            WindowEvent::Focused(false) => {
                self.held.clear();
                self.set_capture(false)
            }
            _ => None,
        }
    }

    /// Record a key transition.
    pub fn key(&mut self, code: KeyCode, pressed: bool, repeat: bool) -> Option<FrameSignal> {
        if !pressed {
            self.held.remove(&code);
            return None;
        }
        self.held.insert(code);
        match code {
            KeyCode::Escape => Some(FrameSignal::Quit),
            KeyCode::F1 if !repeat => Some(FrameSignal::ToggleOverlay),
            _ => None,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) -> FrameSignal {
        self.surface = SurfaceSize::new(width, height);
        tracing::debug!(
            width = self.surface.width,
            height = self.surface.height,
            "surface resized"
        );
        FrameSignal::Resized(self.surface)
    }

    /// Returns a signal only when the capture state actually flips.
    pub fn set_capture(&mut self, capture: bool) -> Option<FrameSignal> {
        if self.capturing == capture {
            return None;
        }
        self.capturing = capture;
        if !capture {
            self.look_delta = Vec2::ZERO;
        }
        Some(FrameSignal::Capture(capture))
    }

    /// Raw device motion, in the windowing system's units (y down).
    pub fn on_mouse_motion(&mut self, dx: f64, dy: f64) {
        if self.capturing {
            self.look_delta += Vec2::new(dx as f32, dy as f32);
        }
    }

    /// Mouse motion since the last call, with y flipped so positive looks up.
    pub fn take_look_delta(&mut self) -> Vec2 {
        let delta = std::mem::take(&mut self.look_delta);
        Vec2::new(delta.x, -delta.y)
    }

    fn bound(&self, binding: Binding) -> bool {
        self.held
            .iter()
            .any(|&code| self.bindings.get(code) == Some(binding))
    }

    /// Movement requested by the currently held keys.
    pub fn intent(&self) -> MovementIntent {
        MovementIntent::new(
            Axis::from_keys(self.bound(Binding::Forward), self.bound(Binding::Back)),
            Axis::from_keys(self.bound(Binding::Right), self.bound(Binding::Left)),
            Axis::from_keys(self.bound(Binding::Up), self.bound(Binding::Down)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalSize;

    fn input() -> InputState {
        InputState::new(SurfaceSize::default())
    }

    #[test]
    fn held_keys_become_intent() {
        let mut input = input();
        assert!(input.intent().is_idle());

        input.key(KeyCode::KeyW, true, false);
        input.key(KeyCode::KeyA, true, false);
        let intent = input.intent();
        assert_eq!(intent.forward, Axis::Positive);
        assert_eq!(intent.right, Axis::Negative);
        assert_eq!(intent.up, Axis::Zero);

        input.key(KeyCode::KeyW, false, false);
        assert_eq!(input.intent().forward, Axis::Zero);
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut input = input();
        input.key(KeyCode::Space, true, false);
        input.key(KeyCode::ShiftLeft, true, false);
        assert_eq!(input.intent().up, Axis::Zero);
    }

    #[test]
    fn escape_and_close_quit() {
        let mut input = input();
        assert_eq!(input.key(KeyCode::Escape, true, false), Some(FrameSignal::Quit));
        assert_eq!(
            input.on_window_event(&WindowEvent::CloseRequested),
            Some(FrameSignal::Quit)
        );
    }

    #[test]
    fn f1_toggles_once_per_press() {
        let mut input = input();
        assert_eq!(input.key(KeyCode::F1, true, false), Some(FrameSignal::ToggleOverlay));
        assert_eq!(input.key(KeyCode::F1, true, true), None);
    }

    #[test]
    fn resize_returns_new_size() {
        let mut input = input();
        let signal = input.on_window_event(&WindowEvent::Resized(PhysicalSize::new(800, 600)));
        let expected = SurfaceSize::new(800, 600);
        assert_eq!(signal, Some(FrameSignal::Resized(expected)));
        assert_eq!(input.surface(), expected);

        let minimised = input.on_window_event(&WindowEvent::Resized(PhysicalSize::new(0, 0)));
        assert_eq!(minimised, Some(FrameSignal::Resized(SurfaceSize::new(1, 1))));
    }

    #[test]
    fn mouse_motion_only_counts_while_capturing() {
        let mut input = input();
        input.on_mouse_motion(5.0, 5.0);
        assert_eq!(input.take_look_delta(), Vec2::ZERO);

        assert_eq!(input.set_capture(true), Some(FrameSignal::Capture(true)));
        assert_eq!(input.set_capture(true), None);
        input.on_mouse_motion(3.0, 4.0);
        input.on_mouse_motion(1.0, -1.0);
        assert_eq!(input.take_look_delta(), Vec2::new(4.0, -3.0));
        assert_eq!(input.take_look_delta(), Vec2::ZERO);
    }

    #[test]
    fn losing_focus_releases_everything() {
        let mut input = input();
        input.key(KeyCode::KeyW, true, false);
        input.set_capture(true);
        input.on_mouse_motion(2.0, 2.0);

        let signal = input.on_window_event(&WindowEvent::Focused(false));
        assert_eq!(signal, Some(FrameSignal::Capture(false)));
        assert!(input.intent().is_idle());
        assert_eq!(input.take_look_delta(), Vec2::ZERO);
    }

    #[test]
    fn custom_bindings() {
        let mut bindings = KeyBindings::empty();
        bindings.bind(KeyCode::ArrowUp, Binding::Forward);
        let mut input = InputState::with_bindings(bindings, SurfaceSize::default());
        input.key(KeyCode::KeyW, true, false);
        assert!(input.intent().is_idle());
        input.key(KeyCode::ArrowUp, true, false);
        assert_eq!(input.intent().forward, Axis::Positive);
    }
}
