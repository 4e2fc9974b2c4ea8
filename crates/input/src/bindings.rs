use std::collections::HashMap;
use winit::keyboard::KeyCode;

/// A camera movement a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Forward,
    Back,
    Right,
    Left,
    Up,
    Down,
}

/// Physical key to movement binding table.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    keys: HashMap<KeyCode, Binding>,
}

impl Default for KeyBindings {
    /// WASD to walk, Space / left Shift to fly up and down.
    fn default() -> Self {
        let mut bindings = Self::empty();
        bindings.bind(KeyCode::KeyW, Binding::Forward);
        bindings.bind(KeyCode::KeyS, Binding::Back);
        bindings.bind(KeyCode::KeyD, Binding::Right);
        bindings.bind(KeyCode::KeyA, Binding::Left);
        bindings.bind(KeyCode::Space, Binding::Up);
        bindings.bind(KeyCode::ShiftLeft, Binding::Down);
        bindings
    }
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            keys: HashMap::new(),
        }
    }

    /// Bind `key`, replacing whatever it was bound to before.
    pub fn bind(&mut self, key: KeyCode, binding: Binding) -> Option<Binding> {
        self.keys.insert(key, binding)
    }

    pub fn unbind(&mut self, key: KeyCode) -> Option<Binding> {
        self.keys.remove(&key)
    }

    pub fn get(&self, key: KeyCode) -> Option<Binding> {
        self.keys.get(&key).copied()
    }
}
