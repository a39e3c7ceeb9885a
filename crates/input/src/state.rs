use glam::Vec2;
use std::collections::HashSet;

/// Keyboard keys the engine distinguishes. Printable keys arrive as
/// lowercase characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Space,
    Enter,
    Escape,
    Tab,
    Shift,
    Control,
    Alt,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Primary,
    Secondary,
    Middle,
}

/// A raw event handed over by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Absolute pointer position in surface pixels.
    PointerMove { x: f32, y: f32 },
    ButtonDown(Button),
    ButtonUp(Button),
    /// Scroll amount; positive scrolls away from the user.
    Wheel(f32),
}

/// Input as seen by the current frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held_keys: HashSet<Key>,
    pressed_keys: HashSet<Key>,
    released_keys: HashSet<Key>,
    held_buttons: HashSet<Button>,
    pointer: Option<Vec2>,
    pointer_delta: Vec2,
    wheel: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                // Auto-repeat keydowns do not count as a new press.
                if self.held_keys.insert(key) {
                    self.pressed_keys.insert(key);
                }
            }
            InputEvent::KeyUp(key) => {
                if self.held_keys.remove(&key) {
                    self.released_keys.insert(key);
                }
            }
            InputEvent::PointerMove { x, y } => {
                let at = Vec2::new(x, y);
                if let Some(previous) = self.pointer {
                    self.pointer_delta += at - previous;
                }
                self.pointer = Some(at);
            }
            InputEvent::ButtonDown(button) => {
                self.held_buttons.insert(button);
            }
            InputEvent::ButtonUp(button) => {
                self.held_buttons.remove(&button);
            }
            InputEvent::Wheel(amount) => self.wheel += amount,
        }
    }

    /// Clear everything that only lasts one frame. Held keys and buttons
    /// and the pointer position carry over.
    pub fn end_frame(&mut self) {
        self.pressed_keys.clear();
        self.released_keys.clear();
        self.pointer_delta = Vec2::ZERO;
        self.wheel = 0.0;
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.held_keys.contains(&key)
    }

    /// Went down this frame.
    pub fn key_pressed(&self, key: Key) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Went up this frame.
    pub fn key_released(&self, key: Key) -> bool {
        self.released_keys.contains(&key)
    }

    pub fn is_button_down(&self, button: Button) -> bool {
        self.held_buttons.contains(&button)
    }

    /// Last known pointer position, if the pointer has moved at all.
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }

    pub fn wheel_delta(&self) -> f32 {
        self.wheel
    }
}
