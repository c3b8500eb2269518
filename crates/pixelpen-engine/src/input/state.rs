use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState};

/// Read-only view of which keys are currently held.
///
/// Update logic depends on this instead of the window so it can be driven by
/// a fake in tests.
pub trait KeyInput {
    fn is_key_held(&self, key: Key) -> bool;
}

/// Current keyboard state for the window.
///
/// Holds "is down" information; per-frame transitions go to an `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies a platform-agnostic input event and records transitions in `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Focus loss drops held keys so nothing sticks.
                    self.keys_down.clear();
                }
            }

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(*key) {
                        frame.keys_pressed.insert(*key);
                    }
                }
                KeyState::Released => {
                    if self.keys_down.remove(key) {
                        frame.keys_released.insert(*key);
                    }
                }
            },
        }

        frame.push_event(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

impl KeyInput for InputState {
    fn is_key_held(&self, key: Key) -> bool {
        self.key_down(key)
    }
}

impl KeyInput for HashSet<Key> {
    fn is_key_held(&self, key: Key) -> bool {
        self.contains(&key)
    }
}
