//! Keyboard input.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates window events into `InputEvent`s.

mod frame;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::{InputState, KeyInput};
pub use types::{InputEvent, Key, KeyState};
