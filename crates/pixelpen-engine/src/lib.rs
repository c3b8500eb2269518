//! pixelpen engine crate.
//!
//! Window + GPU runtime, input, and the two renderers the demo needs: bitmap
//! text from a layered glyph atlas and a single keyboard-driven sprite.

pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod sprite;
pub mod text;
pub mod time;
pub mod window;
