//! Color model shared by the demo and the renderers.
//!
//! Colors are linear, premultiplied RGBA.

mod color;

pub use color::Color;
