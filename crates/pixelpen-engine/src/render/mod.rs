//! GPU rendering subsystem.
//!
//! Each renderer owns its GPU resources (pipeline, buffers, bind group) and
//! draws into a [`RenderTarget`] with a load pass; the frame clear happens in
//! [`FrameCtx::render`](crate::core::FrameCtx::render).
//!
//! Convention:
//! - Text lives in pixel space (bottom-left origin, +Y up), see [`screen_projection`].
//! - Sprites live in world space, see [`WorldCamera`].

mod camera;
mod common;
mod ctx;
mod shader;
pub mod sprite;
pub mod text;
mod texture;

pub use camera::{screen_projection, WorldCamera};
pub use ctx::{RenderCtx, RenderTarget, Viewport};
pub use shader::{compile as compile_shader, ShaderCompileError};
pub use sprite::SpriteRenderer;
pub use text::{BatchQueue, TextFrame, TextRenderer};
pub use texture::{Texture, TextureLoadError};
