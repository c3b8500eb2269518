//! The keyboard-driven sprite: transform, quad geometry and per-frame update.
//!
//! GPU upload and drawing live in [`render::sprite`](crate::render::sprite).

mod geometry;
mod set;
mod transform;

pub use geometry::{SheetTile, SpriteGeometry, SpriteVertex};
pub use set::SpriteInstanceSet;
pub use transform::Transform;
