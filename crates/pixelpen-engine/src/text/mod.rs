//! Bitmap text: glyph atlas, pen-based layout and bounded instance batches.
//!
//! Layout is CPU-only and GPU-agnostic. Finished batches are handed to an
//! [`InstanceSink`]; [`TextRenderer`](crate::render::text::TextRenderer) is the
//! GPU implementation.

mod atlas;
mod batch;
mod glyph;
mod layout;

pub use atlas::{FontLoadError, GlyphAtlas};
pub use batch::{InstanceBatch, BATCH_CAPACITY};
pub use glyph::{Glyph, GlyphBitmap, GlyphLookupMiss, FIXED_POINT_SIZE, GLYPH_BOX_SIZE, GLYPH_COUNT};
pub use layout::{effective_scale, GlyphInstance, InstanceSink, LayoutStats, TextLayout, LINE_SPACING};
