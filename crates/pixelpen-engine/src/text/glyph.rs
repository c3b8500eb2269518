use std::fmt;

/// Side length, in pixels, of the square every glyph is rasterized into.
///
/// Each atlas layer is exactly this size; layout uses it to place the glyph
/// square relative to the baseline.
pub const GLYPH_BOX_SIZE: u32 = 256;

/// Nominal point size the atlas is displayed at when `scale == 1.0`.
pub const FIXED_POINT_SIZE: f32 = 48.0;

/// Number of character codes held by the atlas (ASCII `0..128`).
pub const GLYPH_COUNT: u32 = 128;

/// Metrics and atlas placement for one character.
///
/// Coordinates follow the rasterizer convention: `bearing.1` is the distance
/// from the baseline up to the top edge of the bitmap.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Glyph {
    pub code: char,
    /// Layer of the glyph texture array holding this glyph's bitmap.
    pub atlas_layer: u32,
    /// Bitmap size `(width, height)` in pixels.
    pub size: (u32, u32),
    /// `(left, top)` offset of the bitmap from the pen on the baseline.
    pub bearing: (i32, i32),
    /// Horizontal pen advance in 1/64 pixel units.
    pub advance_units: u32,
}

impl Glyph {
    /// Whole-pixel advance, as the layout engine consumes it.
    #[inline]
    pub fn advance_px(&self) -> u32 {
        self.advance_units >> 6
    }
}

/// 8-bit coverage raster for one glyph, clipped to the glyph box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    /// Row-major, top row first, one byte per pixel.
    pub pixels: Vec<u8>,
}

impl GlyphBitmap {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A character code has no entry in the atlas.
///
/// Recoverable: the layout engine skips the character and keeps going.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GlyphLookupMiss(pub char);

impl fmt::Display for GlyphLookupMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no glyph for {:?} (U+{:04X})", self.0, self.0 as u32)
    }
}

impl std::error::Error for GlyphLookupMiss {}
