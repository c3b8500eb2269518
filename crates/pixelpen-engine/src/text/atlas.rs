use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::glyph::{Glyph, GlyphBitmap, GlyphLookupMiss, GLYPH_BOX_SIZE, GLYPH_COUNT};

/// Error returned by [`GlyphAtlas::load`] and [`GlyphAtlas::load_file`].
#[derive(Debug, thiserror::Error)]
pub enum FontLoadError {
    #[error("failed to read font file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse font: {0}")]
    Parse(String),
}

/// Character code → glyph metrics, plus the bitmaps backing each atlas layer.
///
/// Built once at startup. Glyph `c` for `c` in `0..128` lives in layer `c`.
/// The GPU side (a layered `R8Unorm` texture) is created by
/// [`TextRenderer`](crate::render::text::TextRenderer) from [`bitmaps`](Self::bitmaps).
#[derive(Debug, Default)]
pub struct GlyphAtlas {
    glyphs: HashMap<char, Glyph>,
    bitmaps: Vec<GlyphBitmap>,
}

impl GlyphAtlas {
    /// Parses a TrueType/OpenType font and rasterizes ASCII `0..128` at
    /// [`GLYPH_BOX_SIZE`] pixels.
    pub fn load(font_bytes: &[u8]) -> Result<Self, FontLoadError> {
        let font = fontdue::Font::from_bytes(font_bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError::Parse(e.to_string()))?;

        let px = GLYPH_BOX_SIZE as f32;
        let mut glyphs = HashMap::with_capacity(GLYPH_COUNT as usize);
        let mut bitmaps = Vec::with_capacity(GLYPH_COUNT as usize);

        for layer in 0..GLYPH_COUNT {
            // 0..128 is always a valid scalar value.
            let Some(code) = char::from_u32(layer) else { continue };
            let (metrics, coverage) = font.rasterize(code, px);

            let bitmap = clip_to_box(&coverage, metrics.width as u32, metrics.height as u32);
            glyphs.insert(code, glyph_from_metrics(code, layer, &metrics, &bitmap));
            bitmaps.push(bitmap);
        }

        log::info!("glyph atlas built: {} glyphs at {GLYPH_BOX_SIZE}px", glyphs.len());
        Ok(Self { glyphs, bitmaps })
    }

    /// Reads `path` and forwards to [`load`](Self::load).
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, FontLoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| FontLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded font {} ({} bytes)", path.display(), bytes.len());
        Self::load(&bytes)
    }

    /// Builds an atlas from precomputed metrics, without bitmaps.
    ///
    /// Later entries replace earlier ones with the same code.
    pub fn from_glyphs(glyphs: impl IntoIterator<Item = Glyph>) -> Self {
        Self {
            glyphs: glyphs.into_iter().map(|g| (g.code, g)).collect(),
            bitmaps: Vec::new(),
        }
    }

    pub fn lookup(&self, code: char) -> Result<&Glyph, GlyphLookupMiss> {
        self.glyphs.get(&code).ok_or(GlyphLookupMiss(code))
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Bitmaps indexed by atlas layer. Empty for atlases built with
    /// [`from_glyphs`](Self::from_glyphs).
    pub fn bitmaps(&self) -> &[GlyphBitmap] {
        &self.bitmaps
    }
}

/// Converts rasterizer metrics (bottom-left origin, +Y up) into a [`Glyph`].
///
/// `size` comes from the clipped bitmap; the bearing keeps the unclipped
/// height so the baseline stays put.
fn glyph_from_metrics(code: char, layer: u32, metrics: &fontdue::Metrics, bitmap: &GlyphBitmap) -> Glyph {
    Glyph {
        code,
        atlas_layer: layer,
        size: (bitmap.width, bitmap.height),
        bearing: (metrics.xmin, metrics.ymin + metrics.height as i32),
        advance_units: (metrics.advance_width.max(0.0) * 64.0).round() as u32,
    }
}

fn clip_to_box(coverage: &[u8], width: u32, height: u32) -> GlyphBitmap {
    if width == 0 || height == 0 {
        return GlyphBitmap::default();
    }
    if width <= GLYPH_BOX_SIZE && height <= GLYPH_BOX_SIZE {
        return GlyphBitmap { width, height, pixels: coverage.to_vec() };
    }

    let w = width.min(GLYPH_BOX_SIZE);
    let h = height.min(GLYPH_BOX_SIZE);
    let mut pixels = Vec::with_capacity((w * h) as usize);
    for row in coverage.chunks_exact(width as usize).take(h as usize) {
        pixels.extend_from_slice(&row[..w as usize]);
    }
    GlyphBitmap { width: w, height: h, pixels }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(code: char, w: u32, h: u32, adv_px: u32) -> Glyph {
        Glyph {
            code,
            atlas_layer: code as u32,
            size: (w, h),
            bearing: (1, h as i32),
            advance_units: adv_px << 6,
        }
    }

    fn ascii_atlas() -> GlyphAtlas {
        GlyphAtlas::from_glyphs((0u8..128).map(|c| glyph(c as char, 20, 30, 24)))
    }

    #[test]
    fn lookup_hits_loaded_code() {
        let atlas = ascii_atlas();
        let g = atlas.lookup('A').unwrap();
        assert_eq!(g.atlas_layer, 65);
        assert_eq!(g.size, (20, 30));
    }

    #[test]
    fn lookup_outside_loaded_range_is_a_miss() {
        let atlas = ascii_atlas();
        assert_eq!(atlas.lookup('\u{80}'), Err(GlyphLookupMiss('\u{80}')));
        assert!(atlas.lookup('é').is_err());
    }

    #[test]
    fn from_glyphs_has_no_bitmaps() {
        let atlas = ascii_atlas();
        assert_eq!(atlas.len(), 128);
        assert!(atlas.bitmaps().is_empty());
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        let err = GlyphAtlas::load(b"definitely not a font").unwrap_err();
        assert!(matches!(err, FontLoadError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = GlyphAtlas::load_file("/nonexistent/pixelpen/font.ttf").unwrap_err();
        match err {
            FontLoadError::Io { path, .. } => assert!(path.ends_with("font.ttf")),
            other => panic!("unexpected error: {other}"),
        }
    }

    // ── metrics ───────────────────────────────────────────────────────────

    fn metrics(xmin: i32, ymin: i32, width: usize, height: usize, advance: f32) -> fontdue::Metrics {
        fontdue::Metrics {
            xmin,
            ymin,
            width,
            height,
            advance_width: advance,
            ..Default::default()
        }
    }

    #[test]
    fn metrics_map_to_bearing_and_advance() {
        let m = metrics(3, 0, 20, 30, 24.0);
        let bitmap = clip_to_box(&vec![0; 20 * 30], 20, 30);
        let g = glyph_from_metrics('A', 65, &m, &bitmap);
        assert_eq!(g.atlas_layer, 65);
        assert_eq!(g.size, (20, 30));
        assert_eq!(g.bearing, (3, 30));
        assert_eq!(g.advance_units, 24 * 64);
        assert_eq!(g.advance_px(), 24);
    }

    #[test]
    fn descender_lowers_bearing_top() {
        // 'g'-like glyph hanging 12px below the baseline.
        let m = metrics(-1, -12, 18, 40, 19.0);
        let bitmap = clip_to_box(&vec![0; 18 * 40], 18, 40);
        let g = glyph_from_metrics('g', 103, &m, &bitmap);
        assert_eq!(g.bearing, (-1, 28));
    }

    #[test]
    fn fractional_advance_rounds_to_nearest_unit() {
        let empty = GlyphBitmap::default();
        // 10.3 * 64 = 659.2, 10.6 * 64 = 678.4, 10.5078125 * 64 = 672.5
        assert_eq!(glyph_from_metrics('i', 105, &metrics(0, 0, 0, 0, 10.3), &empty).advance_units, 659);
        assert_eq!(glyph_from_metrics('i', 105, &metrics(0, 0, 0, 0, 10.6), &empty).advance_units, 678);
        assert_eq!(glyph_from_metrics('i', 105, &metrics(0, 0, 0, 0, 10.5078125), &empty).advance_units, 673);
        assert_eq!(glyph_from_metrics('i', 105, &metrics(0, 0, 0, 0, -2.0), &empty).advance_units, 0);
    }

    #[test]
    fn size_follows_clipped_bitmap() {
        let w = GLYPH_BOX_SIZE + 10;
        let m = metrics(0, 0, w as usize, 40, 300.0);
        let bitmap = clip_to_box(&vec![0; (w * 40) as usize], w, 40);
        let g = glyph_from_metrics('W', 87, &m, &bitmap);
        assert_eq!(g.size, (GLYPH_BOX_SIZE, 40));
        assert_eq!(g.bearing.1, 40);
    }

    // ── clipping ──────────────────────────────────────────────────────────

    #[test]
    fn small_bitmap_is_kept_verbatim() {
        let b = clip_to_box(&[1, 2, 3, 4, 5, 6], 3, 2);
        assert_eq!(b.width, 3);
        assert_eq!(b.height, 2);
        assert_eq!(b.pixels, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn oversized_bitmap_is_clipped_to_box() {
        let w = GLYPH_BOX_SIZE + 4;
        let h = GLYPH_BOX_SIZE + 2;
        let coverage = vec![7u8; (w * h) as usize];
        let b = clip_to_box(&coverage, w, h);
        assert_eq!((b.width, b.height), (GLYPH_BOX_SIZE, GLYPH_BOX_SIZE));
        assert_eq!(b.pixels.len(), (GLYPH_BOX_SIZE * GLYPH_BOX_SIZE) as usize);
    }
}
