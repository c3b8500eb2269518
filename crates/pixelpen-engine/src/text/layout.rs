use std::collections::HashSet;

use crate::paint::Color;

use super::atlas::GlyphAtlas;
use super::batch::{InstanceBatch, BATCH_CAPACITY};
use super::glyph::{FIXED_POINT_SIZE, GLYPH_BOX_SIZE};

/// Line advance as a multiple of the newline glyph's height.
pub const LINE_SPACING: f32 = 1.3;

/// One glyph quad to draw: the glyph box placed in pixel space.
///
/// `position` is the bottom-left corner of the `box_size`-sided square that
/// holds the glyph's atlas layer (pixel space, +Y up).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphInstance {
    pub position: [f32; 2],
    pub box_size: f32,
    pub atlas_layer: u32,
}

/// Receiver of finished batches.
///
/// `flush` is called with the live instances of one batch (never empty) and
/// must issue exactly one draw for them.
pub trait InstanceSink {
    fn flush(&mut self, instances: &[GlyphInstance], color: Color);
}

/// Counters for a single [`TextLayout::layout`] call.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LayoutStats {
    /// Glyph instances emitted.
    pub instances: usize,
    /// Batches handed to the sink.
    pub flushes: usize,
    /// Characters skipped because the atlas had no entry.
    pub misses: usize,
}

/// Converts a caller-facing text scale into the pixel scale applied to
/// atlas metrics.
#[inline]
pub fn effective_scale(scale: f32) -> f32 {
    scale * (FIXED_POINT_SIZE / GLYPH_BOX_SIZE as f32)
}

/// Pen-based text layout feeding a bounded instance batch.
///
/// Every call starts from an empty batch and a fresh pen, so repeated calls
/// with the same arguments produce the same instances. A batch is flushed as
/// soon as it holds `capacity - 1` instances, and once more at the end of the
/// text if anything is left.
pub struct TextLayout {
    batch: InstanceBatch<GlyphInstance>,
    flush_at: usize,
    warned_missing: HashSet<char>,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self::with_capacity(BATCH_CAPACITY)
    }
}

impl TextLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let batch = InstanceBatch::with_capacity(capacity);
        let flush_at = batch.capacity().saturating_sub(1).max(1);
        Self { batch, flush_at, warned_missing: HashSet::new() }
    }

    /// Number of instances that triggers a mid-text flush.
    #[inline]
    pub fn flush_threshold(&self) -> usize {
        self.flush_at
    }

    /// Lays out `text` with its first baseline at `(origin_x, origin_y)` and
    /// hands the resulting instances to `sink` in bounded batches.
    pub fn layout<S>(
        &mut self,
        atlas: &GlyphAtlas,
        text: &str,
        origin_x: f32,
        origin_y: f32,
        scale: f32,
        color: Color,
        sink: &mut S,
    ) -> LayoutStats
    where
        S: InstanceSink + ?Sized,
    {
        let s = effective_scale(scale);
        let box_px = GLYPH_BOX_SIZE as f32;

        let mut stats = LayoutStats::default();
        let mut x = origin_x;
        let mut y = origin_y;
        self.batch.clear();

        for ch in text.chars() {
            if ch == '\n' {
                let height = atlas
                    .lookup('\n')
                    .map(|g| g.size.1)
                    .ok()
                    .filter(|h| *h > 0)
                    .unwrap_or(GLYPH_BOX_SIZE);
                x = origin_x;
                y -= height as f32 * LINE_SPACING * s;
                continue;
            }

            let glyph = match atlas.lookup(ch) {
                Ok(g) => g,
                Err(miss) => {
                    stats.misses += 1;
                    if self.warned_missing.insert(ch) {
                        log::warn!("text layout: {miss}; skipping");
                    }
                    continue;
                }
            };

            let advance = glyph.advance_px() as f32 * s;
            if ch == ' ' {
                x += advance;
                continue;
            }

            let xpos = x + glyph.bearing.0 as f32 * s;
            let ypos = y - (box_px - glyph.bearing.1 as f32) * s;

            let instance = GlyphInstance {
                position: [xpos, ypos],
                box_size: box_px * s,
                atlas_layer: glyph.atlas_layer,
            };
            if let Err(instance) = self.batch.push(instance) {
                // Full batch: hand it off and retry into the emptied buffer.
                self.flush(color, sink, &mut stats);
                if self.batch.push(instance).is_err() {
                    log::error!("text layout: batch rejected {ch:?} after flush; dropping it");
                    continue;
                }
            }
            stats.instances += 1;
            x += advance;

            if self.batch.len() >= self.flush_at {
                self.flush(color, sink, &mut stats);
            }
        }

        self.flush(color, sink, &mut stats);
        stats
    }

    fn flush<S>(&mut self, color: Color, sink: &mut S, stats: &mut LayoutStats)
    where
        S: InstanceSink + ?Sized,
    {
        if self.batch.is_empty() {
            return;
        }
        log::trace!("text layout: flushing {} instances", self.batch.len());
        sink.flush(self.batch.as_slice(), color);
        self.batch.clear();
        stats.flushes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::glyph::Glyph;
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct Recorder {
        batches: Vec<(Vec<GlyphInstance>, Color)>,
    }

    impl Recorder {
        fn all(&self) -> Vec<GlyphInstance> {
            self.batches.iter().flat_map(|(b, _)| b.iter().copied()).collect()
        }
    }

    impl InstanceSink for Recorder {
        fn flush(&mut self, instances: &[GlyphInstance], color: Color) {
            assert!(!instances.is_empty(), "sink flushed with an empty batch");
            self.batches.push((instances.to_vec(), color));
        }
    }

    fn glyph(code: char, size: (u32, u32), bearing: (i32, i32), adv_px: u32) -> Glyph {
        Glyph {
            code,
            atlas_layer: code as u32,
            size,
            bearing,
            advance_units: adv_px << 6,
        }
    }

    /// Every printable ASCII glyph is 100×150 with a 10px left bearing and a
    /// 140px advance; space advances 60px; newline is 0×0 (like most fonts).
    fn atlas() -> GlyphAtlas {
        GlyphAtlas::from_glyphs((0u8..128).map(|c| match c as char {
            ' ' => glyph(' ', (0, 0), (0, 0), 60),
            '\n' => glyph('\n', (0, 0), (0, 0), 0),
            'g' => glyph('g', (90, 200), (8, 150), 120),
            ch => glyph(ch, (100, 150), (10, 150), 140),
        }))
    }

    fn run(text: &str) -> (Recorder, LayoutStats) {
        let mut rec = Recorder::default();
        let stats = TextLayout::new().layout(&atlas(), text, 25.0, 500.0, 1.0, Color::white(), &mut rec);
        (rec, stats)
    }

    // ── batching ──────────────────────────────────────────────────────────

    #[test]
    fn short_text_flushes_once_at_end() {
        let (rec, stats) = run("Hello");
        assert_eq!(rec.batches.len(), 1);
        assert_eq!(rec.batches[0].0.len(), 5);
        assert_eq!(stats, LayoutStats { instances: 5, flushes: 1, misses: 0 });
    }

    #[test]
    fn empty_and_blank_text_never_flush() {
        for text in ["", "   ", "\n\n", " \n "] {
            let (rec, stats) = run(text);
            assert!(rec.batches.is_empty(), "{text:?}");
            assert_eq!(stats.flushes, 0);
        }
    }

    #[test]
    fn flush_threshold_is_one_below_capacity() {
        assert_eq!(TextLayout::new().flush_threshold(), BATCH_CAPACITY - 1);
        assert_eq!(TextLayout::with_capacity(1).flush_threshold(), 1);
    }

    #[test]
    fn flush_count_matches_ceil_over_threshold() {
        let per_batch = BATCH_CAPACITY - 1;
        for n in [1, per_batch - 1, per_batch, per_batch + 1, 2 * per_batch, 1000] {
            let text = "x".repeat(n);
            let (rec, stats) = run(&text);

            let expected_flushes = n.div_ceil(per_batch);
            assert_eq!(rec.batches.len(), expected_flushes, "n = {n}");
            assert_eq!(stats.flushes, expected_flushes);

            let last = rec.batches.last().map(|(b, _)| b.len()).unwrap();
            let expected_last = match n % per_batch {
                0 => per_batch,
                r => r,
            };
            assert_eq!(last, expected_last, "n = {n}");
            assert!(rec.batches.iter().all(|(b, _)| b.len() <= per_batch));
        }
    }

    #[test]
    fn spaces_and_newlines_do_not_count_towards_batches() {
        let per_batch = BATCH_CAPACITY - 1;
        let text: String = "ab \n".repeat(per_batch);
        let (rec, stats) = run(&text);
        assert_eq!(stats.instances, 2 * per_batch);
        assert_eq!(rec.batches.len(), 2);
    }

    #[test]
    fn small_capacity_splits_batches() {
        let mut rec = Recorder::default();
        let mut layout = TextLayout::with_capacity(4);
        let stats = layout.layout(&atlas(), "abcdefg", 0.0, 0.0, 1.0, Color::white(), &mut rec);
        let sizes: Vec<_> = rec.batches.iter().map(|(b, _)| b.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(stats.flushes, 3);
    }

    #[test]
    fn single_slot_batch_flushes_every_glyph_without_loss() {
        let mut rec = Recorder::default();
        let mut layout = TextLayout::with_capacity(1);
        let stats = layout.layout(&atlas(), "abc d", 0.0, 0.0, 1.0, Color::white(), &mut rec);
        let sizes: Vec<_> = rec.batches.iter().map(|(b, _)| b.len()).collect();
        assert_eq!(sizes, vec![1, 1, 1, 1]);
        assert_eq!(stats.instances, 4);
        assert_eq!(stats.flushes, 4);
        assert_eq!(rec.all().len(), 4);
    }

    #[test]
    fn color_is_forwarded_with_every_batch() {
        let red = Color::from_straight(1.0, 0.0, 0.0, 1.0);
        let mut rec = Recorder::default();
        let text = "y".repeat(BATCH_CAPACITY + 10);
        TextLayout::new().layout(&atlas(), &text, 0.0, 0.0, 0.5, red, &mut rec);
        assert_eq!(rec.batches.len(), 2);
        assert!(rec.batches.iter().all(|(_, c)| *c == red));
    }

    // ── pen movement ──────────────────────────────────────────────────────

    #[test]
    fn instance_is_placed_from_bearing_and_box() {
        let (rec, _) = run("g");
        let s = effective_scale(1.0);
        let inst = rec.all()[0];
        assert_relative_eq!(inst.position[0], 25.0 + 8.0 * s);
        assert_relative_eq!(inst.position[1], 500.0 - (256.0 - 150.0) * s);
        assert_relative_eq!(inst.box_size, 256.0 * s);
        assert_eq!(inst.atlas_layer, 'g' as u32);
    }

    #[test]
    fn caller_scale_is_logical_size() {
        assert_relative_eq!(effective_scale(1.0), 48.0 / 256.0);
        assert_relative_eq!(effective_scale(2.0), 2.0 * 48.0 / 256.0);
    }

    #[test]
    fn space_advances_pen_without_instance() {
        let (rec, stats) = run("A B");
        assert_eq!(rec.batches.len(), 1);
        assert_eq!(stats.instances, 2);

        let s = effective_scale(1.0);
        let all = rec.all();
        let (a, b) = (all[0], all[1]);
        let gap = b.position[0] - a.position[0];
        assert_relative_eq!(gap, (140.0 + 60.0) * s, epsilon = 1e-4);
        assert!(gap >= (140.0 + 60.0 - 10.0) * s);
        assert_relative_eq!(a.position[1], b.position[1]);
    }

    #[test]
    fn newline_moves_down_and_resets_column() {
        let (rec, _) = run("ab\ncd");
        let all = rec.all();
        assert_eq!(all.len(), 4);
        let (a, c) = (all[0], all[2]);
        assert!(c.position[1] < a.position[1]);
        assert_relative_eq!(c.position[0], a.position[0]);
    }

    #[test]
    fn newline_advance_uses_newline_glyph_height() {
        let s = effective_scale(1.0);
        let mut glyphs: Vec<Glyph> = (b'a'..=b'z').map(|c| glyph(c as char, (100, 150), (10, 150), 140)).collect();
        glyphs.push(glyph('\n', (40, 80), (0, 80), 0));
        let atlas = GlyphAtlas::from_glyphs(glyphs);

        let mut rec = Recorder::default();
        TextLayout::new().layout(&atlas, "a\na", 0.0, 300.0, 1.0, Color::white(), &mut rec);
        let all = rec.all();
        assert_relative_eq!(all[0].position[1] - all[1].position[1], 80.0 * LINE_SPACING * s, epsilon = 1e-4);
    }

    #[test]
    fn empty_newline_glyph_falls_back_to_box_height() {
        let s = effective_scale(1.0);
        let (rec, _) = run("a\na");
        let all = rec.all();
        assert_relative_eq!(all[0].position[1] - all[1].position[1], 256.0 * LINE_SPACING * s, epsilon = 1e-3);
    }

    // ── misses ────────────────────────────────────────────────────────────

    #[test]
    fn missing_glyphs_are_skipped() {
        let (rec, stats) = run("a\u{80}bé");
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.instances, 2);
        let all = rec.all();
        let s = effective_scale(1.0);
        // Skipped characters do not advance the pen.
        assert_relative_eq!(all[1].position[0] - all[0].position[0], 140.0 * s, epsilon = 1e-4);
    }

    #[test]
    fn empty_atlas_yields_nothing() {
        let mut rec = Recorder::default();
        let stats = TextLayout::new().layout(&GlyphAtlas::default(), "hi", 0.0, 0.0, 1.0, Color::white(), &mut rec);
        assert!(rec.batches.is_empty());
        assert_eq!(stats.misses, 2);
    }

    // ── determinism ───────────────────────────────────────────────────────

    #[test]
    fn repeated_calls_are_identical() {
        let atlas = atlas();
        let mut layout = TextLayout::new();
        let text = "The quick brown fox\njumps over the lazy dog";

        let mut first = Recorder::default();
        let mut second = Recorder::default();
        layout.layout(&atlas, text, 10.0, 700.0, 0.75, Color::white(), &mut first);
        layout.layout(&atlas, text, 10.0, 700.0, 0.75, Color::white(), &mut second);
        assert_eq!(first.all(), second.all());
    }
}
