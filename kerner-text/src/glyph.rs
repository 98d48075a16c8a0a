//! Glyph records: per-codepoint metrics plus a multi-size bitmap cache.
//!
//! Bitmaps are keyed by the pixel box they were rasterized into, not by
//! the font size that produced them. Two sizes (or two subpixel shifts)
//! that rasterize to the same `width × height` box share one bitmap.
//! The cache only grows; it is released with the owning font.

use rustc_hash::FxHashMap;

use crate::backend::{GlyphBitmap, GlyphIndex, HMetrics};

/// Cache key: rendered bitmap dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitmapKey {
    pub width: u32,
    pub height: u32,
}

impl BitmapKey {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn of(bitmap: &GlyphBitmap) -> Self {
        Self::new(bitmap.width, bitmap.height)
    }
}

/// One glyph of a [`crate::KerningFont`].
///
/// Index and horizontal metrics are resolved once at load time and are
/// size-independent (font units).
#[derive(Clone, Debug)]
pub struct GlyphRecord {
    pub codepoint: char,
    pub index: GlyphIndex,
    pub advance_width: f32,
    pub left_side_bearing: f32,
    bitmaps: FxHashMap<BitmapKey, GlyphBitmap>,
}

impl GlyphRecord {
    pub fn new(codepoint: char, index: GlyphIndex, metrics: HMetrics) -> Self {
        Self {
            codepoint,
            index,
            advance_width: metrics.advance_width,
            left_side_bearing: metrics.left_side_bearing,
            bitmaps: FxHashMap::default(),
        }
    }

    /// Number of cached bitmaps.
    pub fn bitmap_count(&self) -> usize {
        self.bitmaps.len()
    }

    pub fn has_bitmap(&self, key: BitmapKey) -> bool {
        self.bitmaps.contains_key(&key)
    }

    pub fn bitmap(&self, key: BitmapKey) -> Option<&GlyphBitmap> {
        self.bitmaps.get(&key)
    }

    /// Store `bitmap` under its own dimensions. The first bitmap stored
    /// for a key wins; later ones for the same key are discarded.
    ///
    /// Hands the bitmap back if the cache could not grow.
    pub fn insert_bitmap(&mut self, bitmap: GlyphBitmap) -> Result<(), GlyphBitmap> {
        let key = BitmapKey::of(&bitmap);
        if self.bitmaps.contains_key(&key) {
            return Ok(());
        }
        if self.bitmaps.try_reserve(1).is_err() {
            return Err(bitmap);
        }
        self.bitmaps.insert(key, bitmap);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(width: u32, height: u32, value: u8) -> GlyphBitmap {
        GlyphBitmap {
            width,
            height,
            pixels: vec![value; (width * height) as usize],
        }
    }

    fn record() -> GlyphRecord {
        GlyphRecord::new(
            'a',
            GlyphIndex(68),
            HMetrics { advance_width: 512.0, left_side_bearing: 64.0 },
        )
    }

    #[test]
    fn test_new_record_has_no_bitmaps() {
        let r = record();
        assert_eq!(r.bitmap_count(), 0);
        assert_eq!(r.advance_width, 512.0);
        assert!(r.bitmap(BitmapKey::new(1, 1)).is_none());
    }

    #[test]
    fn test_lookup_by_box() {
        let mut r = record();
        r.insert_bitmap(filled(12, 20, 7)).unwrap();
        r.insert_bitmap(filled(24, 40, 9)).unwrap();
        assert_eq!(r.bitmap_count(), 2);
        assert_eq!(r.bitmap(BitmapKey::new(24, 40)).unwrap().pixels[0], 9);
        assert!(r.has_bitmap(BitmapKey::new(12, 20)));
        assert!(!r.has_bitmap(BitmapKey::new(12, 21)));
    }

    #[test]
    fn test_first_bitmap_for_a_box_wins() {
        let mut r = record();
        r.insert_bitmap(filled(10, 10, 1)).unwrap();
        r.insert_bitmap(filled(10, 10, 2)).unwrap();
        assert_eq!(r.bitmap_count(), 1);
        assert_eq!(r.bitmap(BitmapKey::new(10, 10)).unwrap().pixels[0], 1);
    }
}
