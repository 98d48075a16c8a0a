//! Collaborator interfaces: font metrics and glyph rasterization.
//!
//! The layout engine never parses font files itself. It asks a
//! [`FontMetrics`] provider for vertical/horizontal metrics, glyph
//! indices and kerning pairs, and a [`GlyphRasterizer`] for pixel boxes
//! and 8-bit coverage bitmaps. All metric values are in font units;
//! callers convert to pixels with [`FontMetrics::scale_for_pixel_height`].
//!
//! [`crate::outline::OutlineFont`] is the production implementation.

// ── Value types ─────────────────────────────────────────────────────

/// Index of a glyph inside a font. `0` is the `.notdef` glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlyphIndex(pub u16);

impl GlyphIndex {
    pub const NOTDEF: GlyphIndex = GlyphIndex(0);

    pub fn is_notdef(self) -> bool {
        self == Self::NOTDEF
    }
}

/// Font-unit → pixel scale factors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    pub x: f32,
    pub y: f32,
}

impl Scale {
    pub fn uniform(factor: f32) -> Self {
        Self { x: factor, y: factor }
    }
}

/// Fractional pixel offset applied before rasterization.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Shift {
    pub x: f32,
    pub y: f32,
}

impl Shift {
    pub const ZERO: Shift = Shift { x: 0.0, y: 0.0 };

    pub fn horizontal(x: f32) -> Self {
        Self { x, y: 0.0 }
    }
}

/// Vertical font metrics in font units. `descent` is negative below
/// the baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
}

/// Horizontal glyph metrics in font units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HMetrics {
    pub advance_width: f32,
    pub left_side_bearing: f32,
}

/// Integer pixel bounding box of a rasterized glyph, relative to the
/// glyph origin on the baseline (y grows downward, so `y0` is usually
/// negative).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl GlyphBox {
    #[inline]
    pub fn width(&self) -> u32 {
        (self.x1 - self.x0).max(0) as u32
    }

    #[inline]
    pub fn height(&self) -> u32 {
        (self.y1 - self.y0).max(0) as u32
    }
}

/// 8-bit coverage bitmap, row-major, `width * height` bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl GlyphBitmap {
    /// An empty bitmap for glyphs without an outline (space, `.notdef`
    /// in some fonts).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

// ── Traits ──────────────────────────────────────────────────────────

/// Font-metrics provider.
pub trait FontMetrics {
    /// Scale factor mapping font units to pixels so that
    /// `ascent - descent` spans `pixels`.
    fn scale_for_pixel_height(&self, pixels: f32) -> f32;

    fn v_metrics(&self) -> VMetrics;

    /// Glyph index for a codepoint; [`GlyphIndex::NOTDEF`] when the font
    /// has no glyph for it.
    fn glyph_index(&self, codepoint: char) -> GlyphIndex;

    fn h_metrics(&self, glyph: GlyphIndex) -> HMetrics;

    /// Kerning adjustment between two adjacent glyphs, in font units.
    fn kern_advance(&self, left: GlyphIndex, right: GlyphIndex) -> f32;
}

/// Glyph rasterizer.
pub trait GlyphRasterizer {
    /// Pixel box of `glyph` at `scale`, shifted by a subpixel offset.
    fn glyph_box_subpixel(&self, glyph: GlyphIndex, scale: Scale, shift: Shift) -> GlyphBox;

    /// Coverage bitmap of `glyph` at `scale`, shifted by a subpixel
    /// offset. Dimensions match [`GlyphRasterizer::glyph_box_subpixel`].
    ///
    /// Returns `None` only when the bitmap could not be produced (e.g.
    /// allocation failure). Glyphs without an outline yield an empty
    /// bitmap.
    fn rasterize_subpixel(&self, glyph: GlyphIndex, scale: Scale, shift: Shift) -> Option<GlyphBitmap>;

    fn glyph_box(&self, glyph: GlyphIndex, scale: Scale) -> GlyphBox {
        self.glyph_box_subpixel(glyph, scale, Shift::ZERO)
    }

    fn rasterize(&self, glyph: GlyphIndex, scale: Scale) -> Option<GlyphBitmap> {
        self.rasterize_subpixel(glyph, scale, Shift::ZERO)
    }
}

/// Everything a [`crate::KerningFont`] needs from its font handle.
pub trait FontBackend: FontMetrics + GlyphRasterizer {}

impl<T: FontMetrics + GlyphRasterizer> FontBackend for T {}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_box_dimensions() {
        let b = GlyphBox { x0: -2, y0: -10, x1: 6, y1: 3 };
        assert_eq!(b.width(), 8);
        assert_eq!(b.height(), 13);
    }

    #[test]
    fn test_inverted_box_is_empty() {
        let b = GlyphBox { x0: 4, y0: 0, x1: 2, y1: 0 };
        assert_eq!(b.width(), 0);
        assert_eq!(b.height(), 0);
    }

    #[test]
    fn test_notdef() {
        assert!(GlyphIndex::default().is_notdef());
        assert!(!GlyphIndex(36).is_notdef());
    }
}
