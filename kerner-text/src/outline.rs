//! `ab_glyph`-backed font handle: parses TTF/OTF data and implements
//! both collaborator traits.
//!
//! `ab_glyph` sizes glyphs by pixel height (`ascent − descent`), so a
//! font-unit scale factor `s` corresponds to `PxScale(s × height)`.
//!
//! Kerning comes from the legacy `kern` table only (`kern_unscaled`).
//! Fonts that carry pair kerning exclusively in GPOS lay out unkerned.

use ab_glyph::{point, Font, FontVec, GlyphId, PxScale};

use crate::backend::{
    FontMetrics, GlyphBitmap, GlyphBox, GlyphIndex, GlyphRasterizer, HMetrics, Scale, Shift,
    VMetrics,
};
use crate::error::KernError;

/// An owned, parsed font.
pub struct OutlineFont {
    font: FontVec,
    /// `ascent − descent` in font units.
    height: f32,
}

impl OutlineFont {
    /// Parse the face at `index` of a font file or collection.
    pub fn from_vec(data: Vec<u8>, index: u32) -> Result<Self, KernError> {
        let font = FontVec::try_from_vec_and_index(data, index)
            .map_err(|e| KernError::UnusableFont(e.to_string()))?;

        let height = font.height_unscaled();
        if !height.is_finite() || height <= 0.0 {
            return Err(KernError::UnusableFont(format!(
                "degenerate vertical metrics (height {height})"
            )));
        }

        Ok(Self { font, height })
    }

    pub fn glyph_count(&self) -> usize {
        self.font.glyph_count()
    }

    fn px_scale(&self, scale: Scale) -> PxScale {
        PxScale {
            x: scale.x * self.height,
            y: scale.y * self.height,
        }
    }

    fn outline(&self, glyph: GlyphIndex, scale: Scale, shift: Shift) -> Option<ab_glyph::OutlinedGlyph> {
        let g = GlyphId(glyph.0).with_scale_and_position(self.px_scale(scale), point(shift.x, shift.y));
        self.font.outline_glyph(g)
    }
}

impl FontMetrics for OutlineFont {
    fn scale_for_pixel_height(&self, pixels: f32) -> f32 {
        pixels / self.height
    }

    fn v_metrics(&self) -> VMetrics {
        VMetrics {
            ascent: self.font.ascent_unscaled(),
            descent: self.font.descent_unscaled(),
            line_gap: self.font.line_gap_unscaled(),
        }
    }

    fn glyph_index(&self, codepoint: char) -> GlyphIndex {
        GlyphIndex(self.font.glyph_id(codepoint).0)
    }

    fn h_metrics(&self, glyph: GlyphIndex) -> HMetrics {
        let id = GlyphId(glyph.0);
        HMetrics {
            advance_width: self.font.h_advance_unscaled(id),
            left_side_bearing: self.font.h_side_bearing_unscaled(id),
        }
    }

    fn kern_advance(&self, left: GlyphIndex, right: GlyphIndex) -> f32 {
        self.font.kern_unscaled(GlyphId(left.0), GlyphId(right.0))
    }
}

impl GlyphRasterizer for OutlineFont {
    fn glyph_box_subpixel(&self, glyph: GlyphIndex, scale: Scale, shift: Shift) -> GlyphBox {
        match self.outline(glyph, scale, shift) {
            Some(outlined) => {
                let bounds = outlined.px_bounds();
                GlyphBox {
                    x0: bounds.min.x as i32,
                    y0: bounds.min.y as i32,
                    x1: bounds.max.x as i32,
                    y1: bounds.max.y as i32,
                }
            }
            None => GlyphBox::default(),
        }
    }

    fn rasterize_subpixel(&self, glyph: GlyphIndex, scale: Scale, shift: Shift) -> Option<GlyphBitmap> {
        let outlined = match self.outline(glyph, scale, shift) {
            Some(outlined) => outlined,
            None => return Some(GlyphBitmap::empty()),
        };

        let bounds = outlined.px_bounds();
        let width = (bounds.max.x - bounds.min.x).max(0.0) as u32;
        let height = (bounds.max.y - bounds.min.y).max(0.0) as u32;
        let len = width as usize * height as usize;

        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).ok()?;
        pixels.resize(len, 0u8);

        outlined.draw(|x, y, coverage| {
            if x < width && y < height {
                pixels[(y * width + x) as usize] = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        });

        Some(GlyphBitmap { width, height, pixels })
    }
}

// ===================================================================
// Tests
// ===================================================================
