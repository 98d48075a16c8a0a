//! Deterministic in-memory font for tests.
//!
//! Units: 1024 per em, ascent 768, descent −256, no line gap, so
//! `scale_for_pixel_height(64.0) == 1/16` and sizes like 60 and 32 give
//! exactly representable scales. Every printable ASCII glyph advances
//! 512 units with a 64-unit bearing and a 384 × 640 ink box; the space
//! advances 256, the tab 1024 and `W` 2048. `AV`/`VA` kern by −128.

use std::cell::{Cell, RefCell};

use crate::backend::{
    FontMetrics, GlyphBitmap, GlyphBox, GlyphIndex, GlyphRasterizer, HMetrics, Scale, Shift,
    VMetrics,
};

pub(crate) const INK_TOP: f32 = 640.0;

#[derive(Default)]
pub(crate) struct GridFont {
    pub rasterize_calls: Cell<usize>,
    pub shifts: RefCell<Vec<f32>>,
    pub fail_rasterize: Cell<bool>,
}

impl GridFont {
    pub fn new() -> Self {
        Self::default()
    }

    fn codepoint(glyph: GlyphIndex) -> Option<char> {
        char::from_u32(glyph.0 as u32)
    }

    fn ink_width(glyph: GlyphIndex) -> f32 {
        match Self::codepoint(glyph) {
            Some('W') => 1920.0,
            Some(' ') | Some('\t') | Some('\n') | None => 0.0,
            Some(_) if glyph.is_notdef() => 0.0,
            Some(_) => 384.0,
        }
    }
}

impl FontMetrics for GridFont {
    fn scale_for_pixel_height(&self, pixels: f32) -> f32 {
        pixels / 1024.0
    }

    fn v_metrics(&self) -> VMetrics {
        VMetrics { ascent: 768.0, descent: -256.0, line_gap: 0.0 }
    }

    fn glyph_index(&self, codepoint: char) -> GlyphIndex {
        match codepoint {
            '\t' | '\n' | ' '..='~' => GlyphIndex(codepoint as u16),
            _ => GlyphIndex::NOTDEF,
        }
    }

    fn h_metrics(&self, glyph: GlyphIndex) -> HMetrics {
        let (advance_width, left_side_bearing) = match Self::codepoint(glyph) {
            Some(' ') => (256.0, 0.0),
            Some('\t') => (1024.0, 0.0),
            Some('\n') => (0.0, 0.0),
            Some('W') => (2048.0, 64.0),
            _ => (512.0, 64.0),
        };
        HMetrics { advance_width, left_side_bearing }
    }

    fn kern_advance(&self, left: GlyphIndex, right: GlyphIndex) -> f32 {
        match (Self::codepoint(left), Self::codepoint(right)) {
            (Some('A'), Some('V')) | (Some('V'), Some('A')) => -128.0,
            _ => 0.0,
        }
    }
}

impl GlyphRasterizer for GridFont {
    fn glyph_box_subpixel(&self, glyph: GlyphIndex, scale: Scale, shift: Shift) -> GlyphBox {
        let ink = Self::ink_width(glyph);
        if ink == 0.0 {
            return GlyphBox::default();
        }
        let lsb = self.h_metrics(glyph).left_side_bearing;
        GlyphBox {
            x0: (lsb * scale.x + shift.x).floor() as i32,
            y0: (-INK_TOP * scale.y + shift.y).floor() as i32,
            x1: ((lsb + ink) * scale.x + shift.x).ceil() as i32,
            y1: shift.y.ceil() as i32,
        }
    }

    fn rasterize_subpixel(&self, glyph: GlyphIndex, scale: Scale, shift: Shift) -> Option<GlyphBitmap> {
        self.rasterize_calls.set(self.rasterize_calls.get() + 1);
        self.shifts.borrow_mut().push(shift.x);
        if self.fail_rasterize.get() {
            return None;
        }
        let b = self.glyph_box_subpixel(glyph, scale, shift);
        Some(GlyphBitmap {
            width: b.width(),
            height: b.height(),
            pixels: vec![255; (b.width() * b.height()) as usize],
        })
    }
}
