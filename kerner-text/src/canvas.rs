//! Compositor: stamps glyph bitmaps into a fixed-size greyscale
//! destination and crops the result to the drawn extent.
//!
//! Overlap is an override, not a blend: every non-zero source pixel
//! replaces the destination pixel, so later glyphs win. Pixels falling
//! outside the destination are clipped.

use crate::backend::GlyphBitmap;
use crate::error::KernError;

/// Single-channel 8-bit image, row-major, `width * height` bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GreyImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl GreyImage {
    /// Pixel at (`x`, `y`), or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get((y * self.width + x) as usize).copied()
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let start = (y * self.width) as usize;
        &self.data[start..start + self.width as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

/// Zero-initialised destination owned by one layout call.
pub(crate) struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    /// Allocate a `width × height` buffer. Fails instead of aborting when
    /// the allocation cannot be satisfied.
    pub(crate) fn new(width: u32, height: u32) -> Result<Self, KernError> {
        let bytes = (width as usize)
            .checked_mul(height as usize)
            .ok_or(KernError::OutOfMemory { bytes: usize::MAX })?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(bytes)
            .map_err(|_| KernError::OutOfMemory { bytes })?;
        pixels.resize(bytes, 0);

        Ok(Self { width, height, pixels })
    }

    /// Copy the non-zero pixels of `bitmap` with its top-left at
    /// (`x`, `y`).
    pub(crate) fn stamp(&mut self, bitmap: &GlyphBitmap, x: i32, y: i32) {
        let w = bitmap.width as i32;
        let h = bitmap.height as i32;
        if bitmap.pixels.len() < bitmap.width as usize * bitmap.height as usize {
            return;
        }

        // Clip against the destination once, then copy row slices.
        let col_start = (-x).max(0);
        let col_end = w.min(self.width as i32 - x);
        let row_start = (-y).max(0);
        let row_end = h.min(self.height as i32 - y);
        if col_start >= col_end || row_start >= row_end {
            return;
        }

        for row in row_start..row_end {
            let src = (row * w) as usize;
            let dst = (y + row) as usize * self.width as usize;
            for col in col_start..col_end {
                let value = bitmap.pixels[src + col as usize];
                if value != 0 {
                    self.pixels[dst + (x + col) as usize] = value;
                }
            }
        }
    }

    /// Zero `rows` rows starting at `y`, from column `x` to the right
    /// edge.
    pub(crate) fn erase(&mut self, x: u32, y: i32, rows: i32) {
        if x >= self.width {
            return;
        }
        let row_start = y.max(0);
        let row_end = (y + rows).min(self.height as i32);
        for row in row_start..row_end {
            let start = row as usize * self.width as usize;
            self.pixels[start + x as usize..start + self.width as usize].fill(0);
        }
    }

    /// Shrink to the top-left `width × height` rectangle (clamped to the
    /// canvas), reusing the allocation.
    pub(crate) fn crop(self, width: u32, height: u32) -> GreyImage {
        let Canvas { width: full, height: full_h, mut pixels } = self;
        let width = width.min(full);
        let height = height.min(full_h);

        if width != full {
            for row in 0..height as usize {
                let src = row * full as usize;
                pixels.copy_within(src..src + width as usize, row * width as usize);
            }
        }
        pixels.truncate(width as usize * height as usize);
        pixels.shrink_to_fit();

        GreyImage { width, height, data: pixels }
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap(width: u32, height: u32, pixels: Vec<u8>) -> GlyphBitmap {
        GlyphBitmap { width, height, pixels }
    }

    fn canvas_pixel(canvas: &Canvas, x: u32, y: u32) -> u8 {
        canvas.pixels[(y * canvas.width + x) as usize]
    }

    #[test]
    fn test_canvas_starts_zeroed() {
        let c = Canvas::new(8, 4).unwrap();
        assert_eq!(c.pixels.len(), 32);
        assert!(c.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_stamp_copies_only_nonzero_pixels() {
        let mut c = Canvas::new(4, 4).unwrap();
        c.stamp(&bitmap(2, 1, vec![9, 9]), 1, 1);
        // Second stamp overlaps: zero pixels must not clear, non-zero override.
        c.stamp(&bitmap(2, 1, vec![0, 5]), 1, 1);
        assert_eq!(canvas_pixel(&c, 1, 1), 9);
        assert_eq!(canvas_pixel(&c, 2, 1), 5);
        assert_eq!(canvas_pixel(&c, 0, 1), 0);
    }

    #[test]
    fn test_stamp_clips_all_edges() {
        let mut c = Canvas::new(4, 4).unwrap();
        let b = bitmap(3, 3, vec![1; 9]);
        c.stamp(&b, -1, -1);
        c.stamp(&b, 3, 3);
        assert_eq!(canvas_pixel(&c, 0, 0), 1);
        assert_eq!(canvas_pixel(&c, 1, 1), 1);
        assert_eq!(canvas_pixel(&c, 2, 2), 0);
        assert_eq!(canvas_pixel(&c, 3, 3), 1);
        // Nothing wrapped onto the next row.
        assert_eq!(canvas_pixel(&c, 0, 3), 0);
    }

    #[test]
    fn test_stamp_fully_outside_is_noop() {
        let mut c = Canvas::new(4, 4).unwrap();
        c.stamp(&bitmap(2, 2, vec![1; 4]), 10, 0);
        c.stamp(&bitmap(2, 2, vec![1; 4]), 0, -5);
        assert!(c.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_erase_to_right_edge() {
        let mut c = Canvas::new(6, 3).unwrap();
        c.stamp(&bitmap(6, 3, vec![7; 18]), 0, 0);
        c.erase(2, 0, 2);
        assert_eq!(canvas_pixel(&c, 1, 0), 7);
        assert_eq!(canvas_pixel(&c, 2, 0), 0);
        assert_eq!(canvas_pixel(&c, 5, 1), 0);
        assert_eq!(canvas_pixel(&c, 5, 2), 7);
    }

    #[test]
    fn test_crop_keeps_top_left_rows() {
        let mut c = Canvas::new(4, 3).unwrap();
        c.stamp(&bitmap(4, 3, (1..=12).collect()), 0, 0);
        let img = c.crop(2, 2);
        assert_eq!((img.width, img.height), (2, 2));
        assert_eq!(img.data, vec![1, 2, 5, 6]);
        assert_eq!(img.row(1), &[5, 6]);
    }

    #[test]
    fn test_crop_never_exceeds_canvas() {
        let c = Canvas::new(4, 3).unwrap();
        let img = c.crop(10, 10);
        assert_eq!((img.width, img.height), (4, 3));
        assert_eq!(img.data.len(), 12);
    }

    #[test]
    fn test_crop_to_zero_width() {
        let img = Canvas::new(4, 3).unwrap().crop(0, 3);
        assert!(img.is_empty());
        assert!(img.data.is_empty());
        assert_eq!(img.pixel(0, 0), None);
    }

    #[test]
    fn test_oversized_canvas_reports_out_of_memory() {
        let result = Canvas::new(u32::MAX, u32::MAX);
        assert!(matches!(result, Err(KernError::OutOfMemory { .. })));
    }
}
