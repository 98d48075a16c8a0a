//! Font with kerning: owns the font handle and the per-codepoint glyph
//! cache, and manages cache growth across pixel sizes.
//!
//! ## Lifecycle
//!
//! ```text
//! KerningFont::new / from_file / from_memory / from_system
//!     │   (metrics resolved once, one unshifted bitmap at base size)
//!     ▼
//! update_bitmaps(size)   ◀── optional pre-warm, once per size
//!     │
//!     ▼
//! kern_text*(…)          ◀── layout; may add bitmaps for new boxes
//!     │
//!     ▼
//! unload() / drop        ◀── releases records, bitmaps and handle
//! ```
//!
//! A font whose handle is gone (construction failed upstream, or
//! [`KerningFont::unload`] ran) fails every operation with
//! [`KernError::UnusableFont`].

use std::borrow::Cow;
use std::ops::RangeInclusive;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::backend::{FontBackend, GlyphBitmap, GlyphIndex, Scale, Shift};
use crate::error::{KernError, KernWarning};
use crate::fonts::{load_font_file, load_system_font, FontData, FontQuery};
use crate::glyph::{BitmapKey, GlyphRecord};
use crate::outline::OutlineFont;

/// Glyph set preloaded when the caller names none: printable ASCII.
pub const DEFAULT_CODEPOINTS: RangeInclusive<char> = ' '..='~';

/// Summary of one [`KerningFont::update_bitmaps`] pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CacheUpdate {
    pub font_size: f32,
    /// Glyphs that gained a bitmap.
    pub rasterized: usize,
    /// Glyphs that already had a bitmap for this size's box.
    pub already_cached: usize,
    /// Glyphs skipped; the rest of the cache is unaffected.
    pub warnings: Vec<KernWarning>,
}

/// Metrics for one codepoint during layout, either borrowed from the
/// preloaded set (`slot`) or resolved directly from the font.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ResolvedGlyph {
    pub slot: Option<usize>,
    pub codepoint: char,
    pub index: GlyphIndex,
    pub advance_width: f32,
    pub left_side_bearing: f32,
}

/// A font plus its kerning-aware glyph cache.
pub struct KerningFont<B> {
    backend: Option<B>,
    /// Records in load order.
    glyphs: Vec<GlyphRecord>,
    /// Codepoint → position in `glyphs`.
    slots: FxHashMap<char, usize>,
}

impl<B: FontBackend> KerningFont<B> {
    /// Build the glyph set for `codepoints` (printable ASCII when empty)
    /// and rasterize each glyph once at `base_size`.
    pub fn new(backend: B, base_size: f32, codepoints: &[char]) -> Result<Self, KernError> {
        if !base_size.is_finite() || base_size <= 0.0 {
            return Err(KernError::InvalidFontSize(base_size));
        }

        let wanted: Vec<char> = if codepoints.is_empty() {
            DEFAULT_CODEPOINTS.collect()
        } else {
            codepoints.to_vec()
        };

        let scale = Scale::uniform(backend.scale_for_pixel_height(base_size));
        let mut glyphs = Vec::with_capacity(wanted.len());
        let mut slots = FxHashMap::default();

        for codepoint in wanted {
            if slots.contains_key(&codepoint) {
                continue;
            }
            let index = backend.glyph_index(codepoint);
            let mut record = GlyphRecord::new(codepoint, index, backend.h_metrics(index));

            match backend.rasterize(index, scale) {
                Some(bitmap) => {
                    if record.insert_bitmap(bitmap).is_err() {
                        log::warn!("FONT: Error allocating memory for glyph {codepoint:?}");
                    }
                }
                None => log::warn!("FONT: Error generating bitmap for glyph {codepoint:?}"),
            }

            slots.insert(codepoint, glyphs.len());
            glyphs.push(record);
        }

        log::info!("FONT: glyphs loaded successfully ({} glyphs at {base_size}px)", glyphs.len());

        Ok(Self {
            backend: Some(backend),
            glyphs,
            slots,
        })
    }

    /// Make sure every glyph has a bitmap for `font_size`, so later
    /// layouts at that size take the cached path.
    ///
    /// Glyphs whose box is already cached are left alone. A glyph that
    /// cannot be rasterized or stored is skipped with a warning.
    pub fn update_bitmaps(&mut self, font_size: f32) -> Result<CacheUpdate, KernError> {
        let backend = self.backend.as_ref().ok_or_else(unloaded)?;
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(KernError::InvalidFontSize(font_size));
        }

        let scale = Scale::uniform(backend.scale_for_pixel_height(font_size));
        let mut update = CacheUpdate {
            font_size,
            ..Default::default()
        };

        for record in &mut self.glyphs {
            let b = backend.glyph_box(record.index, scale);
            if record.has_bitmap(BitmapKey::new(b.width(), b.height())) {
                update.already_cached += 1;
                continue;
            }

            let Some(bitmap) = backend.rasterize(record.index, scale) else {
                log::warn!("FONT: Error generating bitmap for glyph {:?}", record.codepoint);
                update.warnings.push(KernWarning::RasterFailed { codepoint: record.codepoint });
                continue;
            };
            match record.insert_bitmap(bitmap) {
                Ok(()) => update.rasterized += 1,
                Err(_) => {
                    log::warn!("FONT: Error updating font glyph memory for {:?}", record.codepoint);
                    update
                        .warnings
                        .push(KernWarning::CacheAllocation { codepoint: record.codepoint });
                }
            }
        }

        log::info!(
            "FONT: cache updated for {font_size}px ({} rasterized, {} cached, {} skipped)",
            update.rasterized,
            update.already_cached,
            update.warnings.len(),
        );
        Ok(update)
    }

    /// Metrics for `codepoint`; falls back to the font handle when the
    /// codepoint is not preloaded. The fallback is never stored.
    pub(crate) fn resolve(&self, backend: &B, codepoint: char) -> ResolvedGlyph {
        if let Some(&slot) = self.slots.get(&codepoint) {
            let record = &self.glyphs[slot];
            return ResolvedGlyph {
                slot: Some(slot),
                codepoint,
                index: record.index,
                advance_width: record.advance_width,
                left_side_bearing: record.left_side_bearing,
            };
        }

        let index = backend.glyph_index(codepoint);
        let metrics = backend.h_metrics(index);
        ResolvedGlyph {
            slot: None,
            codepoint,
            index,
            advance_width: metrics.advance_width,
            left_side_bearing: metrics.left_side_bearing,
        }
    }

    /// Glyph index used for kerning against `codepoint`.
    pub(crate) fn kerning_index(&self, backend: &B, codepoint: char) -> GlyphIndex {
        match self.slots.get(&codepoint) {
            Some(&slot) => self.glyphs[slot].index,
            None => backend.glyph_index(codepoint),
        }
    }

    /// Bitmap for `glyph` in the `key` box: cached if present, otherwise
    /// rasterized now. New bitmaps of preloaded glyphs enter the cache.
    pub(crate) fn glyph_bitmap(
        &mut self,
        glyph: &ResolvedGlyph,
        key: BitmapKey,
        scale: Scale,
        shift: Shift,
        warnings: &mut Vec<KernWarning>,
    ) -> Option<Cow<'_, GlyphBitmap>> {
        let backend = self.backend.as_ref()?;
        let Some(slot) = glyph.slot else {
            return backend.rasterize_subpixel(glyph.index, scale, shift).map(Cow::Owned);
        };

        let record = &mut self.glyphs[slot];
        let key = if record.has_bitmap(key) {
            key
        } else {
            let bitmap = backend.rasterize_subpixel(glyph.index, scale, shift)?;
            let stored = BitmapKey::of(&bitmap);
            if let Err(bitmap) = record.insert_bitmap(bitmap) {
                log::warn!("FONT: Error updating font glyph memory for {:?}", glyph.codepoint);
                warnings.push(KernWarning::CacheAllocation { codepoint: glyph.codepoint });
                return Some(Cow::Owned(bitmap));
            }
            stored
        };
        record.bitmap(key).map(Cow::Borrowed)
    }
}

impl<B> KerningFont<B> {
    /// Whether the font still has a usable handle.
    pub fn is_usable(&self) -> bool {
        self.backend.is_some()
    }

    /// The font handle, or [`KernError::UnusableFont`] after unload.
    pub fn backend(&self) -> Result<&B, KernError> {
        self.backend.as_ref().ok_or_else(unloaded)
    }

    /// Number of preloaded glyphs.
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn glyph(&self, codepoint: char) -> Option<&GlyphRecord> {
        self.slots.get(&codepoint).map(|&slot| &self.glyphs[slot])
    }

    /// Preloaded glyphs in load order.
    pub fn glyphs(&self) -> impl Iterator<Item = &GlyphRecord> {
        self.glyphs.iter()
    }

    /// Release every glyph record, bitmap and the font handle. The font
    /// is unusable afterwards.
    pub fn unload(&mut self) {
        let released: usize = self.glyphs.iter().map(GlyphRecord::bitmap_count).sum();
        self.glyphs = Vec::new();
        self.slots = FxHashMap::default();
        self.backend = None;
        log::info!("FONT: unloaded ({released} bitmaps released)");
    }
}

impl KerningFont<OutlineFont> {
    /// Parse TTF/OTF bytes and preload `codepoints` (printable ASCII when
    /// empty) at `base_size`.
    pub fn from_memory(bytes: Vec<u8>, base_size: f32, codepoints: &[char]) -> Result<Self, KernError> {
        Self::from_font_data(FontData { bytes, index: 0 }, base_size, codepoints)
    }

    pub fn from_font_data(data: FontData, base_size: f32, codepoints: &[char]) -> Result<Self, KernError> {
        let backend = OutlineFont::from_vec(data.bytes, data.index).map_err(|e| {
            log::warn!("FONT: Error loading TTF font info! Font unusable with kerning.");
            e
        })?;
        log::info!("FONT: TTF font info loaded successfully ({} glyphs in face)", backend.glyph_count());
        Self::new(backend, base_size, codepoints)
    }

    /// Load a `.ttf` / `.otf` file.
    pub fn from_file(path: impl AsRef<Path>, base_size: f32, codepoints: &[char]) -> Result<Self, KernError> {
        Self::from_font_data(load_font_file(path)?, base_size, codepoints)
    }

    /// Load the installed font best matching `query`.
    pub fn from_system(query: &FontQuery, base_size: f32, codepoints: &[char]) -> Result<Self, KernError> {
        Self::from_font_data(load_system_font(query)?, base_size, codepoints)
    }
}

fn unloaded() -> KernError {
    KernError::UnusableFont("font has no metrics handle (unloaded)".into())
}

// ===================================================================
// Tests
// ===================================================================
