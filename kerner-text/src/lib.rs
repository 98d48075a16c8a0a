//! # kerner-text
//!
//! Kerned text layout and rasterization. Loads a TrueType/OpenType
//! font, caches glyph bitmaps per pixel box, and renders strings into a
//! single 8-bit greyscale image with kerning, optional word wrap and
//! subpixel positioning.
//!
//! ## Architecture
//!
//! ```text
//! fonts (file / font-kit) ──► OutlineFont (ab_glyph)
//!                                  │  FontMetrics + GlyphRasterizer
//!                                  ▼
//!                        KerningFont<B> ── GlyphRecord { bitmaps by box }
//!                                  │
//!                                  ▼
//! kern_text(str, size) ──► layout cursor ──► Canvas ──► GreyImage
//! ```
//!
//! - **`backend`**: Font collaborator traits and plain glyph types.
//! - **`outline`**: `ab_glyph` implementation of the backend traits.
//! - **`fonts`**: Reading font bytes from disk or the system.
//! - **`glyph`**: Per-codepoint record and bitmap cache.
//! - **`font`**: Loaded font, pre-warming and unload.
//! - **`engine`**: Layout, wrapping and rasterization entry points.
//! - **`canvas`**: Greyscale render target.

pub mod backend;
pub mod canvas;
pub mod engine;
pub mod error;
pub mod font;
pub mod fonts;
pub mod glyph;
pub mod options;
pub mod outline;

#[cfg(test)]
mod testing;

// Re-exports for ergonomic use.
pub use backend::{FontBackend, FontMetrics, GlyphBitmap, GlyphBox, GlyphIndex, GlyphRasterizer};
pub use canvas::GreyImage;
pub use engine::KernedText;
pub use error::{KernError, KernWarning};
pub use font::{CacheUpdate, KerningFont, DEFAULT_CODEPOINTS};
pub use fonts::{load_font_file, load_system_font, FontData, FontQuery};
pub use glyph::{BitmapKey, GlyphRecord};
pub use options::KernOptions;
pub use outline::OutlineFont;
