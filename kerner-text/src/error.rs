use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors. Any of these aborts the operation that returned it.
#[derive(Error, Debug)]
pub enum KernError {
    /// The font's metrics handle is missing (bad data, wrong format, or
    /// the font was unloaded).
    #[error("font is unusable: {0}")]
    UnusableFont(String),
    #[error("font file {} must be either TTF or OTF", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("no installed font matches {0:?}")]
    FontNotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid layout bounds {width}x{height}")]
    InvalidBounds { width: u32, height: u32 },
    #[error("invalid font size {0}")]
    InvalidFontSize(f32),
    #[error("out of memory allocating a {bytes}-byte destination bitmap")]
    OutOfMemory { bytes: usize },
    /// Wrapping could not make progress: the glyph does not fit even at
    /// the start of an empty line.
    #[error("glyph {codepoint:?} needs {width}px but lines are only {max_width}px wide")]
    GlyphWiderThanLine {
        codepoint: char,
        width: u32,
        max_width: u32,
    },
}

/// Non-fatal issues. The operation completes; these are collected on
/// the result and also logged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernWarning {
    /// Codepoint is not in the font's preloaded glyph set; its metrics
    /// were resolved directly from the font for this call only.
    MissingGlyph { codepoint: char },
    /// The rasterizer could not produce a bitmap; nothing was drawn.
    RasterFailed { codepoint: char },
    /// A bitmap could not be stored in the glyph cache.
    CacheAllocation { codepoint: char },
}

impl fmt::Display for KernWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernWarning::MissingGlyph { codepoint } => {
                write!(f, "no preloaded glyph for codepoint U+{:04X}", *codepoint as u32)
            }
            KernWarning::RasterFailed { codepoint } => {
                write!(f, "error generating bitmap for codepoint U+{:04X}", *codepoint as u32)
            }
            KernWarning::CacheAllocation { codepoint } => {
                write!(f, "error updating cache memory for codepoint U+{:04X}", *codepoint as u32)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display_uses_unicode_notation() {
        let w = KernWarning::MissingGlyph { codepoint: '\u{2625}' };
        assert_eq!(w.to_string(), "no preloaded glyph for codepoint U+2625");
    }

    #[test]
    fn test_unsupported_format_message() {
        let e = KernError::UnsupportedFormat { path: PathBuf::from("font.woff") };
        assert!(e.to_string().contains("font.woff"));
    }
}
