//! Layout configuration.

use serde::{Deserialize, Serialize};

use crate::error::KernError;

/// Default destination bounds, matching a 1080p surface.
pub const DEFAULT_MAX_WIDTH: u32 = 1920;
pub const DEFAULT_MAX_HEIGHT: u32 = 1080;

/// Parameters for one layout + rasterization call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernOptions {
    /// Font size in pixels (ascent − descent).
    pub font_size: f32,
    /// Destination bitmap width; the returned image is never wider.
    pub max_width: u32,
    /// Destination bitmap height; lines past it are dropped.
    pub max_height: u32,
    /// Break overflowing lines at the last whitespace.
    pub wrap: bool,
    /// Position glyphs at fractional pixel offsets.
    pub subpixel: bool,
}

impl Default for KernOptions {
    fn default() -> Self {
        Self {
            font_size: 32.0,
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            wrap: false,
            subpixel: true,
        }
    }
}

impl KernOptions {
    /// Single-line defaults at `font_size`.
    pub fn new(font_size: f32) -> Self {
        Self {
            font_size,
            ..Default::default()
        }
    }

    /// Word-wrapped layout within `max_width`.
    pub fn wrapped(font_size: f32, max_width: u32) -> Self {
        Self {
            font_size,
            max_width,
            wrap: true,
            ..Default::default()
        }
    }

    pub fn with_bounds(mut self, max_width: u32, max_height: u32) -> Self {
        self.max_width = max_width;
        self.max_height = max_height;
        self
    }

    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_subpixel(mut self, subpixel: bool) -> Self {
        self.subpixel = subpixel;
        self
    }

    pub fn validate(&self) -> Result<(), KernError> {
        let limit = i32::MAX as u32;
        if self.max_width == 0 || self.max_height == 0 || self.max_width > limit || self.max_height > limit {
            return Err(KernError::InvalidBounds {
                width: self.max_width,
                height: self.max_height,
            });
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(KernError::InvalidFontSize(self.font_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default() {
        let opts = KernOptions::default();
        assert_eq!(opts.max_width, 1920);
        assert_eq!(opts.max_height, 1080);
        assert!(!opts.wrap);
        assert!(opts.subpixel);
    }

    #[test]
    fn test_wrapped_enables_wrap() {
        let opts = KernOptions::wrapped(24.0, 400);
        assert!(opts.wrap);
        assert_eq!(opts.max_width, 400);
        assert_eq!(opts.max_height, DEFAULT_MAX_HEIGHT);
    }

    #[test]
    fn test_validate_rejects_zero_bounds() {
        let opts = KernOptions::new(16.0).with_bounds(0, 100);
        assert!(matches!(
            opts.validate(),
            Err(KernError::InvalidBounds { width: 0, height: 100 })
        ));
        let huge = KernOptions::new(16.0).with_bounds(100, u32::MAX);
        assert!(huge.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_size() {
        assert!(KernOptions::new(0.0).validate().is_err());
        assert!(KernOptions::new(f32::NAN).validate().is_err());
        assert!(KernOptions::new(12.0).validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_json() {
        let opts: KernOptions =
            serde_json::from_str(r#"{ "font_size": 48.0, "wrap": true }"#).unwrap();
        assert_eq!(opts.font_size, 48.0);
        assert!(opts.wrap);
        assert_eq!(opts.max_width, DEFAULT_MAX_WIDTH);
    }
}
