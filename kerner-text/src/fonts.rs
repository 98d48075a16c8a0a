//! Font loading: raw TTF/OTF bytes from a file or from the installed
//! system fonts.
//!
//! System lookup wraps `font-kit` and accepts CSS-style fallback chains
//! (`"Noto Sans, DejaVu Sans, sans-serif"`). Each entry is tried in
//! order by the platform matcher.
//!
//! ```text
//! FontQuery::from_css("Arial, sans-serif")
//!     │
//!     ▼
//! SystemSource::select_best_match([Title("Arial"), SansSerif], props)
//!     │
//!     ▼
//! Handle::{Path, Memory} ──► FontData { bytes, index }
//! ```

use std::fs;
use std::path::Path;
use std::time::Instant;

use font_kit::family_name::FamilyName;
use font_kit::handle::Handle;
use font_kit::properties::{Properties, Style, Weight};
use font_kit::source::SystemSource;

use crate::error::KernError;

// ── Font data ───────────────────────────────────────────────────────

/// Raw font file contents plus the face index inside a collection.
#[derive(Clone, Debug)]
pub struct FontData {
    pub bytes: Vec<u8>,
    pub index: u32,
}

/// Read a `.ttf` or `.otf` file. Other extensions are rejected before
/// touching the file system.
pub fn load_font_file(path: impl AsRef<Path>) -> Result<FontData, KernError> {
    let path = path.as_ref();
    let supported = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"))
        .unwrap_or(false);
    if !supported {
        log::warn!(
            "FONT: Error loading font ({}) with kerning - file must be either TTF or OTF",
            path.display()
        );
        return Err(KernError::UnsupportedFormat { path: path.to_path_buf() });
    }

    let bytes = fs::read(path)?;
    Ok(FontData { bytes, index: 0 })
}

// ── System fonts ────────────────────────────────────────────────────

/// CSS-style descriptor for system font lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct FontQuery {
    /// Ordered family fallback chain, e.g. `["Arial", "sans-serif"]`.
    pub families: Vec<String>,
    /// Weight (100–900). 400 = normal, 700 = bold.
    pub weight: u16,
    pub italic: bool,
}

impl Default for FontQuery {
    fn default() -> Self {
        Self {
            families: vec!["sans-serif".into()],
            weight: 400,
            italic: false,
        }
    }
}

impl FontQuery {
    /// Parse `"Arial, 'Helvetica Neue', sans-serif"` into a fallback
    /// chain. An empty string means `sans-serif`.
    pub fn from_css(family_str: &str) -> Self {
        let families: Vec<String> = family_str
            .split(',')
            .map(|s| s.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if families.is_empty() {
            return Self::default();
        }
        Self {
            families,
            ..Default::default()
        }
    }

    pub fn with_weight(mut self, weight: u16) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    fn family_names(&self) -> Vec<FamilyName> {
        self.families
            .iter()
            .map(|name| parse_generic(name).unwrap_or_else(|| FamilyName::Title(name.clone())))
            .collect()
    }

    fn properties(&self) -> Properties {
        let mut props = Properties::new();
        props.weight(Weight(self.weight as f32));
        if self.italic {
            props.style(Style::Italic);
        }
        props
    }
}

/// Resolve `query` against the installed fonts and read the best match.
pub fn load_system_font(query: &FontQuery) -> Result<FontData, KernError> {
    let start = Instant::now();
    let source = SystemSource::new();

    let handle = source
        .select_best_match(&query.family_names(), &query.properties())
        .map_err(|e| KernError::FontNotFound(format!("{} ({e:?})", query.families.join(", "))))?;

    let data = match handle {
        Handle::Path { path, font_index } => FontData {
            bytes: fs::read(&path)?,
            index: font_index,
        },
        Handle::Memory { bytes, font_index } => FontData {
            bytes: bytes.as_ref().clone(),
            index: font_index,
        },
    };

    log::info!(
        "FONT: resolved {:?} to a {}-byte face ({:.1}ms)",
        query.families,
        data.bytes.len(),
        start.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(data)
}

/// Map a CSS generic family keyword.
fn parse_generic(name: &str) -> Option<FamilyName> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => Some(FamilyName::Serif),
        "sans-serif" => Some(FamilyName::SansSerif),
        "monospace" => Some(FamilyName::Monospace),
        "cursive" => Some(FamilyName::Cursive),
        "fantasy" => Some(FamilyName::Fantasy),
        _ => None,
    }
}

// ===================================================================
// Tests
// ===================================================================
