//! `kerner`: render kerned text to a greyscale PNG.
//!
//! ```text
//! kerner --family "DejaVu Sans, sans-serif" --size 48 --wrap --max-width 600 \
//!        -o hello.png "Hello, AVATAR world"
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use kerner_text::{FontQuery, KernOptions, KerningFont, OutlineFont};

#[derive(Parser, Debug)]
#[command(name = "kerner", about = "Render kerned text into a greyscale PNG")]
struct Args {
    /// Text to render. Read from `--input` when omitted.
    text: Option<String>,

    #[arg(short, long, value_name = "FILE", conflicts_with = "text")]
    input: Option<PathBuf>,

    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// TTF/OTF file to load.
    #[arg(long, value_name = "FILE", conflicts_with = "family")]
    font: Option<PathBuf>,

    /// CSS-style system family chain.
    #[arg(long, value_name = "CHAIN", default_value = "sans-serif")]
    family: String,

    /// JSON file with layout options; flags below override it.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long)]
    size: Option<f32>,

    #[arg(long)]
    max_width: Option<u32>,

    #[arg(long)]
    max_height: Option<u32>,

    #[arg(long, action = clap::ArgAction::SetTrue)]
    wrap: bool,

    #[arg(long, action = clap::ArgAction::SetTrue)]
    no_subpixel: bool,

    /// Extra sizes to rasterize before layout.
    #[arg(long, value_name = "PX", value_delimiter = ',')]
    prewarm: Vec<f32>,
}

impl Args {
    fn options(&self) -> Result<KernOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config: {}", path.display()))?;
                serde_json::from_str(&raw).with_context(|| format!("Invalid config: {}", path.display()))?
            }
            None => KernOptions::default(),
        };

        if let Some(size) = self.size {
            options.font_size = size;
        }
        if let Some(width) = self.max_width {
            options.max_width = width;
        }
        if let Some(height) = self.max_height {
            options.max_height = height;
        }
        options.wrap |= self.wrap;
        options.subpixel &= !self.no_subpixel;
        Ok(options)
    }

    fn text(&self) -> Result<String> {
        match (&self.text, &self.input) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => {
                fs::read_to_string(path).with_context(|| format!("Failed to read text: {}", path.display()))
            }
            (None, None) => bail!("nothing to render: pass TEXT or --input"),
        }
    }

    fn load_font(&self, base_size: f32) -> Result<KerningFont<OutlineFont>> {
        let font = match &self.font {
            Some(path) => KerningFont::from_file(path, base_size, &[])
                .with_context(|| format!("Failed to load font: {}", path.display()))?,
            None => KerningFont::from_system(&FontQuery::from_css(&self.family), base_size, &[])
                .with_context(|| format!("No system font for {:?}", self.family))?,
        };
        Ok(font)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = args.options()?;
    let text = args.text()?;
    let mut font = args.load_font(options.font_size)?;
    log::info!("Loaded {} glyphs", font.glyph_count());

    for size in &args.prewarm {
        let update = font.update_bitmaps(*size)?;
        log::info!(
            "Pre-warmed {}px: {} rasterized, {} cached",
            update.font_size,
            update.rasterized,
            update.already_cached
        );
    }

    let kerned = font.kern_text_ex(&text, &options)?;
    for warning in &kerned.warnings {
        log::warn!("{warning}");
    }

    let (width, height) = (kerned.image.width, kerned.image.height);
    if kerned.image.is_empty() {
        bail!("nothing was drawn within {}x{}", options.max_width, options.max_height);
    }

    let image = image::GrayImage::from_raw(width, height, kerned.image.into_raw())
        .context("image buffer does not match its dimensions")?;
    image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("{} → {}x{} ({} warnings)", args.output.display(), width, height, kerned.warnings.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from(["kerner", "-o", "out.png", "--size", "48", "--wrap", "--no-subpixel", "hi"]);
        let options = args.options().unwrap();
        assert_eq!(options.font_size, 48.0);
        assert!(options.wrap);
        assert!(!options.subpixel);
        assert_eq!(options.max_width, 1920);
        assert_eq!(args.text().unwrap(), "hi");
    }

    #[test]
    fn test_prewarm_list() {
        let args = Args::parse_from(["kerner", "-o", "o.png", "--prewarm", "16,24,48", "x"]);
        assert_eq!(args.prewarm, vec![16.0, 24.0, 48.0]);
    }

    #[test]
    fn test_missing_text_is_error() {
        let args = Args::parse_from(["kerner", "-o", "o.png"]);
        assert!(args.text().is_err());
    }

    #[test]
    fn test_font_conflicts_with_family() {
        let result = Args::try_parse_from(["kerner", "-o", "o.png", "--font", "a.ttf", "--family", "serif", "x"]);
        assert!(result.is_err());
    }
}
