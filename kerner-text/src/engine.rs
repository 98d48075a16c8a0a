//! Text engine: lays out codepoints with kerning, word-wraps with
//! backtracking, and rasterizes everything into one greyscale image.
//!
//! ## Layout loop
//!
//! Each codepoint moves the cursor into one of three states:
//!
//! ```text
//!             ┌──────────── visible glyph fits ───────────┐
//!             ▼                                           │
//!        ADVANCING ── space / tab ──► AT_BREAK ───────────┤
//!             │                                           │
//!             └─ newline, or glyph overflows with wrap ─► WRAPPING
//!                                                         │
//!            erase partial word, rewind, next line ◄──────┘
//! ```
//!
//! A wrap always restarts at a codepoint index strictly after the start
//! of the line being closed, so layout makes forward progress. A glyph
//! that cannot fit on an empty line is reported as
//! [`KernError::GlyphWiderThanLine`].
//!
//! Vertical overflow is not an error: layout stops once the next line
//! would cross `max_height`, and the image is cropped accordingly.

use crate::backend::{FontBackend, Scale, Shift};
use crate::canvas::{Canvas, GreyImage};
use crate::error::{KernError, KernWarning};
use crate::font::{KerningFont, ResolvedGlyph};
use crate::glyph::BitmapKey;
use crate::options::KernOptions;

/// Result of one layout + rasterization call.
#[derive(Clone, Debug)]
pub struct KernedText {
    /// Cropped to the drawn extent; never larger than the requested
    /// bounds.
    pub image: GreyImage,
    /// Non-fatal issues hit during layout, in encounter order.
    pub warnings: Vec<KernWarning>,
}

impl<B: FontBackend> KerningFont<B> {
    /// Single-line layout within 1920×1080, subpixel positioning on.
    pub fn kern_text(&mut self, text: &str, font_size: f32) -> Result<KernedText, KernError> {
        self.kern_text_ex(text, &KernOptions::new(font_size))
    }

    /// Word-wrapped layout within `max_width`, subpixel positioning on.
    pub fn kern_text_wrapped(
        &mut self,
        text: &str,
        font_size: f32,
        max_width: u32,
    ) -> Result<KernedText, KernError> {
        self.kern_text_ex(text, &KernOptions::wrapped(font_size, max_width))
    }

    pub fn kern_text_ex(&mut self, text: &str, options: &KernOptions) -> Result<KernedText, KernError> {
        // Fail closed before decoding anything.
        self.backend()?;
        let codepoints: Vec<char> = text.chars().collect();
        self.kern_codepoints(&codepoints, options)
    }

    /// Lay out and rasterize `codepoints`.
    pub fn kern_codepoints(
        &mut self,
        codepoints: &[char],
        options: &KernOptions,
    ) -> Result<KernedText, KernError> {
        let mut run = LayoutRun::new(self, options)?;
        run.run(codepoints)?;

        let kerned = run.finish();
        log::debug!(
            "Layout: {} codepoints at {}px → {}x{} ({} warnings)",
            codepoints.len(),
            options.font_size,
            kerned.image.width,
            kerned.image.height,
            kerned.warnings.len(),
        );
        Ok(kerned)
    }
}

// ── Layout state ────────────────────────────────────────────────────

/// Line geometry in whole pixels for one font size.
#[derive(Clone, Copy, Debug)]
struct LineMetrics {
    ascent: i32,
    /// Baseline-to-baseline distance.
    increment: i32,
}

impl LineMetrics {
    fn new<B: FontBackend>(backend: &B, scale: f32) -> Self {
        let v = backend.v_metrics();
        let ascent = (v.ascent * scale).round() as i32;
        let descent = (v.descent * scale).round() as i32;
        let line_gap = (v.line_gap * scale).round() as i32;
        Self {
            ascent,
            increment: ascent - descent + line_gap,
        }
    }
}

/// Last whitespace seen on the current line.
#[derive(Clone, Copy, Debug)]
struct Breakpoint {
    /// Column where the whitespace started.
    x: i32,
    index: usize,
}

#[derive(Debug, Default)]
struct Cursor {
    /// Pen position in fractional pixels.
    x: f32,
    /// Top of the current line.
    y: i32,
    index: usize,
    /// Index of the first codepoint of the current line.
    line_start: usize,
    breakpoint: Option<Breakpoint>,
    /// Rightmost pen position reached, rounded up.
    max_x: u32,
    /// First index not visited yet. Indices below it are being replayed
    /// after a wrap rewound the cursor.
    frontier: usize,
}

/// What the cursor does after looking at one codepoint.
#[derive(Debug, PartialEq)]
enum Flow {
    /// Codepoint consumed on the current line (drawn or dropped).
    Advancing,
    /// Whitespace consumed and recorded as the latest breakpoint.
    AtBreak,
    /// Close the line and continue at `resume_at` on the next one,
    /// clearing the current line from column `erase_from` first.
    Wrapping {
        resume_at: usize,
        erase_from: Option<u32>,
    },
}

struct LayoutRun<'a, B> {
    font: &'a mut KerningFont<B>,
    options: &'a KernOptions,
    scale: f32,
    line: LineMetrics,
    canvas: Canvas,
    cursor: Cursor,
    warnings: Vec<KernWarning>,
}

impl<'a, B: FontBackend> LayoutRun<'a, B> {
    fn new(font: &'a mut KerningFont<B>, options: &'a KernOptions) -> Result<Self, KernError> {
        let backend = font.backend()?;
        options.validate()?;

        let scale = backend.scale_for_pixel_height(options.font_size);
        let line = LineMetrics::new(backend, scale);
        let canvas = Canvas::new(options.max_width, options.max_height)?;

        Ok(Self {
            font,
            options,
            scale,
            line,
            canvas,
            cursor: Cursor::default(),
            warnings: Vec::new(),
        })
    }

    fn run(&mut self, codepoints: &[char]) -> Result<(), KernError> {
        let max_height = self.options.max_height as i32;

        while self.cursor.index < codepoints.len() && self.cursor.y + self.line.increment < max_height {
            match self.step(codepoints)? {
                Flow::Advancing | Flow::AtBreak => self.cursor.index += 1,
                Flow::Wrapping { resume_at, erase_from } => self.wrap(resume_at, erase_from),
            }
        }
        Ok(())
    }

    fn step(&mut self, codepoints: &[char]) -> Result<Flow, KernError> {
        let index = self.cursor.index;
        let codepoint = codepoints[index];

        if codepoint == '\n' {
            return Ok(Flow::Wrapping {
                resume_at: index + 1,
                erase_from: None,
            });
        }

        // Warnings are reported once per codepoint, not again on replay.
        let first_visit = index >= self.cursor.frontier;
        self.cursor.frontier = self.cursor.frontier.max(index + 1);

        let backend = self.font.backend()?;
        let glyph = self.font.resolve(backend, codepoint);
        if glyph.slot.is_none() && first_visit {
            log::warn!("FONT: Unable to find glyph for codepoint {codepoint:?}");
            self.warnings.push(KernWarning::MissingGlyph { codepoint });
        }

        if codepoint == ' ' || codepoint == '\t' {
            self.cursor.breakpoint = Some(Breakpoint {
                x: self.cursor.x as i32,
                index,
            });
            // Stop advancing past the edge so trailing whitespace cannot
            // push the pen out indefinitely.
            if self.cursor.x < self.options.max_width as f32 {
                self.cursor.x += glyph.advance_width * self.scale;
            }
            return Ok(Flow::AtBreak);
        }

        self.place(codepoints, glyph, first_visit)
    }

    /// Draw a visible glyph if it fits, otherwise decide how to wrap.
    fn place(&mut self, codepoints: &[char], glyph: ResolvedGlyph, first_visit: bool) -> Result<Flow, KernError> {
        let index = self.cursor.index;
        let max_width = self.options.max_width;
        let backend = self.font.backend()?;

        let kern = match codepoints.get(index + 1) {
            Some(&next) => backend.kern_advance(glyph.index, self.font.kerning_index(backend, next)),
            None => 0.0,
        };
        let increment = kern * self.scale + glyph.advance_width * self.scale;

        let x = self.cursor.x;
        let scale = Scale::uniform(self.scale);
        let (shift, bbox) = if self.options.subpixel {
            let shift = Shift::horizontal(x - x.floor());
            (shift, backend.glyph_box_subpixel(glyph.index, scale, shift))
        } else {
            (Shift::ZERO, backend.glyph_box(glyph.index, scale))
        };

        if (x + increment).ceil() < max_width as f32 {
            let dst_x = x.floor() as i32 + (glyph.left_side_bearing * self.scale).round() as i32;
            let dst_y = self.cursor.y + self.line.ascent + bbox.y0;

            self.cursor.x = x + increment;
            self.cursor.max_x = self.cursor.max_x.max(self.cursor.x.ceil() as u32);

            let key = BitmapKey::new(bbox.width(), bbox.height());
            match self.font.glyph_bitmap(&glyph, key, scale, shift, &mut self.warnings) {
                Some(bitmap) => self.canvas.stamp(&bitmap, dst_x, dst_y),
                None if first_visit => {
                    log::warn!("FONT: Error generating char bitmap for codepoint {:?}", glyph.codepoint);
                    self.warnings.push(KernWarning::RasterFailed { codepoint: glyph.codepoint });
                }
                None => {}
            }
            return Ok(Flow::Advancing);
        }

        if !self.options.wrap {
            log::debug!("Layout: dropping {:?} at x={x:.2}, line is full", glyph.codepoint);
            return Ok(Flow::Advancing);
        }

        // Any whitespace on this line lies at or after `line_start`, so
        // resuming after it always moves forward.
        if let Some(bp) = self.cursor.breakpoint {
            return Ok(Flow::Wrapping {
                resume_at: bp.index + 1,
                erase_from: Some(bp.x as u32),
            });
        }

        // No breakpoint on this line: break inside the word, unless this glyph
        // already starts the line and can never fit.
        if index == self.cursor.line_start {
            return Err(KernError::GlyphWiderThanLine {
                codepoint: glyph.codepoint,
                width: increment.ceil().max(0.0) as u32,
                max_width,
            });
        }
        Ok(Flow::Wrapping {
            resume_at: index,
            erase_from: None,
        })
    }

    fn wrap(&mut self, resume_at: usize, erase_from: Option<u32>) {
        debug_assert!(resume_at > self.cursor.line_start);

        if let Some(x) = erase_from {
            log::debug!("Layout: moving word at index {resume_at} to the next line");
            self.canvas.erase(x, self.cursor.y, self.line.increment);
        }
        self.cursor.index = resume_at;
        self.cursor.line_start = resume_at;
        self.cursor.breakpoint = None;
        self.cursor.x = 0.0;
        self.cursor.y += self.line.increment;
    }

    fn finish(self) -> KernedText {
        let max_height = self.options.max_height as i32;
        let height = (self.cursor.y + self.line.increment).clamp(0, max_height) as u32;
        KernedText {
            image: self.canvas.crop(self.cursor.max_x, height),
            warnings: self.warnings,
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
