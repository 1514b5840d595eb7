//! Font selection and text drawing for content cards.
//!
//! Fonts are resolved through an ordered list of [`FontSource`]s, first
//! success wins. The list always ends in the built-in Spleen bitmap font,
//! so resolution cannot fail.

use ab_glyph::{Font, FontArc, ScaleFont};
use image::RgbImage;
use spleen_font::{FONT_6X12, FONT_12X24, PSF2Font};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::compose::Rgb;
use crate::config::CardConfig;

/// Where to look for a font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// A font file name searched for in the system and user font directories
    Named(String),
    /// An explicit font file
    Path(PathBuf),
    /// The Spleen bitmap font compiled into the binary
    Builtin,
}

impl FontSource {
    fn load(&self, pixel_height: f32) -> Option<CardFont> {
        let path = match self {
            Self::Builtin => return Some(CardFont::Bitmap { pixel_height }),
            Self::Path(path) => path.clone(),
            Self::Named(name) => find_font_file(name)?,
        };
        let bytes = std::fs::read(&path).ok()?;
        let font = FontArc::try_from_vec(bytes).ok()?;
        Some(CardFont::Outline {
            font,
            pixel_height,
            path,
        })
    }
}

/// Ordered font strategies.
#[derive(Debug, Clone)]
pub struct FontChain {
    sources: Vec<FontSource>,
}

impl FontChain {
    pub fn new(sources: Vec<FontSource>) -> Self {
        Self { sources }
    }

    /// Preferred named font, then the fallback path, then the built-in font.
    pub fn from_config(config: &CardConfig) -> Self {
        Self::new(vec![
            FontSource::Named(config.preferred_font.clone()),
            FontSource::Path(config.fallback_font.clone()),
            FontSource::Builtin,
        ])
    }

    /// Only the built-in bitmap font. Output is identical on every machine.
    pub fn builtin_only() -> Self {
        Self::new(vec![FontSource::Builtin])
    }

    /// Try each source in order, falling back to the built-in font when
    /// every source fails.
    pub fn resolve(&self, pixel_height: f32) -> CardFont {
        let pixel_height = pixel_height.max(1.0);
        for source in &self.sources {
            if let Some(font) = source.load(pixel_height) {
                debug!(source = ?source, "content card font selected");
                return font;
            }
            debug!(source = ?source, "font source unavailable, trying next");
        }
        CardFont::Bitmap { pixel_height }
    }
}

/// A loaded font at a fixed pixel height.
#[derive(Clone)]
pub enum CardFont {
    /// TrueType/OpenType outlines, anti-aliased
    Outline {
        font: FontArc,
        pixel_height: f32,
        path: PathBuf,
    },
    /// Built-in Spleen bitmap glyphs, nearest-neighbor scaled
    Bitmap { pixel_height: f32 },
}

impl std::fmt::Debug for CardFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outline {
                pixel_height, path, ..
            } => f
                .debug_struct("Outline")
                .field("path", path)
                .field("pixel_height", pixel_height)
                .finish(),
            Self::Bitmap { pixel_height } => f
                .debug_struct("Bitmap")
                .field("pixel_height", pixel_height)
                .finish(),
        }
    }
}

impl CardFont {
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Bitmap { .. })
    }

    /// Rendered width of `text` in pixels.
    pub fn measure(&self, text: &str) -> u32 {
        match self {
            Self::Outline {
                font, pixel_height, ..
            } => {
                let scaled = font.as_scaled(*pixel_height);
                let mut width = 0.0f32;
                let mut prev = None;
                for ch in text.chars() {
                    let id = font.glyph_id(ch);
                    if let Some(p) = prev {
                        width += scaled.kern(p, id);
                    }
                    width += scaled.h_advance(id);
                    prev = Some(id);
                }
                width.ceil().max(0.0) as u32
            }
            Self::Bitmap { pixel_height } => {
                let (cell_w, _) = bitmap_cell(*pixel_height);
                u32::try_from(text.chars().count())
                    .unwrap_or(u32::MAX)
                    .saturating_mul(cell_w)
            }
        }
    }

    /// Draw `text` with its top-left corner at (x, y). Pixels outside the
    /// canvas are clipped.
    pub fn draw(&self, canvas: &mut RgbImage, x: i64, y: i64, text: &str, color: Rgb) {
        match self {
            Self::Outline {
                font, pixel_height, ..
            } => draw_outline(canvas, font, *pixel_height, x, y, text, color),
            Self::Bitmap { pixel_height } => draw_bitmap(canvas, *pixel_height, x, y, text, color),
        }
    }
}

fn draw_outline(
    canvas: &mut RgbImage,
    font: &FontArc,
    pixel_height: f32,
    x: i64,
    y: i64,
    text: &str,
    color: Rgb,
) {
    let scaled = font.as_scaled(pixel_height);
    let baseline_y = y as f32 + scaled.ascent();
    let mut caret_x = x as f32;
    let mut prev = None;

    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(p) = prev {
            caret_x += scaled.kern(p, id);
        }
        let glyph = id.with_scale_and_position(pixel_height, ab_glyph::point(caret_x, baseline_y));
        caret_x += scaled.h_advance(id);
        prev = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let cx = px as i64 + bounds.min.x as i64;
                let cy = py as i64 + bounds.min.y as i64;
                blend(canvas, cx, cy, color, coverage);
            });
        }
    }
}

/// Cell size (width, height) of the scaled bitmap font.
fn bitmap_cell(pixel_height: f32) -> (u32, u32) {
    let h = pixel_height.round().max(2.0) as u32;
    (h / 2, h)
}

fn draw_bitmap(canvas: &mut RgbImage, pixel_height: f32, x: i64, y: i64, text: &str, color: Rgb) {
    let (cell_w, cell_h) = bitmap_cell(pixel_height);
    // Small sizes read better from the 6x12 source
    let (data, src_w, src_h) = if cell_h <= 16 {
        (FONT_6X12, 6usize, 12usize)
    } else {
        (FONT_12X24, 12usize, 24usize)
    };
    let mut spleen = match PSF2Font::new(data) {
        Ok(font) => font,
        Err(_) => return,
    };

    if y >= canvas.height() as i64 || y + cell_h as i64 <= 0 {
        return;
    }

    let mut cursor_x = x;
    for ch in text.chars() {
        if cursor_x >= canvas.width() as i64 {
            break;
        }
        if cursor_x + (cell_w as i64) <= 0 {
            cursor_x += cell_w as i64;
            continue;
        }
        let utf8 = ch.to_string();
        let mut src = vec![false; src_w * src_h];
        match spleen.glyph_for_utf8(utf8.as_bytes()) {
            Some(glyph) => {
                for (row_y, row) in glyph.enumerate() {
                    for (col_x, on) in row.enumerate() {
                        if row_y < src_h && col_x < src_w {
                            src[row_y * src_w + col_x] = on;
                        }
                    }
                }
            }
            None if ch.is_whitespace() => {}
            None => draw_box(&mut src, src_w, src_h),
        }

        // Nearest-neighbor scale into the target cell
        for dy in 0..cell_h {
            for dx in 0..cell_w {
                let sx = dx as usize * src_w / cell_w as usize;
                let sy = dy as usize * src_h / cell_h as usize;
                if src[sy * src_w + sx] {
                    blend(canvas, cursor_x + dx as i64, y + dy as i64, color, 1.0);
                }
            }
        }
        cursor_x += cell_w as i64;
    }
}

/// Outline box for glyphs the font does not have.
fn draw_box(glyph: &mut [bool], width: usize, height: usize) {
    for x in 1..width - 1 {
        glyph[2 * width + x] = true;
        glyph[(height - 3) * width + x] = true;
    }
    for y in 2..height - 2 {
        glyph[y * width + 1] = true;
        glyph[y * width + width - 2] = true;
    }
}

fn blend(canvas: &mut RgbImage, x: i64, y: i64, color: Rgb, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    *pixel = Rgb(pixel.0).mix(color, coverage).to_pixel();
}

/// Directories searched for [`FontSource::Named`], most specific first.
fn font_dirs() -> Vec<PathBuf> {
    let mut dirs_out = Vec::new();
    if let Some(user) = dirs::font_dir() {
        dirs_out.push(user);
    }
    if let Some(home) = dirs::home_dir() {
        dirs_out.push(home.join(".fonts"));
    }
    for system in [
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/Library/Fonts",
        "/System/Library/Fonts",
        "C:\\Windows\\Fonts",
    ] {
        dirs_out.push(PathBuf::from(system));
    }
    dirs_out
}

/// Find a font file by name (case-insensitive) under the font directories.
pub fn find_font_file(name: &str) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.is_absolute() {
        return direct.is_file().then(|| direct.to_path_buf());
    }
    let wanted = name.to_ascii_lowercase();
    font_dirs()
        .iter()
        .find_map(|dir| search_dir(dir, &wanted, 4))
}

fn search_dir(dir: &Path, wanted: &str, depth: usize) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.to_ascii_lowercase() == wanted)
        {
            return Some(path);
        }
    }
    if depth == 0 {
        return None;
    }
    subdirs.sort();
    subdirs
        .iter()
        .find_map(|sub| search_dir(sub, wanted, depth - 1))
}
