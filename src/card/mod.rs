//! # Content Cards
//!
//! Renders a block of text (optional title and description followed by a
//! body) into a standalone raster. Cards are the "content image" behind a
//! `content` symbol, and can also be stacked above a symbol.
//!
//! ## Layout
//!
//! ```text
//! "Title: <title>\n\nDescription: <description>\n\n<body>"
//!        │ word wrap at 50 columns (whitespace collapses to spaces)
//!        ▼
//! ┌───────────────── 800px ─────────────────┐
//! │                 40px                    │
//! │          centered line (30px)           │
//! │          centered line (30px)           │
//! │                 40px                    │
//! └─────────────────────────────────────────┘
//! ```

pub mod font;

/// Largest card canvas, in pixels.
pub const MAX_CARD_PIXELS: u64 = 16 * 1024 * 1024;

/// Column width of a tab stop.
const TAB_SIZE: usize = 8;

pub use font::{CardFont, FontChain, FontSource};

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compose::{Rgb, png};
use crate::config::{CardConfig, FONT_SIZE_RANGE};
use crate::error::QuickQrError;

/// Text content of a card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub body: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl TextBlock {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The text that gets wrapped: title and description sections, each
    /// only when present, then the body.
    pub fn full_text(&self) -> String {
        let mut text = String::new();
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            text.push_str(&format!("Title: {}\n\n", title));
        }
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            text.push_str(&format!("Description: {}\n\n", description));
        }
        text.push_str(&self.body);
        text
    }
}

/// Colors and size for a card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardStyle {
    pub font_size: u32,
    pub font_color: Rgb,
    pub background: Rgb,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            font_size: 24,
            font_color: Rgb::BLACK,
            background: Rgb::WHITE,
        }
    }
}

/// Card renderer: fixed geometry plus a font chain.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    config: CardConfig,
    fonts: FontChain,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(CardConfig::default())
    }
}

impl TextRenderer {
    pub fn new(config: CardConfig) -> Self {
        let fonts = FontChain::from_config(&config);
        Self { config, fonts }
    }

    pub fn with_fonts(mut self, fonts: FontChain) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    /// Wrapped lines for `block`.
    pub fn layout(&self, block: &TextBlock) -> Vec<String> {
        wrap(&block.full_text(), self.config.wrap_width)
    }

    /// Canvas height for `line_count` wrapped lines.
    pub fn canvas_height(&self, line_count: usize) -> Option<u32> {
        u32::try_from(line_count)
            .ok()?
            .checked_mul(self.config.line_height)?
            .checked_add(self.config.padding.checked_mul(2)?)
    }

    pub fn render(&self, block: &TextBlock, style: &CardStyle) -> Result<RgbImage, QuickQrError> {
        if !FONT_SIZE_RANGE.contains(&style.font_size) {
            return Err(QuickQrError::Render(format!(
                "font size must be in 1..=512, got {}",
                style.font_size
            )));
        }

        let lines = self.layout(block);
        let width = self.config.width;
        let height = self
            .canvas_height(lines.len())
            .filter(|&h| u64::from(width) * u64::from(h) <= MAX_CARD_PIXELS)
            .ok_or_else(|| {
                QuickQrError::Render(format!(
                    "{} lines is too tall for a content card",
                    lines.len()
                ))
            })?;

        let font = self.fonts.resolve(style.font_size as f32);
        debug!(lines = lines.len(), width, height, font = ?font, "rendering content card");

        let mut canvas = RgbImage::from_pixel(width, height, style.background.to_pixel());
        let mut y = self.config.padding as i64;
        for line in &lines {
            let text_width = font.measure(line) as i64;
            let x = (width as i64 - text_width).div_euclid(2);
            font.draw(&mut canvas, x, y, line, style.font_color);
            y += self.config.line_height as i64;
        }
        Ok(canvas)
    }

    pub fn render_data_url(&self, block: &TextBlock, style: &CardStyle) -> Result<String, QuickQrError> {
        let canvas = self.render(block, style)?;
        Ok(png::to_data_url(&png::to_png_bytes(&canvas)?))
    }
}

/// Render a card with the default geometry and font chain.
pub fn render_text_block(
    body: &str,
    title: Option<&str>,
    description: Option<&str>,
    style: &CardStyle,
) -> Result<RgbImage, QuickQrError> {
    TextRenderer::default().render(&text_block(body, title, description), style)
}

/// [`render_text_block`], serialized as a PNG data URL.
pub fn render_text_block_data_url(
    body: &str,
    title: Option<&str>,
    description: Option<&str>,
    style: &CardStyle,
) -> Result<String, QuickQrError> {
    TextRenderer::default().render_data_url(&text_block(body, title, description), style)
}

fn text_block(body: &str, title: Option<&str>, description: Option<&str>) -> TextBlock {
    TextBlock {
        body: body.to_string(),
        title: title.map(str::to_string),
        description: description.map(str::to_string),
    }
}

/// Greedy word wrap at `width` characters.
///
/// Tabs expand to 8-column stops, then every whitespace character becomes
/// a space, so newlines do not force breaks. Hyphenated words may break
/// after a hyphen. Whitespace at line edges is dropped (except leading
/// whitespace of the very first line) and words longer than `width` are
/// split across lines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let normalized: String = expand_tabs(text)
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();

    // Reversed so the next chunk is at the end
    let mut chunks: Vec<String> = split_chunks(&normalized);
    chunks.reverse();

    let mut lines: Vec<String> = Vec::new();
    while !chunks.is_empty() {
        let mut current: Vec<String> = Vec::new();
        let mut current_len = 0usize;

        if !lines.is_empty() && chunks.last().is_some_and(|c| is_space(c)) {
            chunks.pop();
        }

        while let Some(chunk) = chunks.last() {
            let len = chunk.chars().count();
            if current_len + len > width {
                break;
            }
            current_len += len;
            if let Some(chunk) = chunks.pop() {
                current.push(chunk);
            }
        }

        if let Some(chunk) = chunks.last_mut() {
            if chunk.chars().count() > width {
                let space_left = width.saturating_sub(current_len).max(1);
                let split_at = chunk
                    .char_indices()
                    .nth(space_left)
                    .map(|(i, _)| i)
                    .unwrap_or(chunk.len());
                let tail = chunk.split_off(split_at);
                current.push(std::mem::replace(chunk, tail));
            }
        }

        if current.last().is_some_and(|c| is_space(c)) {
            current.pop();
        }
        if !current.is_empty() {
            lines.push(current.concat());
        }
    }
    lines
}

fn is_space(chunk: &str) -> bool {
    chunk.starts_with(' ')
}

fn expand_tabs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0usize;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let pad = TAB_SIZE - column % TAB_SIZE;
                out.extend(std::iter::repeat_n(' ', pad));
                column += pad;
            }
            '\n' | '\r' => {
                out.push(ch);
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }
    out
}

/// Alternating runs of spaces and words, with hyphenated words split
/// after each hyphen.
fn split_chunks(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut in_space = None;
    for ch in text.chars() {
        let space = ch == ' ';
        if in_space.is_some_and(|s| s != space) {
            chunks.push(std::mem::take(&mut current));
        }
        in_space = Some(space);
        current.push(ch);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
        .into_iter()
        .flat_map(|chunk| {
            if is_space(&chunk) {
                vec![chunk]
            } else {
                split_hyphens(&chunk)
            }
        })
        .collect()
}

fn is_letter(c: Option<&char>) -> bool {
    c.is_some_and(|c| c.is_alphabetic())
}

/// Break a word after a hyphen that has two letters (or `letter-letter`)
/// before it and `letter letter` or `letter-letter` after it, so
/// "well-known" splits but "e-mail" and "x-1" do not.
fn split_hyphens(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut parts = Vec::new();
    let mut start = 0;
    for i in 0..chars.len() {
        if chars[i] != '-' || i < 2 {
            continue;
        }
        let before = is_letter(chars.get(i - 1))
            && (is_letter(chars.get(i - 2))
                || (chars[i - 2] == '-' && i >= 3 && is_letter(chars.get(i - 3))));
        let after = is_letter(chars.get(i + 1))
            && (is_letter(chars.get(i + 2))
                || (chars.get(i + 2) == Some(&'-') && is_letter(chars.get(i + 3))));
        if before && after {
            parts.push(chars[start..=i].iter().collect());
            start = i + 1;
        }
    }
    parts.push(chars[start..].iter().collect());
    parts
}
