//! # Configuration
//!
//! Defaults applied when a request leaves a styling field unset, plus the
//! fixed geometry of the text-block ("content card") renderer.
//!
//! ## Sources
//!
//! | Source | Precedence |
//! |--------|------------|
//! | `Config::default()` | lowest |
//! | JSON file (`Config::from_json_file`) | overrides defaults, missing fields keep them |
//! | `QUICKQR_*` environment variables (`Config::with_env`) | overrides file |
//! | CLI flags | highest (applied by the binary) |
//!
//! ## Usage
//!
//! ```
//! use quickqr::config::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.default_size, 10);
//! assert_eq!(config.card.wrap_width, 50);
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::QuickQrError;
use crate::symbol::ErrorCorrection;

/// Accepted range for the module scale (pixels per module).
pub const SIZE_RANGE: std::ops::RangeInclusive<u32> = 1..=40;

/// Accepted range for the quiet-zone border, in modules.
pub const BORDER_RANGE: std::ops::RangeInclusive<u32> = 0..=10;

/// Accepted range for content-card font sizes, in pixels.
pub const FONT_SIZE_RANGE: std::ops::RangeInclusive<u32> = 1..=512;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pixels per module when a request omits `size`
    pub default_size: u32,
    /// Error-correction level when a request omits it
    pub default_error_correction: ErrorCorrection,
    /// Quiet-zone modules when a request omits `border`
    pub default_border: u32,
    /// Base URL for `content` symbols (`<base>/view/<id>`)
    pub view_base_url: String,
    /// Text-block renderer geometry
    pub card: CardConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_size: 10,
            default_error_correction: ErrorCorrection::M,
            default_border: 4,
            view_base_url: "https://quickqr-frontend.onrender.com".to_string(),
            card: CardConfig::default(),
        }
    }
}

/// # Content Card Geometry
///
/// ```text
/// ┌──────────────── width ────────────────┐
/// │               padding                 │
/// │        centered wrapped line 1        │ ← line_height
/// │        centered wrapped line 2        │
/// │               padding                 │
/// └───────────────────────────────────────┘
/// height = lines * line_height + 2 * padding
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    /// Canvas width in pixels
    pub width: u32,
    /// Vertical advance per wrapped line
    pub line_height: u32,
    /// Top/bottom padding
    pub padding: u32,
    /// Wrap column, in characters
    pub wrap_width: usize,
    /// Default font pixel size
    pub font_size: u32,
    /// First font tried, looked up by file name in the font directories
    pub preferred_font: String,
    /// Second font tried, an absolute path
    pub fallback_font: PathBuf,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            width: 800,
            line_height: 30,
            padding: 40,
            wrap_width: 50,
            font_size: 24,
            preferred_font: "arial.ttf".to_string(),
            fallback_font: PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
        }
    }
}

impl Config {
    /// Load a JSON configuration file. Fields absent from the file keep
    /// their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, QuickQrError> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with `QUICKQR_*` environment variables.
    pub fn from_env() -> Result<Self, QuickQrError> {
        Self::default().with_env()
    }

    /// Overlay `QUICKQR_*` environment variables onto this config.
    pub fn with_env(self) -> Result<Self, QuickQrError> {
        self.with_vars(|key| std::env::var(key).ok())
    }

    /// Overlay variables from an arbitrary lookup (the environment in
    /// production, a map in tests).
    pub fn with_vars<F>(mut self, lookup: F) -> Result<Self, QuickQrError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("QUICKQR_DEFAULT_SIZE") {
            self.default_size = parse_u32("QUICKQR_DEFAULT_SIZE", &v)?;
        }
        if let Some(v) = lookup("QUICKQR_DEFAULT_ERROR_CORRECTION") {
            self.default_error_correction = v.parse().map_err(|_| {
                QuickQrError::Config(format!(
                    "QUICKQR_DEFAULT_ERROR_CORRECTION: expected L, M, Q or H, got \"{}\"",
                    v
                ))
            })?;
        }
        if let Some(v) = lookup("QUICKQR_DEFAULT_BORDER") {
            self.default_border = parse_u32("QUICKQR_DEFAULT_BORDER", &v)?;
        }
        if let Some(v) = lookup("QUICKQR_VIEW_BASE_URL") {
            self.view_base_url = v;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check that the defaults themselves are usable.
    pub fn validate(&self) -> Result<(), QuickQrError> {
        if !SIZE_RANGE.contains(&self.default_size) {
            return Err(QuickQrError::Config(format!(
                "default_size must be in 1..=40, got {}",
                self.default_size
            )));
        }
        if !BORDER_RANGE.contains(&self.default_border) {
            return Err(QuickQrError::Config(format!(
                "default_border must be in 0..=10, got {}",
                self.default_border
            )));
        }
        if !FONT_SIZE_RANGE.contains(&self.card.font_size) {
            return Err(QuickQrError::Config(format!(
                "card.font_size must be in 1..=512, got {}",
                self.card.font_size
            )));
        }
        if self.card.wrap_width == 0 || self.card.width == 0 {
            return Err(QuickQrError::Config(
                "card width and wrap_width must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_u32(key: &str, value: &str) -> Result<u32, QuickQrError> {
    value
        .trim()
        .parse()
        .map_err(|_| QuickQrError::Config(format!("{}: expected an integer, got \"{}\"", key, value)))
}
