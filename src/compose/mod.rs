//! # Symbol & Image Composition
//!
//! Drives the symbol encoder and turns its module grid into a styled
//! raster, then serializes that raster for transport.
//!
//! ## Pipeline
//!
//! ```text
//! payload ──► SymbolEncoder ──► ModuleMatrix ──► rasterize(scale, border, fg, bg)
//!                                                     │
//!                             LogoOverlay (optional) ◄┘
//!                                                     │
//!                                 ComposedImage ──► PNG ──► data:image/png;base64,...
//! ```
//!
//! Each dark module becomes a `scale × scale` block of the foreground
//! color; light modules and the `border`-module quiet zone get the
//! background color. The output is a pure function of its inputs.
//!
//! ## Example
//!
//! ```
//! use quickqr::compose::{Composer, Style};
//! use quickqr::symbol::ErrorCorrection;
//!
//! let composer = Composer::new();
//! let image = composer
//!     .compose("https://example.com", ErrorCorrection::M, &Style::default(), None)
//!     .unwrap();
//! assert!(image.to_data_url().unwrap().starts_with("data:image/png;base64,"));
//! ```

mod color;
pub mod png;

pub use color::Rgb;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::QuickQrError;
use crate::symbol::{ErrorCorrection, ModuleMatrix, QrcodeEncoder, SymbolEncoder};

/// Styling applied when rasterizing a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    /// Pixels per module
    pub scale: u32,
    /// Quiet-zone width in modules
    pub border: u32,
    pub foreground: Rgb,
    pub background: Rgb,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            scale: 10,
            border: 4,
            foreground: Rgb::BLACK,
            background: Rgb::WHITE,
        }
    }
}

/// Opaque reference to a logo (path, URL, asset key...). Its meaning is
/// owned by the [`LogoOverlay`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogoRef(pub String);

/// Pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Extension point for drawing a logo at the symbol's visual center.
///
/// Implementations must leave enough of the symbol intact for the chosen
/// error-correction level to recover it.
pub trait LogoOverlay: Send + Sync {
    fn apply(&self, image: &mut RgbImage, logo: &LogoRef, symbol: Rect) -> Result<(), QuickQrError>;
}

/// The default overlay: logo compositing is not supported, the image is
/// returned untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLogo;

impl LogoOverlay for NoLogo {
    fn apply(&self, _image: &mut RgbImage, logo: &LogoRef, _symbol: Rect) -> Result<(), QuickQrError> {
        warn!(logo = %logo.0, "logo overlay is not supported; symbol left unchanged");
        Ok(())
    }
}

/// A rendered symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedImage {
    image: RgbImage,
    /// Modules per side, without border
    modules: usize,
    version: u8,
}

impl ComposedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Modules per side of the symbol itself (no quiet zone).
    pub fn modules(&self) -> usize {
        self.modules
    }

    /// Symbol version chosen by the encoder.
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Put `block` above the symbol (see [`stack_vertical`]).
    pub fn with_header(self, block: &RgbImage, background: Rgb) -> Self {
        Self {
            image: stack_vertical(block, &self.image, background),
            ..self
        }
    }

    pub fn to_png(&self) -> Result<Vec<u8>, QuickQrError> {
        png::to_png_bytes(&self.image)
    }

    pub fn to_data_url(&self) -> Result<String, QuickQrError> {
        Ok(png::to_data_url(&self.to_png()?))
    }
}

/// Symbol composer: a symbol encoder plus a logo overlay.
pub struct Composer<E = QrcodeEncoder, L = NoLogo> {
    encoder: E,
    logo: L,
}

impl Composer {
    /// Composer backed by the `qrcode` crate, without logo support.
    pub fn new() -> Self {
        Self {
            encoder: QrcodeEncoder,
            logo: NoLogo,
        }
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SymbolEncoder, L: LogoOverlay> Composer<E, L> {
    pub fn with_parts(encoder: E, logo: L) -> Self {
        Self { encoder, logo }
    }

    /// Swap the symbol encoder.
    pub fn encoder<E2: SymbolEncoder>(self, encoder: E2) -> Composer<E2, L> {
        Composer {
            encoder,
            logo: self.logo,
        }
    }

    /// Swap the logo overlay.
    pub fn logo_overlay<L2: LogoOverlay>(self, logo: L2) -> Composer<E, L2> {
        Composer {
            encoder: self.encoder,
            logo,
        }
    }

    /// Generate the symbol for `payload` and rasterize it.
    pub fn compose(
        &self,
        payload: &str,
        level: ErrorCorrection,
        style: &Style,
        logo: Option<&LogoRef>,
    ) -> Result<ComposedImage, QuickQrError> {
        let matrix = self.encoder.generate(payload, level)?;
        debug!(
            modules = matrix.width(),
            version = matrix.version(),
            level = %level,
            "symbol generated"
        );

        let mut image = rasterize(&matrix, style)?;

        if let Some(logo) = logo {
            let symbol = Rect {
                x: 0,
                y: 0,
                width: image.width(),
                height: image.height(),
            };
            self.logo.apply(&mut image, logo, symbol)?;
        }

        Ok(ComposedImage {
            image,
            modules: matrix.width(),
            version: matrix.version(),
        })
    }
}

/// Paint a module grid: `scale` pixels per module, `border` modules of
/// background on every side.
pub fn rasterize(matrix: &ModuleMatrix, style: &Style) -> Result<RgbImage, QuickQrError> {
    if style.scale == 0 {
        return Err(QuickQrError::Render("module scale must be at least 1".to_string()));
    }

    let side = (matrix.width() as u32)
        .checked_add(style.border.checked_mul(2).unwrap_or(u32::MAX))
        .and_then(|modules| modules.checked_mul(style.scale))
        .filter(|&px| (px as u64) * (px as u64) * 3 <= isize::MAX as u64)
        .ok_or_else(|| {
            QuickQrError::Render(format!(
                "{} modules with border {} at scale {} is too large to rasterize",
                matrix.width(),
                style.border,
                style.scale
            ))
        })?;

    let fg = style.foreground.to_pixel();
    let bg = style.background.to_pixel();
    let border = style.border as i64;
    let scale = style.scale;

    Ok(RgbImage::from_fn(side, side, |x, y| {
        let mx = (x / scale) as i64 - border;
        let my = (y / scale) as i64 - border;
        if matrix.is_dark(mx, my) { fg } else { bg }
    }))
}

/// Stack `top` above `bottom` on a canvas as wide as the wider of the two,
/// centering each horizontally and filling the rest with `background`.
pub fn stack_vertical(top: &RgbImage, bottom: &RgbImage, background: Rgb) -> RgbImage {
    let width = top.width().max(bottom.width());
    let height = top.height() + bottom.height();
    let mut canvas = RgbImage::from_pixel(width, height, background.to_pixel());

    let top_x = (width - top.width()) / 2;
    let bottom_x = (width - bottom.width()) / 2;
    image::imageops::replace(&mut canvas, top, top_x as i64, 0);
    image::imageops::replace(&mut canvas, bottom, bottom_x as i64, top.height() as i64);
    canvas
}
