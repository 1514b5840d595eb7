//! # Symbol Encoding
//!
//! The boundary to the external QR symbol encoder. The encoder owns
//! capacity fitting (version selection), Reed-Solomon redundancy and
//! module placement; this module only configures it and hands back a
//! plain boolean module grid.
//!
//! ## Error Correction Levels
//!
//! | Level | Recovery | Use Case |
//! |-------|----------|----------|
//! | L | ~7% | Clean environments |
//! | M | ~15% | General use (default) |
//! | Q | ~25% | Industrial use |
//! | H | ~30% | Harsh environments, logo overlays |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QuickQrError;

/// QR error-correction level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(from = "String")]
pub enum ErrorCorrection {
    /// ~7% recovery
    L,
    /// ~15% recovery (default)
    #[default]
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl ErrorCorrection {
    pub const ALL: [ErrorCorrection; 4] = [Self::L, Self::M, Self::Q, Self::H];

    /// Parse a level name, falling back to `M` for anything unrecognized.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        }
    }

    /// Approximate share of damaged codewords the symbol survives.
    pub fn recovery_percent(&self) -> u8 {
        match self {
            Self::L => 7,
            Self::M => 15,
            Self::Q => 25,
            Self::H => 30,
        }
    }

    fn ec_level(self) -> qrcode::EcLevel {
        match self {
            Self::L => qrcode::EcLevel::L,
            Self::M => qrcode::EcLevel::M,
            Self::Q => qrcode::EcLevel::Q,
            Self::H => qrcode::EcLevel::H,
        }
    }
}

impl FromStr for ErrorCorrection {
    type Err = QuickQrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(Self::L),
            "M" => Ok(Self::M),
            "Q" => Ok(Self::Q),
            "H" => Ok(Self::H),
            other => Err(QuickQrError::InvalidRequest(format!(
                "expected \"L\", \"M\", \"Q\", or \"H\", got \"{}\"",
                other
            ))),
        }
    }
}

impl From<String> for ErrorCorrection {
    fn from(s: String) -> Self {
        Self::parse_lenient(&s)
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Square grid of modules produced by a [`SymbolEncoder`].
///
/// `true` = dark module. Row-major, `width * width` entries, no quiet zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatrix {
    width: usize,
    modules: Vec<bool>,
    /// Symbol version chosen by the encoder (1-40), 0 if unknown
    version: u8,
}

impl ModuleMatrix {
    /// Build a matrix from row-major modules. Returns `None` when the
    /// module count is not `width * width`.
    pub fn new(width: usize, modules: Vec<bool>, version: u8) -> Option<Self> {
        (modules.len() == width * width).then_some(Self {
            width,
            modules,
            version,
        })
    }

    /// Modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Whether the module at (x, y) is dark. Out-of-range reads are light,
    /// so callers can walk into the quiet zone freely.
    #[inline]
    pub fn is_dark(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.width as i64 {
            return false;
        }
        self.modules[y as usize * self.width + x as usize]
    }

    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&m| m).count()
    }
}

/// An external symbol-encoding capability.
///
/// Implementations pick the smallest symbol that fits `payload` at `level`
/// and fail with [`QuickQrError::Encoding`] when nothing fits.
pub trait SymbolEncoder: Send + Sync {
    fn generate(&self, payload: &str, level: ErrorCorrection) -> Result<ModuleMatrix, QuickQrError>;
}

/// [`SymbolEncoder`] backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrcodeEncoder;

impl SymbolEncoder for QrcodeEncoder {
    fn generate(&self, payload: &str, level: ErrorCorrection) -> Result<ModuleMatrix, QuickQrError> {
        use qrcode::{Color, QrCode, Version};

        let code = QrCode::with_error_correction_level(payload.as_bytes(), level.ec_level())
            .map_err(|e| {
                QuickQrError::Encoding(format!(
                    "QR code generation failed ({} bytes at level {}): {}",
                    payload.len(),
                    level,
                    e
                ))
            })?;

        let version = match code.version() {
            Version::Normal(v) => v as u8,
            Version::Micro(_) => 0,
        };
        let width = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|c| c == Color::Dark)
            .collect();

        ModuleMatrix::new(width, modules, version).ok_or_else(|| {
            QuickQrError::Encoding(format!("encoder returned a malformed {}-wide grid", width))
        })
    }
}
