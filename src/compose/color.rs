//! Palette colors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QuickQrError;

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);

    pub fn to_pixel(self) -> image::Rgb<u8> {
        image::Rgb(self.0)
    }

    /// Linear blend toward `other` by `t` (0.0 = self, 1.0 = other).
    pub fn mix(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mut out = [0u8; 3];
        for (i, channel) in out.iter_mut().enumerate() {
            let a = self.0[i] as f32;
            let b = other.0[i] as f32;
            *channel = (a + (b - a) * t).round() as u8;
        }
        Rgb(out)
    }
}

impl FromStr for Rgb {
    type Err = QuickQrError;

    /// Accepts `#RGB`, `#RRGGBB` and a handful of color names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let unsupported = || QuickQrError::Render(format!("unsupported color value \"{}\"", s));

        if let Some(hex) = value.strip_prefix('#') {
            if !hex.is_ascii() {
                return Err(unsupported());
            }
            let digits: Vec<u8> = match hex.len() {
                3 => hex
                    .chars()
                    .map(|c| c.to_digit(16).map(|d| (d * 17) as u8))
                    .collect::<Option<_>>()
                    .ok_or_else(unsupported)?,
                6 => (0..3)
                    .map(|i| u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok())
                    .collect::<Option<_>>()
                    .ok_or_else(unsupported)?,
                _ => return Err(unsupported()),
            };
            return Ok(Rgb([digits[0], digits[1], digits[2]]));
        }

        let named = match value.to_ascii_lowercase().as_str() {
            "black" => [0, 0, 0],
            "white" => [255, 255, 255],
            "red" => [255, 0, 0],
            "green" => [0, 128, 0],
            "blue" => [0, 0, 255],
            "yellow" => [255, 255, 0],
            "orange" => [255, 165, 0],
            "gray" | "grey" => [128, 128, 128],
            _ => return Err(unsupported()),
        };
        Ok(Rgb(named))
    }
}

impl TryFrom<String> for Rgb {
    type Error = QuickQrError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0[0], self.0[1], self.0[2])
    }
}
