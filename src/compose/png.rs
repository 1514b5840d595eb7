//! PNG serialization and `data:` URL framing.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

use crate::error::QuickQrError;

/// Framing prefix for every encoded image.
pub const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Encode a raster as a single-frame PNG.
pub fn to_png_bytes(img: &RgbImage) -> Result<Vec<u8>, QuickQrError> {
    let mut png_bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| QuickQrError::Render(format!("PNG encoding failed: {}", e)))?;
    Ok(png_bytes)
}

/// Frame PNG bytes as `data:image/png;base64,...`.
pub fn to_data_url(png_bytes: &[u8]) -> String {
    let mut out = String::with_capacity(DATA_URL_PREFIX.len() + png_bytes.len().div_ceil(3) * 4);
    out.push_str(DATA_URL_PREFIX);
    BASE64.encode_string(png_bytes, &mut out);
    out
}

/// Recover the PNG bytes from a data URL produced by [`to_data_url`].
pub fn from_data_url(data_url: &str) -> Result<Vec<u8>, QuickQrError> {
    let encoded = data_url.strip_prefix(DATA_URL_PREFIX).ok_or_else(|| {
        QuickQrError::Render(format!("expected a \"{}\" prefix", DATA_URL_PREFIX))
    })?;
    BASE64
        .decode(encoded)
        .map_err(|e| QuickQrError::Render(format!("invalid base64: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_signature() {
        let img = RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30]));
        let bytes = to_png_bytes(&img).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_data_url_framing() {
        let url = to_data_url(b"abc");
        assert_eq!(url, "data:image/png;base64,YWJj");
        assert_eq!(from_data_url(&url).unwrap(), b"abc");
        assert!(from_data_url("YWJj").is_err());
    }

    #[test]
    fn test_decodes_back_to_same_pixels() {
        let mut img = RgbImage::from_pixel(4, 4, image::Rgb([255, 255, 255]));
        img.put_pixel(1, 2, image::Rgb([0, 0, 0]));
        let url = to_data_url(&to_png_bytes(&img).unwrap());
        let decoded = image::load_from_memory(&from_data_url(&url).unwrap())
            .unwrap()
            .to_rgb8();
        assert_eq!(decoded, img);
    }
}
