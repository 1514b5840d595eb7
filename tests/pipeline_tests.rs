//! # Pipeline Tests
//!
//! End-to-end checks through the public API: request in, PNG data URL and
//! metadata out.
//!
//! ## Test Coverage
//!
//! - **Payloads**: every known category produces the documented payload.
//! - **Images**: decoded PNGs have the advertised geometry and palette.
//! - **Failures**: over-capacity and invalid requests come back as
//!   `success: false`, never as panics.
//! - **Config**: JSON file defaults flow into requests.

use image::RgbImage;
use pretty_assertions::assert_eq;

use quickqr::card::{CardStyle, FontChain, TextBlock, TextRenderer};
use quickqr::compose::{Rgb, png};
use quickqr::content::{ContactCard, StructuredContent};
use quickqr::{Category, Config, EncodeRequest, EncodeResult, ErrorCorrection, Generator, encode};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Generator whose content cards use the built-in font on every machine.
fn generator() -> Generator {
    Generator::default()
        .with_text_renderer(TextRenderer::default().with_fonts(FontChain::builtin_only()))
}

/// Decode the PNG carried by a successful result.
fn decode(result: &EncodeResult) -> RgbImage {
    let data_url = result.encoded_data.as_deref().expect("encoded data");
    let bytes = png::from_data_url(data_url).expect("valid data URL");
    image::load_from_memory(&bytes).expect("valid PNG").to_rgb8()
}

// ============================================================================
// PAYLOADS
// ============================================================================

#[test]
fn test_payload_per_category() {
    let cases = [
        ("example.com", Category::Url, "https://example.com"),
        ("http://a.b", Category::Url, "http://a.b"),
        ("hello", Category::Text, "hello"),
        ("a@b.com", Category::Email, "mailto:a@b.com"),
        ("+15551234", Category::Phone, "tel:+15551234"),
        ("555:hi there", Category::Sms, "sms:555:hi there"),
        ("555", Category::Sms, "sms:555"),
    ];
    let g = generator();
    for (raw, category, expected) in cases {
        let result = g.encode(&EncodeRequest::new(raw, category.clone()));
        assert!(result.success, "{} {:?}", raw, category);
        assert_eq!(result.metadata.unwrap().payload_used, expected);
    }
}

#[test]
fn test_unknown_category_passes_through() {
    let result = encode(&EncodeRequest::new("geo:1,2", Category::from("geo".to_string())));
    assert!(result.success);
    let metadata = result.metadata.unwrap();
    assert_eq!(metadata.payload_used, "geo:1,2");
    assert_eq!(metadata.category.as_str(), "geo");
}

#[test]
fn test_structured_contact() {
    let card = ContactCard::new("Ada Lovelace").email("ada@example.com");
    let result = generator().encode(&EncodeRequest::structured(StructuredContent::Contact(card)));
    assert!(result.success);
    let payload = result.metadata.unwrap().payload_used;
    assert!(payload.starts_with("BEGIN:VCARD\n"));
    assert!(payload.contains("FN:Ada Lovelace"));
    assert!(payload.contains("EMAIL:ada@example.com"));
}

// ============================================================================
// IMAGES
// ============================================================================

#[test]
fn test_png_geometry_and_palette() {
    let request = EncodeRequest::new("https://example.com", Category::Text)
        .symbol_size(4)
        .border(3)
        .colors(Rgb([10, 20, 30]), Rgb([250, 240, 230]));
    let result = generator().encode(&request);
    let metadata = result.metadata.clone().unwrap();
    let img = decode(&result);

    let side = (metadata.modules as u32 + 6) * 4;
    assert_eq!(img.dimensions(), (side, side));
    // Quiet zone corner, then the top-left finder pattern corner
    assert_eq!(img.get_pixel(0, 0).0, [250, 240, 230]);
    assert_eq!(img.get_pixel(12, 12).0, [10, 20, 30]);
    assert!(img.pixels().all(|p| p.0 == [10, 20, 30] || p.0 == [250, 240, 230]));
}

#[test]
fn test_same_request_same_bytes() {
    let request = EncodeRequest::new("deterministic", Category::Text)
        .error_correction(ErrorCorrection::H)
        .symbol_size(3);
    let g = generator();
    assert_eq!(g.encode(&request), g.encode(&request));
}

#[test]
fn test_higher_level_never_shrinks_symbol() {
    let g = generator();
    let mut previous = 0;
    for level in ErrorCorrection::ALL {
        let request = EncodeRequest::new("The quick brown fox jumps over the lazy dog", Category::Text)
            .error_correction(level)
            .symbol_size(1);
        let modules = g.encode(&request).metadata.unwrap().modules;
        assert!(modules >= previous, "{} shrank to {}", level, modules);
        previous = modules;
    }
}

#[test]
fn test_card_above_symbol() {
    let request = EncodeRequest::new("menu", Category::Text)
        .symbol_size(2)
        .text_block(TextBlock::new("Soup of the day").title("Menu").description("Today"));
    let img = decode(&generator().encode(&request));
    let card = TextRenderer::default()
        .with_fonts(FontChain::builtin_only())
        .render(
            &TextBlock::new("Soup of the day").title("Menu").description("Today"),
            &CardStyle::default(),
        )
        .unwrap();
    assert_eq!(img.width(), 800);
    assert!(img.height() > card.height());
    // The card occupies the top rows unchanged
    assert_eq!(img.get_pixel(0, 0).0, card.get_pixel(0, 0).0);
}

#[test]
fn test_standalone_card() {
    let url = quickqr::card::render_text_block_data_url(
        "Hello",
        Some("Title"),
        None,
        &CardStyle::default(),
    )
    .unwrap();
    let img = image::load_from_memory(&png::from_data_url(&url).unwrap()).unwrap();
    // "Title: Hello" fits one line
    assert_eq!((img.width(), img.height()), (800, 110));
}

// ============================================================================
// FAILURES
// ============================================================================

#[test]
fn test_over_capacity_fails_cleanly() {
    let request = EncodeRequest::new("9".repeat(8000), Category::Text)
        .error_correction(ErrorCorrection::L);
    let result = generator().encode(&request);
    assert!(!result.success);
    assert!(result.encoded_data.is_none());
    assert!(result.metadata.is_none());
    assert!(result.error_message.unwrap().starts_with("Encoding error"));
}

#[test]
fn test_invalid_json_item_is_isolated() {
    let results = generator()
        .encode_batch_json(
            r#"[{"content": "ok", "qr_type": "text"}, {"content": "x", "qr_type": "text", "size": "big"}]"#,
        )
        .unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].success);
    assert!(!results[1].success);
    assert!(results[1].error_message.as_ref().unwrap().starts_with("JSON error"));
}

#[test]
fn test_huge_text_block_fails_cleanly() {
    let request = EncodeRequest::new("menu", Category::Text)
        .text_block(TextBlock::new("lorem ipsum ".repeat(400_000)));
    let result = generator().encode(&request);
    assert!(!result.success);
    assert!(result.error_message.unwrap().starts_with("Render error"));
}

// ============================================================================
// CONFIG
// ============================================================================

#[test]
fn test_config_file_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quickqr.json");
    std::fs::write(
        &path,
        r#"{"default_size": 3, "default_error_correction": "H", "view_base_url": "https://qr.test/"}"#,
    )
    .unwrap();
    let config = Config::from_json_file(&path).unwrap();
    let g = Generator::new(config);

    let result = g.encode(&EncodeRequest::new("x", Category::Content).content_id("42"));
    let metadata = result.metadata.unwrap();
    assert_eq!(metadata.payload_used, "https://qr.test/view/42");
    assert_eq!(metadata.symbol_size, 3);
    assert_eq!(metadata.error_correction, ErrorCorrection::H);
    assert_eq!(metadata.border_modules, 4);
}
