//! # Encode Requests
//!
//! The public entry point: one [`EncodeRequest`] in, one [`EncodeResult`]
//! out. Failures never escape as errors or panics; they come back as
//! `success: false` with a message.
//!
//! ## Flow
//!
//! ```text
//! EncodeRequest ──► payload (content::encode | structured | content link)
//!               ──► Composer (symbol + palette + logo)
//!               ──► optional content card stacked on top
//!               ──► PNG ──► "data:image/png;base64,..." + Metadata
//! ```
//!
//! ## Example
//!
//! ```
//! use quickqr::content::Category;
//! use quickqr::request::{encode, EncodeRequest};
//!
//! let result = encode(&EncodeRequest::new("example.com", Category::Url));
//! assert!(result.success);
//! assert_eq!(result.metadata.unwrap().payload_used, "https://example.com");
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::card::{CardStyle, TextBlock, TextRenderer};
use crate::compose::{ComposedImage, Composer, LogoOverlay, LogoRef, NoLogo, Rgb, Style};
use crate::config::{BORDER_RANGE, Config, SIZE_RANGE};
use crate::content::{self, Category, StructuredContent};
use crate::error::QuickQrError;
use crate::symbol::{ErrorCorrection, QrcodeEncoder, SymbolEncoder};

fn default_foreground() -> Rgb {
    Rgb::BLACK
}

fn default_background() -> Rgb {
    Rgb::WHITE
}

/// What to encode and how to draw it.
///
/// Unset `symbol_size`, `error_correction` and `border_modules` take the
/// generator's configured defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeRequest {
    #[serde(alias = "content")]
    pub raw_content: String,
    #[serde(alias = "qr_type")]
    pub category: Category,
    /// Pixels per module (1-40)
    #[serde(default, alias = "size")]
    pub symbol_size: Option<u32>,
    #[serde(default)]
    pub error_correction: Option<ErrorCorrection>,
    /// Quiet-zone width in modules (0-10)
    #[serde(default, alias = "border")]
    pub border_modules: Option<u32>,
    #[serde(default = "default_foreground")]
    pub foreground_color: Rgb,
    #[serde(default = "default_background")]
    pub background_color: Rgb,
    #[serde(default, alias = "logo_url")]
    pub logo_ref: Option<LogoRef>,
    /// Card title, used with `text_block`
    #[serde(default)]
    pub title: Option<String>,
    /// Card description, used with `text_block`
    #[serde(default)]
    pub description: Option<String>,
    /// Card body; when set, a content card is drawn above the symbol
    #[serde(default)]
    pub text_block: Option<String>,
    /// Hosted content id for `content` symbols
    #[serde(default)]
    pub content_id: Option<String>,
    /// Multi-field content; replaces `raw_content` when present
    #[serde(default)]
    pub structured: Option<StructuredContent>,
}

impl EncodeRequest {
    pub fn new(raw_content: impl Into<String>, category: Category) -> Self {
        Self {
            raw_content: raw_content.into(),
            category,
            symbol_size: None,
            error_correction: None,
            border_modules: None,
            foreground_color: Rgb::BLACK,
            background_color: Rgb::WHITE,
            logo_ref: None,
            title: None,
            description: None,
            text_block: None,
            content_id: None,
            structured: None,
        }
    }

    /// Request for structured content; the category follows the content.
    pub fn structured(content: StructuredContent) -> Self {
        let mut request = Self::new("", content.category());
        request.structured = Some(content);
        request
    }

    pub fn symbol_size(mut self, size: u32) -> Self {
        self.symbol_size = Some(size);
        self
    }

    pub fn error_correction(mut self, level: ErrorCorrection) -> Self {
        self.error_correction = Some(level);
        self
    }

    pub fn border(mut self, modules: u32) -> Self {
        self.border_modules = Some(modules);
        self
    }

    pub fn colors(mut self, foreground: Rgb, background: Rgb) -> Self {
        self.foreground_color = foreground;
        self.background_color = background;
        self
    }

    pub fn logo(mut self, logo: LogoRef) -> Self {
        self.logo_ref = Some(logo);
        self
    }

    pub fn text_block(mut self, block: TextBlock) -> Self {
        self.text_block = Some(block.body);
        self.title = block.title;
        self.description = block.description;
        self
    }

    pub fn content_id(mut self, id: impl Into<String>) -> Self {
        self.content_id = Some(id.into());
        self
    }

    /// Assign a fresh random content id.
    pub fn with_new_content_id(self) -> Self {
        self.content_id(Uuid::new_v4().to_string())
    }
}

/// What was embedded, and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub payload_used: String,
    pub category: Category,
    pub symbol_size: u32,
    pub error_correction: ErrorCorrection,
    pub border_modules: u32,
    /// Modules per side chosen by the symbol encoder
    pub modules: usize,
    pub version: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
}

/// Outcome of one encode call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeResult {
    pub success: bool,
    /// `data:image/png;base64,...`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl EncodeResult {
    pub fn failure(error: &QuickQrError) -> Self {
        Self {
            success: false,
            encoded_data: None,
            metadata: None,
            error_message: Some(error.to_string()),
        }
    }
}

/// Request-to-image pipeline with its collaborators.
pub struct Generator<E = QrcodeEncoder, L = NoLogo> {
    config: Config,
    composer: Composer<E, L>,
    cards: TextRenderer,
}

impl Generator {
    pub fn new(config: Config) -> Self {
        let cards = TextRenderer::new(config.card.clone());
        Self {
            config,
            composer: Composer::new(),
            cards,
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<E: SymbolEncoder, L: LogoOverlay> Generator<E, L> {
    /// Swap the composer (symbol encoder and logo overlay).
    pub fn with_composer<E2: SymbolEncoder, L2: LogoOverlay>(
        self,
        composer: Composer<E2, L2>,
    ) -> Generator<E2, L2> {
        Generator {
            config: self.config,
            composer,
            cards: self.cards,
        }
    }

    pub fn with_text_renderer(mut self, cards: TextRenderer) -> Self {
        self.cards = cards;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The exact string that will be embedded for `request`.
    pub fn payload(&self, request: &EncodeRequest) -> String {
        if let Some(structured) = &request.structured {
            return structured.to_payload();
        }
        match (&request.category, &request.content_id) {
            (Category::Content, Some(id)) => content::content_link(&self.config.view_base_url, id),
            (category, _) => content::encode(&request.raw_content, category),
        }
    }

    fn resolve_style(&self, request: &EncodeRequest) -> Result<(Style, ErrorCorrection), QuickQrError> {
        let scale = request.symbol_size.unwrap_or(self.config.default_size);
        if !SIZE_RANGE.contains(&scale) {
            return Err(QuickQrError::InvalidRequest(format!(
                "symbol size must be in 1..=40, got {}",
                scale
            )));
        }
        let border = request.border_modules.unwrap_or(self.config.default_border);
        if !BORDER_RANGE.contains(&border) {
            return Err(QuickQrError::InvalidRequest(format!(
                "border must be in 0..=10, got {}",
                border
            )));
        }
        let level = request
            .error_correction
            .unwrap_or(self.config.default_error_correction);
        let style = Style {
            scale,
            border,
            foreground: request.foreground_color,
            background: request.background_color,
        };
        Ok((style, level))
    }

    /// Build the image, propagating errors.
    pub fn try_encode(&self, request: &EncodeRequest) -> Result<(ComposedImage, Metadata), QuickQrError> {
        let links_content =
            request.category == Category::Content && request.content_id.is_some();
        let has_content = request.structured.is_some()
            || links_content
            || !request.raw_content.trim().is_empty();
        if !has_content {
            return Err(QuickQrError::InvalidRequest("content cannot be empty".to_string()));
        }

        let (style, level) = self.resolve_style(request)?;
        let payload = self.payload(request);
        let mut image = self
            .composer
            .compose(&payload, level, &style, request.logo_ref.as_ref())?;

        if let Some(body) = &request.text_block {
            let block = TextBlock {
                body: body.clone(),
                title: request.title.clone(),
                description: request.description.clone(),
            };
            let card_style = CardStyle {
                font_size: self.cards.config().font_size,
                font_color: style.foreground,
                background: style.background,
            };
            let card = self.cards.render(&block, &card_style)?;
            image = image.with_header(&card, style.background);
        }

        let metadata = Metadata {
            payload_used: payload,
            category: request.category.clone(),
            symbol_size: style.scale,
            error_correction: level,
            border_modules: style.border,
            modules: image.modules(),
            version: image.version(),
            content_id: request.content_id.clone(),
        };
        Ok((image, metadata))
    }

    /// Encode one request. Never panics on bad input; failures are reported
    /// in the result.
    pub fn encode(&self, request: &EncodeRequest) -> EncodeResult {
        let outcome = self
            .try_encode(request)
            .and_then(|(image, metadata)| Ok((image.to_data_url()?, metadata)));

        match outcome {
            Ok((data_url, metadata)) => {
                info!(
                    category = %metadata.category,
                    payload_len = metadata.payload_used.len(),
                    modules = metadata.modules,
                    level = %metadata.error_correction,
                    "symbol encoded"
                );
                EncodeResult {
                    success: true,
                    encoded_data: Some(data_url),
                    metadata: Some(metadata),
                    error_message: None,
                }
            }
            Err(e) => {
                warn!(category = %request.category, error = %e, "encode failed");
                EncodeResult::failure(&e)
            }
        }
    }

    /// Encode many requests in parallel. Results keep the input order.
    pub fn encode_batch(&self, requests: &[EncodeRequest]) -> Vec<EncodeResult> {
        requests.par_iter().map(|r| self.encode(r)).collect()
    }

    /// Encode a JSON array of requests. Items are parsed one by one, so a
    /// malformed item becomes a failure result in its own slot; only a
    /// document that is not a JSON array is an error.
    pub fn encode_batch_json(&self, json: &str) -> Result<Vec<EncodeResult>, QuickQrError> {
        let items: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let mut requests = Vec::with_capacity(items.len());
        let mut slots: Vec<Option<EncodeResult>> = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<EncodeRequest>(item) {
                Ok(request) => {
                    requests.push(request);
                    slots.push(None);
                }
                Err(e) => {
                    warn!(error = %e, "batch item rejected");
                    slots.push(Some(EncodeResult::failure(&e.into())));
                }
            }
        }

        let mut encoded = self.encode_batch(&requests).into_iter();
        Ok(slots
            .into_iter()
            .filter_map(|slot| slot.or_else(|| encoded.next()))
            .collect())
    }
}

/// Encode with the default configuration and collaborators.
pub fn encode(request: &EncodeRequest) -> EncodeResult {
    Generator::default().encode(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::FontChain;
    use crate::content::WifiCredentials;
    use crate::compose::png;
    use pretty_assertions::assert_eq;

    fn generator() -> Generator {
        Generator::default()
            .with_text_renderer(TextRenderer::default().with_fonts(FontChain::builtin_only()))
    }

    #[test]
    fn test_success_shape() {
        let result = generator().encode(&EncodeRequest::new("example.com", Category::Url));
        assert!(result.success);
        assert!(result.error_message.is_none());
        let data = result.encoded_data.unwrap();
        assert!(data.starts_with("data:image/png;base64,"));

        let metadata = result.metadata.unwrap();
        assert_eq!(metadata.payload_used, "https://example.com");
        assert_eq!(metadata.category, Category::Url);
        assert_eq!(metadata.symbol_size, 10);
        assert_eq!(metadata.error_correction, ErrorCorrection::M);
        assert_eq!(metadata.border_modules, 4);
    }

    #[test]
    fn test_image_size_matches_metadata() {
        let request = EncodeRequest::new("hello", Category::Text).symbol_size(3).border(2);
        let result = generator().encode(&request);
        let metadata = result.metadata.unwrap();
        let bytes = png::from_data_url(&result.encoded_data.unwrap()).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        let side = (metadata.modules as u32 + 4) * 3;
        assert_eq!((img.width(), img.height()), (side, side));
    }

    #[test]
    fn test_capacity_failure_is_reported() {
        let request = EncodeRequest::new("x".repeat(4000), Category::Text)
            .symbol_size(1)
            .error_correction(ErrorCorrection::L);
        let result = generator().encode(&request);
        assert!(!result.success);
        assert!(result.encoded_data.is_none());
        assert!(!result.error_message.unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range_fields() {
        let g = generator();
        for request in [
            EncodeRequest::new("a", Category::Text).symbol_size(0),
            EncodeRequest::new("a", Category::Text).symbol_size(41),
            EncodeRequest::new("a", Category::Text).border(11),
            EncodeRequest::new("   ", Category::Text),
        ] {
            let result = g.encode(&request);
            assert!(!result.success, "{:?}", request);
            assert!(result.error_message.unwrap().starts_with("Invalid request"));
        }
    }

    #[test]
    fn test_config_defaults_apply() {
        let config = Config {
            default_size: 2,
            default_border: 0,
            default_error_correction: ErrorCorrection::H,
            ..Config::default()
        };
        let metadata = Generator::new(config)
            .encode(&EncodeRequest::new("abc", Category::Text))
            .metadata
            .unwrap();
        assert_eq!(metadata.symbol_size, 2);
        assert_eq!(metadata.border_modules, 0);
        assert_eq!(metadata.error_correction, ErrorCorrection::H);
    }

    #[test]
    fn test_content_link_payload() {
        let g = generator();
        let request = EncodeRequest::new("ignored", Category::Content).content_id("abc-123");
        assert_eq!(
            g.payload(&request),
            "https://quickqr-frontend.onrender.com/view/abc-123"
        );
        let request = EncodeRequest::new("no id yet", Category::Content);
        assert_eq!(g.payload(&request), "no id yet");

        let fresh = EncodeRequest::new("x", Category::Content).with_new_content_id();
        assert_eq!(fresh.content_id.as_ref().map(|id| id.len()), Some(36));
    }

    #[test]
    fn test_structured_takes_precedence() {
        let request =
            EncodeRequest::structured(StructuredContent::Wifi(WifiCredentials::new("Home", "pw")));
        assert_eq!(request.category, Category::Wifi);
        let result = generator().encode(&request);
        assert!(result.success);
        assert_eq!(result.metadata.unwrap().payload_used, "WIFI:T:WPA;S:Home;P:pw;;");
    }

    #[test]
    fn test_text_block_is_stacked_above() {
        let g = generator();
        let plain = g
            .try_encode(&EncodeRequest::new("card", Category::Text))
            .unwrap()
            .0;
        let request = EncodeRequest::new("card", Category::Text)
            .text_block(TextBlock::new("Scan me").title("Menu"));
        let (with_card, _) = g.try_encode(&request).unwrap();
        // One wrapped line: 30 + 2 * 40
        assert_eq!(with_card.height(), plain.height() + 110);
        assert_eq!(with_card.width(), 800.max(plain.width()));
    }

    #[test]
    fn test_json_request_with_short_field_names() {
        let json = r##"{
            "content": "555-1234:Hello",
            "qr_type": "sms",
            "size": 5,
            "error_correction": "Q",
            "border": 2,
            "foreground_color": "#112233",
            "background_color": "#FFFFFF",
            "logo_url": "https://example.com/logo.png"
        }"##;
        let request: EncodeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.foreground_color, Rgb([0x11, 0x22, 0x33]));
        let result = generator().encode(&request);
        assert!(result.success);
        let metadata = result.metadata.unwrap();
        assert_eq!(metadata.payload_used, "sms:555-1234:Hello");
        assert_eq!(metadata.error_correction, ErrorCorrection::Q);
    }

    #[test]
    fn test_unsupported_color_in_json() {
        let json = r#"{"content": "x", "qr_type": "text", "foreground_color": "mauve-ish"}"#;
        let err = serde_json::from_str::<EncodeRequest>(json).unwrap_err();
        assert!(err.to_string().contains("unsupported color value"));
    }

    #[test]
    fn test_result_json_omits_empty_fields() {
        let failure = EncodeResult::failure(&QuickQrError::Encoding("too long".to_string()));
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error_message": "Encoding error: too long"})
        );
    }

    #[test]
    fn test_blank_content_with_stray_content_id() {
        let g = generator();
        for category in [Category::Url, Category::Sms, Category::Text] {
            let request = EncodeRequest::new("   ", category).content_id("abc");
            let err = g.try_encode(&request).unwrap_err();
            assert!(matches!(err, QuickQrError::InvalidRequest(_)), "{}", err);
            assert!(!g.encode(&request).success);
        }

        // The id alone is enough for hosted content
        let request = EncodeRequest::new("", Category::Content).content_id("abc");
        assert!(g.encode(&request).success);
    }

    #[test]
    fn test_batch_json_isolates_bad_items() {
        let json = r##"[
            {"content": "a.com", "qr_type": "url"},
            {"content": "x", "qr_type": "text", "size": "big"},
            {"content": "x", "qr_type": "text", "foreground_color": "mauve-ish"},
            {"content": "555", "qr_type": "phone"}
        ]"##;
        let results = generator().encode_batch_json(json).unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(
            results[0].metadata.as_ref().unwrap().payload_used,
            "https://a.com"
        );
        assert!(!results[1].success);
        assert!(results[2].error_message.as_ref().unwrap().contains("unsupported color value"));
        assert_eq!(results[3].metadata.as_ref().unwrap().payload_used, "tel:555");

        assert!(generator().encode_batch_json(r#"{"content": "x"}"#).is_err());
    }

    #[test]
    fn test_batch_keeps_order() {
        let requests = vec![
            EncodeRequest::new("a.com", Category::Url),
            EncodeRequest::new("x".repeat(4000), Category::Text),
            EncodeRequest::new("555", Category::Phone),
        ];
        let results = generator().encode_batch(&requests);
        assert_eq!(results.len(), 3);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert_eq!(results[2].metadata.as_ref().unwrap().payload_used, "tel:555");
    }
}
