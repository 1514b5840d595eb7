//! # QuickQR - Typed Content to QR Symbols
//!
//! QuickQR turns typed content (a URL, a phone number, WiFi credentials, a
//! contact card...) into the exact payload string a scanner expects, encodes
//! it as a QR symbol, and returns a styled PNG as a `data:` URL. It provides:
//!
//! - **Content formatting**: per-category payload rules and structured builders
//! - **Composition**: module scale, quiet zone, palette and a logo extension point
//! - **Content cards**: wrapped, centered text blocks rendered to PNG
//! - **Advice**: optional content suggestions with a rule-based fallback
//!
//! ## Quick Start
//!
//! ```
//! use quickqr::{encode, Category, EncodeRequest, ErrorCorrection};
//!
//! let request = EncodeRequest::new("example.com", Category::Url)
//!     .symbol_size(8)
//!     .error_correction(ErrorCorrection::Q);
//!
//! let result = encode(&request);
//! assert!(result.success);
//! assert!(result.encoded_data.unwrap().starts_with("data:image/png;base64,"));
//! assert_eq!(result.metadata.unwrap().payload_used, "https://example.com");
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`content`] | Categories and payload formatting |
//! | [`symbol`] | Error-correction levels and the symbol encoder seam |
//! | [`compose`] | Rasterization, colors, logos and PNG output |
//! | [`card`] | Text-block ("content card") rendering |
//! | [`request`] | The request/result pipeline |
//! | [`advice`] | Content suggestions and URL validation |
//! | [`catalog`] | Listings of categories and levels |
//! | [`config`] | Defaults and card geometry |
//! | [`error`] | Error types |

pub mod advice;
pub mod card;
pub mod catalog;
pub mod compose;
pub mod config;
pub mod content;
pub mod error;
pub mod request;
pub mod symbol;

// Re-exports for convenience
pub use config::Config;
pub use content::Category;
pub use error::QuickQrError;
pub use request::{EncodeRequest, EncodeResult, Generator, Metadata, encode};
pub use symbol::ErrorCorrection;
