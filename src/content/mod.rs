//! # Content Encoding
//!
//! Maps user content plus a [`Category`] to the exact payload string that
//! gets embedded in the symbol.
//!
//! ## Wire Formats
//!
//! | Category | Payload |
//! |----------|---------|
//! | URL | `https://` prepended unless already `http://` / `https://` |
//! | CONTACT | `BEGIN:VCARD\nVERSION:3.0\nFN:<raw>\nEND:VCARD` |
//! | WIFI | `WIFI:T:WPA;S:<raw>;P:password;;` |
//! | EMAIL | `mailto:<raw>` |
//! | PHONE | `tel:<raw>` |
//! | SMS | `sms:<phone>:<message>` split on the first `:`, else `sms:<raw>` |
//! | TEXT, CONTENT, other | unchanged |
//!
//! CONTACT and WIFI keep the single-field layout of the deployed service so
//! existing symbols stay byte-identical. The structured builders in
//! [`structured`] produce complete vCards and WiFi credentials instead.
//!
//! Every function here is total: there is no error path.
//!
//! ## Example
//!
//! ```
//! use quickqr::content::{encode, Category};
//!
//! assert_eq!(encode("example.com", &Category::Url), "https://example.com");
//! assert_eq!(encode("555-1234:Hello", &Category::Sms), "sms:555-1234:Hello");
//! ```

pub mod structured;

pub use structured::{
    ContactCard, EmailMessage, SmsMessage, StructuredContent, WifiCredentials, WifiSecurity,
};

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Kind of content being encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Url,
    Text,
    Contact,
    Wifi,
    Email,
    Phone,
    Sms,
    /// Link to a hosted content card (`<base>/view/<id>`)
    Content,
    /// Any category name this encoder has no rule for
    Other(String),
}

impl Category {
    /// The categories with dedicated rules, in display order.
    pub const KNOWN: [Category; 8] = [
        Self::Url,
        Self::Text,
        Self::Contact,
        Self::Wifi,
        Self::Email,
        Self::Phone,
        Self::Sms,
        Self::Content,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Url => "url",
            Self::Text => "text",
            Self::Contact => "contact",
            Self::Wifi => "wifi",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Sms => "sms",
            Self::Content => "content",
            Self::Other(name) => name,
        }
    }
}

impl FromStr for Category {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "url" => Self::Url,
            "text" => Self::Text,
            "contact" => Self::Contact,
            "wifi" => Self::Wifi,
            "email" => Self::Email,
            "phone" => Self::Phone,
            "sms" => Self::Sms,
            "content" => Self::Content,
            _ => Self::Other(s.to_string()),
        })
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(category) => category,
            Err(never) => match never {},
        }
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the payload for `raw` under `category`.
pub fn encode(raw: &str, category: &Category) -> String {
    match category {
        Category::Url => format_url(raw),
        Category::Contact => format_contact(raw),
        Category::Wifi => format_wifi(raw),
        Category::Email => format!("mailto:{}", raw),
        Category::Phone => format!("tel:{}", raw),
        Category::Sms => format_sms(raw),
        Category::Text | Category::Content => raw.to_string(),
        Category::Other(_) => raw.to_string(),
    }
}

/// Payload for a hosted content card.
pub fn content_link(view_base_url: &str, content_id: &str) -> String {
    format!("{}/view/{}", view_base_url.trim_end_matches('/'), content_id)
}

fn format_url(raw: &str) -> String {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    }
}

fn format_contact(raw: &str) -> String {
    format!("BEGIN:VCARD\nVERSION:3.0\nFN:{}\nEND:VCARD", raw)
}

fn format_wifi(raw: &str) -> String {
    format!("WIFI:T:WPA;S:{};P:password;;", raw)
}

fn format_sms(raw: &str) -> String {
    match raw.split_once(':') {
        Some((phone, message)) => format!("sms:{}:{}", phone, message),
        None => format!("sms:{}", raw),
    }
}
