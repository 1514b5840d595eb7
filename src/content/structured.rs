//! Structured payload builders.
//!
//! Multi-field alternatives to the single-string CONTACT / WIFI / EMAIL /
//! SMS rules, with the escaping each format requires.

use serde::{Deserialize, Serialize};

/// Contact details rendered as a vCard 3.0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactCard {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl ContactCard {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn to_payload(&self) -> String {
        let mut lines = vec![
            "BEGIN:VCARD".to_string(),
            "VERSION:3.0".to_string(),
            format!("FN:{}", escape_vcard(&self.name)),
        ];
        let fields = [
            ("ORG", &self.company),
            ("TITLE", &self.title),
            ("TEL", &self.phone),
            ("EMAIL", &self.email),
        ];
        for (key, value) in fields {
            if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                lines.push(format!("{}:{}", key, escape_vcard(v)));
            }
        }
        lines.push("END:VCARD".to_string());
        lines.join("\n")
    }
}

/// WiFi authentication type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WifiSecurity {
    #[default]
    #[serde(rename = "WPA", alias = "wpa", alias = "WPA2", alias = "wpa2")]
    Wpa,
    #[serde(rename = "WEP", alias = "wep")]
    Wep,
    /// Open network
    #[serde(rename = "nopass", alias = "none", alias = "open")]
    NoPass,
}

impl WifiSecurity {
    fn token(&self) -> &'static str {
        match self {
            Self::Wpa => "WPA",
            Self::Wep => "WEP",
            Self::NoPass => "nopass",
        }
    }
}

/// WiFi network credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub ssid: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub security: WifiSecurity,
    #[serde(default)]
    pub hidden: bool,
}

impl WifiCredentials {
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    pub fn security(mut self, security: WifiSecurity) -> Self {
        self.security = security;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn to_payload(&self) -> String {
        let mut out = format!(
            "WIFI:T:{};S:{};",
            self.security.token(),
            escape_wifi(&self.ssid)
        );
        if self.security != WifiSecurity::NoPass {
            out.push_str(&format!("P:{};", escape_wifi(&self.password)));
        }
        if self.hidden {
            out.push_str("H:true;");
        }
        out.push(';');
        out
    }
}

/// An email address with optional prefilled subject and body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub address: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl EmailMessage {
    pub fn to_payload(&self) -> String {
        let mut params = Vec::new();
        if let Some(subject) = &self.subject {
            params.push(format!("subject={}", percent_encode(subject)));
        }
        if let Some(body) = &self.body {
            params.push(format!("body={}", percent_encode(body)));
        }
        if params.is_empty() {
            format!("mailto:{}", self.address)
        } else {
            format!("mailto:{}?{}", self.address, params.join("&"))
        }
    }
}

/// A prefilled text message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsMessage {
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

impl SmsMessage {
    pub fn to_payload(&self) -> String {
        if self.message.is_empty() {
            format!("sms:{}", self.phone)
        } else {
            format!("sms:{}:{}", self.phone, self.message)
        }
    }
}

/// Any of the structured forms, tagged by `type` in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructuredContent {
    Contact(ContactCard),
    Wifi(WifiCredentials),
    Email(EmailMessage),
    Sms(SmsMessage),
}

impl StructuredContent {
    pub fn to_payload(&self) -> String {
        match self {
            Self::Contact(c) => c.to_payload(),
            Self::Wifi(w) => w.to_payload(),
            Self::Email(e) => e.to_payload(),
            Self::Sms(s) => s.to_payload(),
        }
    }

    /// The plain category this structured form corresponds to.
    pub fn category(&self) -> super::Category {
        match self {
            Self::Contact(_) => super::Category::Contact,
            Self::Wifi(_) => super::Category::Wifi,
            Self::Email(_) => super::Category::Email,
            Self::Sms(_) => super::Category::Sms,
        }
    }
}

/// RFC 6350 text escaping.
fn escape_vcard(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// Escaping used by the `WIFI:` URI scheme.
fn escape_wifi(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | ';' | ',' | ':' | '"') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_vcard() {
        let card = ContactCard::new("Doe, Jane")
            .company("Acme; Inc")
            .title("CTO")
            .phone("+1 555 0100")
            .email("jane@acme.test");
        assert_eq!(
            card.to_payload(),
            "BEGIN:VCARD\nVERSION:3.0\nFN:Doe\\, Jane\nORG:Acme\\; Inc\nTITLE:CTO\nTEL:+1 555 0100\nEMAIL:jane@acme.test\nEND:VCARD"
        );
    }

    #[test]
    fn test_vcard_skips_blank_fields() {
        let card = ContactCard::new("Solo").email("  ");
        assert_eq!(card.to_payload(), "BEGIN:VCARD\nVERSION:3.0\nFN:Solo\nEND:VCARD");
    }

    #[test]
    fn test_wifi_escaping() {
        let wifi = WifiCredentials::new("Cafe;Guest", "p:a\"ss");
        assert_eq!(wifi.to_payload(), "WIFI:T:WPA;S:Cafe\\;Guest;P:p\\:a\\\"ss;;");
    }

    #[test]
    fn test_wifi_open_hidden() {
        let wifi = WifiCredentials::new("Lobby", "ignored")
            .security(WifiSecurity::NoPass)
            .hidden();
        assert_eq!(wifi.to_payload(), "WIFI:T:nopass;S:Lobby;H:true;;");
    }

    #[test]
    fn test_email_query() {
        let email = EmailMessage {
            address: "a@b.com".into(),
            subject: Some("Hi there".into()),
            body: Some("Line 1\nLine 2".into()),
        };
        assert_eq!(
            email.to_payload(),
            "mailto:a@b.com?subject=Hi%20there&body=Line%201%0ALine%202"
        );
        let bare = EmailMessage {
            address: "a@b.com".into(),
            ..Default::default()
        };
        assert_eq!(bare.to_payload(), "mailto:a@b.com");
    }

    #[test]
    fn test_sms() {
        let sms = SmsMessage {
            phone: "555".into(),
            message: "On my way".into(),
        };
        assert_eq!(sms.to_payload(), "sms:555:On my way");
    }

    #[test]
    fn test_tagged_json() {
        let json = r#"{"type": "wifi", "ssid": "Home", "password": "secret", "security": "wpa2"}"#;
        let content: StructuredContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.to_payload(), "WIFI:T:WPA;S:Home;P:secret;;");
        assert_eq!(content.category(), crate::content::Category::Wifi);
    }
}
