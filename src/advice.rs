//! # Content Advice
//!
//! Optional suggestions for improving content before it is encoded.
//! Advice is advisory only: nothing here gates symbol generation, and
//! [`advise`] always produces an answer even when the configured advisor
//! fails.
//!
//! ## Advisors
//!
//! | Advisor | Availability | Confidence |
//! |---------|--------------|------------|
//! | [`RuleAdvisor`] | always | 0.6 |
//! | any [`Advisor`] impl (e.g. a hosted model) | may fail | implementation-defined |

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::warn;

use crate::content::Category;

/// Most suggestions kept from any advisor.
pub const MAX_SUGGESTIONS: usize = 5;

/// Advisor output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice {
    pub suggestions: Vec<String>,
    pub optimized_content: Option<String>,
    /// 0.0..=1.0
    pub confidence: f32,
}

/// Why an advisor could not answer.
#[derive(Debug, Error)]
pub enum AdviceError {
    #[error("advisor unavailable: {0}")]
    Unavailable(String),

    #[error("advisor failed: {0}")]
    Failed(String),
}

/// A source of content suggestions.
pub trait Advisor: Send + Sync {
    fn suggest(
        &self,
        content: &str,
        category: &Category,
        context: Option<&str>,
    ) -> Result<Advice, AdviceError>;
}

/// Fixed, category-specific suggestions. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleAdvisor;

impl Advisor for RuleAdvisor {
    fn suggest(
        &self,
        content: &str,
        category: &Category,
        _context: Option<&str>,
    ) -> Result<Advice, AdviceError> {
        Ok(rule_advice(content, category))
    }
}

fn rule_advice(content: &str, category: &Category) -> Advice {
    let suggestions: &[&str] = match category {
        Category::Url => &[
            "Ensure the URL includes https:// protocol",
            "Keep the URL short and memorable",
            "Test the URL to ensure it works correctly",
            "Consider using a URL shortener for long links",
        ],
        Category::Text => &[
            "Keep the text concise and clear",
            "Use proper formatting and spacing",
            "Include essential information only",
            "Consider the character limit for readability",
        ],
        Category::Contact => &[
            "Include full name and contact details",
            "Add company information if relevant",
            "Ensure phone numbers are properly formatted",
            "Include email address for easy contact",
        ],
        Category::Wifi => &[
            "Double-check the WiFi password",
            "Ensure the network name (SSID) is correct",
            "Select the appropriate encryption type",
            "Test the QR code with your device",
        ],
        _ => &[
            "Verify the content is accurate",
            "Test the QR code before sharing",
            "Keep the content concise",
            "Ensure proper formatting",
        ],
    };
    Advice {
        suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        optimized_content: Some(optimize_content(content, category)),
        confidence: 0.6,
    }
}

/// Ask `primary` for advice, falling back to [`RuleAdvisor`] when there is
/// no primary advisor or it fails.
pub fn advise(
    primary: Option<&dyn Advisor>,
    content: &str,
    category: &Category,
    context: Option<&str>,
) -> Advice {
    if let Some(advisor) = primary {
        match advisor.suggest(content, category, context) {
            Ok(mut advice) => {
                advice.suggestions.truncate(MAX_SUGGESTIONS);
                advice.confidence = advice.confidence.clamp(0.0, 1.0);
                if advice.optimized_content.is_none() {
                    advice.optimized_content = Some(optimize_content(content, category));
                }
                return advice;
            }
            Err(e) => warn!(error = %e, "advisor failed, using rule-based suggestions"),
        }
    }
    rule_advice(content, category)
}

/// Light normalization: URLs get trimmed, lose one trailing `/` and gain a
/// scheme; text has its whitespace collapsed. Other categories are
/// returned unchanged.
pub fn optimize_content(content: &str, category: &Category) -> String {
    match category {
        Category::Url => {
            let url = content.trim();
            let url = url.strip_suffix('/').unwrap_or(url);
            if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else {
                format!("https://{}", url)
            }
        }
        Category::Text => content.split_whitespace().collect::<Vec<_>>().join(" "),
        _ => content.to_string(),
    }
}

/// Quick checks on content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentAnalysis {
    /// Length in characters
    pub length: usize,
    pub has_special_chars: bool,
    pub is_url: bool,
    pub suggestions: Vec<String>,
}

pub fn analyze(content: &str, category: &Category) -> ContentAnalysis {
    let length = content.chars().count();
    let has_special_chars = content
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '_' | '.')));
    let is_url = content.starts_with("http://") || content.starts_with("https://");

    let mut suggestions = Vec::new();
    match category {
        Category::Url => {
            if !is_url {
                suggestions.push("Consider adding https:// protocol".to_string());
            }
            if length > 100 {
                suggestions.push("URL is quite long, consider shortening".to_string());
            }
        }
        Category::Text => {
            if length > 200 {
                suggestions.push("Text is quite long, consider shortening".to_string());
            }
            if content.trim().is_empty() {
                suggestions.push("Content appears to be empty".to_string());
            }
        }
        _ => {}
    }

    ContentAnalysis {
        length,
        has_special_chars,
        is_url,
        suggestions,
    }
}

fn url_pattern() -> &'static Regex {
    static URL_PATTERN: OnceLock<Regex> = OnceLock::new();
    URL_PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)^https?://",
            r"(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,6}\.?|",
            r"localhost|",
            r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})",
            r"(?::\d+)?",
            r"(?:/?|[/?]\S+)$",
        ))
        .expect("URL pattern is valid")
    })
}

/// Whether `url` looks like an absolute http(s) URL with a domain,
/// `localhost` or IPv4 host.
pub fn validate_url(url: &str) -> bool {
    url_pattern().is_match(url)
}

/// Pull suggestions out of a free-form numbered or bulleted reply.
pub fn parse_suggestions(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(|c: char| c.is_ascii_digit()) || line.starts_with('-'))
        .map(|line| {
            let after_digits = line.trim_start_matches(|c: char| c.is_ascii_digit());
            let rest = if after_digits.len() < line.len() {
                after_digits.strip_prefix('.').map(str::trim_start).unwrap_or(line)
            } else {
                line
            };
            let rest = rest.strip_prefix('-').map(str::trim_start).unwrap_or(rest);
            rest.to_string()
        })
        .filter(|s| !s.is_empty())
        .take(MAX_SUGGESTIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Broken;

    impl Advisor for Broken {
        fn suggest(&self, _: &str, _: &Category, _: Option<&str>) -> Result<Advice, AdviceError> {
            Err(AdviceError::Unavailable("no API key".to_string()))
        }
    }

    struct Chatty;

    impl Advisor for Chatty {
        fn suggest(&self, _: &str, _: &Category, _: Option<&str>) -> Result<Advice, AdviceError> {
            Ok(Advice {
                suggestions: (1..=9).map(|i| format!("tip {}", i)).collect(),
                optimized_content: None,
                confidence: 1.7,
            })
        }
    }

    #[test]
    fn test_rule_advice_by_category() {
        let advice = advise(None, "example.com/", &Category::Url, None);
        assert_eq!(advice.suggestions.len(), 4);
        assert_eq!(advice.suggestions[0], "Ensure the URL includes https:// protocol");
        assert_eq!(advice.optimized_content.as_deref(), Some("https://example.com"));
        assert_eq!(advice.confidence, 0.6);

        let advice = advise(None, "555", &Category::Phone, None);
        assert_eq!(advice.suggestions[0], "Verify the content is accurate");
    }

    #[test]
    fn test_failing_advisor_falls_back() {
        let advice = advise(Some(&Broken), "hello", &Category::Text, None);
        assert_eq!(advice, rule_advice("hello", &Category::Text));
    }

    #[test]
    fn test_advisor_output_is_bounded() {
        let advice = advise(Some(&Chatty), "  a   b ", &Category::Text, None);
        assert_eq!(advice.suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(advice.confidence, 1.0);
        assert_eq!(advice.optimized_content.as_deref(), Some("a b"));
    }

    #[test]
    fn test_optimize() {
        assert_eq!(optimize_content(" http://x.com/ ", &Category::Url), "http://x.com");
        assert_eq!(optimize_content("x.com//", &Category::Url), "https://x.com/");
        assert_eq!(optimize_content("a\n\n b", &Category::Text), "a b");
        assert_eq!(optimize_content(" keep ", &Category::Email), " keep ");
    }

    #[test]
    fn test_analyze() {
        let long = format!("example.com/{}", "a".repeat(100));
        let analysis = analyze(&long, &Category::Url);
        assert!(!analysis.is_url);
        assert!(analysis.has_special_chars);
        assert_eq!(
            analysis.suggestions,
            vec![
                "Consider adding https:// protocol",
                "URL is quite long, consider shortening"
            ]
        );

        let analysis = analyze("plain text", &Category::Text);
        assert!(!analysis.has_special_chars);
        assert!(analysis.suggestions.is_empty());
        assert_eq!(analysis.length, 10);

        let analysis = analyze("   ", &Category::Text);
        assert_eq!(analysis.suggestions, vec!["Content appears to be empty"]);
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com"));
        assert!(validate_url("http://sub.example.co.uk/path?q=1"));
        assert!(validate_url("http://localhost:8000/"));
        assert!(validate_url("https://127.0.0.1"));
        assert!(!validate_url("example.com"));
        assert!(!validate_url("ftp://example.com"));
        assert!(!validate_url("https://nodot"));
    }

    #[test]
    fn test_parse_suggestions() {
        let reply = "Here are some ideas:\n1. Shorten the URL\n2.Use HTTPS\n- Add a call to action\n\nThanks!";
        assert_eq!(
            parse_suggestions(reply),
            vec!["Shorten the URL", "Use HTTPS", "Add a call to action"]
        );
        let many = (1..=8).map(|i| format!("{}. tip", i)).collect::<Vec<_>>().join("\n");
        assert_eq!(parse_suggestions(&many).len(), MAX_SUGGESTIONS);
    }
}
