//! # Catalog
//!
//! Human-readable listings of the supported categories and error-correction
//! levels, for pickers and `--help`-style output.

use serde::Serialize;

use crate::content::Category;
use crate::symbol::ErrorCorrection;

/// One selectable option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub value: String,
    pub label: &'static str,
    pub description: &'static str,
}

pub fn categories() -> Vec<Entry> {
    Category::KNOWN
        .iter()
        .map(|category| {
            let (label, description) = match category {
                Category::Url => ("URL", "Website links"),
                Category::Text => ("Text", "Plain text content"),
                Category::Contact => ("Contact", "Contact information (vCard)"),
                Category::Wifi => ("WiFi", "WiFi network credentials"),
                Category::Email => ("Email", "Email address"),
                Category::Phone => ("Phone", "Phone number"),
                Category::Sms => ("SMS", "Text message"),
                Category::Content => ("Content", "Link to a hosted content card"),
                Category::Other(_) => ("Other", "Passed through unchanged"),
            };
            Entry {
                value: category.as_str().to_string(),
                label,
                description,
            }
        })
        .collect()
}

pub fn error_correction_levels() -> Vec<Entry> {
    ErrorCorrection::ALL
        .iter()
        .map(|level| {
            let (label, description) = match level {
                ErrorCorrection::L => ("Low (7%)", "Lowest error correction"),
                ErrorCorrection::M => ("Medium (15%)", "Default level"),
                ErrorCorrection::Q => ("Quartile (25%)", "Higher error correction"),
                ErrorCorrection::H => ("High (30%)", "Highest error correction"),
            };
            Entry {
                value: level.as_str().to_string(),
                label,
                description,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_values_parse_back() {
        let entries = categories();
        assert_eq!(entries.len(), 8);
        for entry in entries {
            let parsed: Category = entry.value.parse().unwrap();
            assert!(!matches!(parsed, Category::Other(_)), "{}", entry.value);
        }
    }

    #[test]
    fn test_levels() {
        let levels = error_correction_levels();
        let values: Vec<&str> = levels.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, ["L", "M", "Q", "H"]);
        assert_eq!(levels[1].label, "Medium (15%)");
    }
}
