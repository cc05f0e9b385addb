//! Parsing of the delimited text fields.

use serde::Serialize;

/// The four lines encoded in the primary-text field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrimaryText {
    pub title: String,
    pub subtitle: String,
    pub support1: String,
    pub support2: String,
}

impl PrimaryText {
    /// Split `Title;Subtitle;Support 1;Support 2`. Missing trailing parts are empty.
    pub fn parse(input: &str) -> Self {
        let mut parts = input.split(';').map(|s| s.trim().to_string());
        Self {
            title: parts.next().unwrap_or_default(),
            subtitle: parts.next().unwrap_or_default(),
            support1: parts.next().unwrap_or_default(),
            support2: parts.next().unwrap_or_default(),
        }
    }
}

/// Split the `|`-delimited details block into trimmed, non-empty items.
pub fn parse_details(input: &str) -> Vec<String> {
    input
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_primary_text_full() {
        assert_eq!(
            PrimaryText::parse("A;B;C;D"),
            PrimaryText {
                title: "A".into(),
                subtitle: "B".into(),
                support1: "C".into(),
                support2: "D".into(),
            }
        );
    }

    #[test]
    fn test_primary_text_title_only() {
        assert_eq!(
            PrimaryText::parse("OnlyTitle"),
            PrimaryText {
                title: "OnlyTitle".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_primary_text_trims_segments() {
        let parsed = PrimaryText::parse(" Big Sale ; Today only ");
        assert_eq!(parsed.title, "Big Sale");
        assert_eq!(parsed.subtitle, "Today only");
        assert_eq!(parsed.support2, "");
    }

    #[test]
    fn test_details_drops_empty() {
        assert_eq!(parse_details("Date: X | Time: Y |  "), vec!["Date: X", "Time: Y"]);
        assert!(parse_details("").is_empty());
        assert!(parse_details(" | | ").is_empty());
    }
}
