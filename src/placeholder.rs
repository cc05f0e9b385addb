//! # Placeholder Substitution
//!
//! Generated markup refers to images through four literal tokens. This module
//! swaps each token for the matching image source.
//!
//! - A token whose image is absent stays in the text verbatim.
//! - Replacement is a single left-to-right pass, so a substituted value is
//!   never scanned again even if it happens to contain token text.
//! - Quotes and brackets in values are percent-encoded; a value cannot close
//!   the attribute or `url('...')` it lands in, nor spell out a token.

use serde::Serialize;

/// The image slots the generator may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Placeholder {
    Logo,
    Speaker,
    Background,
    Qr,
}

impl Placeholder {
    pub const ALL: [Placeholder; 4] = [
        Placeholder::Logo,
        Placeholder::Speaker,
        Placeholder::Background,
        Placeholder::Qr,
    ];

    /// Literal token text as emitted by the generator.
    pub const fn token(&self) -> &'static str {
        match self {
            Placeholder::Logo => "[LOGO_IMAGE_URL]",
            Placeholder::Speaker => "[SPEAKER_IMAGE_URL]",
            Placeholder::Background => "[BACKGROUND_IMAGE_URL]",
            Placeholder::Qr => "[QR_CODE_IMAGE_URL]",
        }
    }
}

/// Image sources available for substitution. `None` leaves the token in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderAssets {
    pub logo: Option<String>,
    pub speaker: Option<String>,
    pub background: Option<String>,
    pub qr: Option<String>,
}

impl PlaceholderAssets {
    pub fn get(&self, placeholder: Placeholder) -> Option<&str> {
        let value = match placeholder {
            Placeholder::Logo => &self.logo,
            Placeholder::Speaker => &self.speaker,
            Placeholder::Background => &self.background,
            Placeholder::Qr => &self.qr,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

/// Replace every token that has a value; leave the rest untouched.
pub fn substitute(markup: &str, assets: &PlaceholderAssets) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open..];

        let matched = Placeholder::ALL
            .iter()
            .find(|p| candidate.starts_with(p.token()));

        match matched {
            Some(p) => {
                match assets.get(*p) {
                    Some(value) => push_escaped(&mut out, value),
                    None => out.push_str(p.token()),
                }
                rest = &candidate[p.token().len()..];
            }
            None => {
                out.push('[');
                rest = &candidate[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Tokens still present in the markup.
pub fn unresolved(markup: &str) -> Vec<Placeholder> {
    Placeholder::ALL
        .into_iter()
        .filter(|p| markup.contains(p.token()))
        .collect()
}

fn push_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '"' => out.push_str("%22"),
            '\'' => out.push_str("%27"),
            '[' => out.push_str("%5B"),
            ']' => out.push_str("%5D"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assets() -> PlaceholderAssets {
        PlaceholderAssets {
            logo: Some("data:image/png;base64,AAA".into()),
            speaker: None,
            background: Some("https://img.example/bg.jpg".into()),
            qr: None,
        }
    }

    #[test]
    fn test_replaces_all_occurrences() {
        let markup = r#"<img src="[LOGO_IMAGE_URL]"><img src="[LOGO_IMAGE_URL]">"#;
        assert_eq!(
            substitute(markup, &assets()),
            r#"<img src="data:image/png;base64,AAA"><img src="data:image/png;base64,AAA">"#
        );
    }

    #[test]
    fn test_missing_asset_leaves_token() {
        let markup = r#"<img src="[QR_CODE_IMAGE_URL]"><img src="[SPEAKER_IMAGE_URL]">"#;
        assert_eq!(substitute(markup, &assets()), markup);
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let a = PlaceholderAssets {
            qr: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(substitute("[QR_CODE_IMAGE_URL]", &a), "[QR_CODE_IMAGE_URL]");
    }

    #[test]
    fn test_idempotent() {
        let markup = r#"<div style="background-image: url('[BACKGROUND_IMAGE_URL]')">[x] [QR_CODE_IMAGE_URL]</div>"#;
        let once = substitute(markup, &assets());
        let twice = substitute(&once, &assets());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unrelated_text_untouched() {
        let markup = "Price [USD] 10 [LOGO] [";
        assert_eq!(substitute(markup, &assets()), markup);
    }

    #[test]
    fn test_value_is_not_rescanned() {
        let a = PlaceholderAssets {
            logo: Some("x[QR_CODE_IMAGE_URL]".into()),
            qr: Some("qr".into()),
            ..Default::default()
        };
        let once = substitute("[LOGO_IMAGE_URL]", &a);
        assert_eq!(once, "x%5BQR_CODE_IMAGE_URL%5D");
        // the value can never turn into a token on a later pass
        assert_eq!(substitute(&once, &a), once);
        assert!(unresolved(&once).is_empty());
    }

    #[test]
    fn test_quotes_are_escaped() {
        let a = PlaceholderAssets {
            background: Some("https://x/it's\"here".into()),
            ..Default::default()
        };
        assert_eq!(
            substitute("url('[BACKGROUND_IMAGE_URL]')", &a),
            "url('https://x/it%27s%22here')"
        );
    }

    #[test]
    fn test_unresolved_lists_remaining_tokens() {
        let out = substitute("[LOGO_IMAGE_URL] [QR_CODE_IMAGE_URL]", &assets());
        assert_eq!(unresolved(&out), vec![Placeholder::Qr]);
    }
}
