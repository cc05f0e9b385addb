//! Flyer configuration fields and the canvas format table.

use serde::{Deserialize, Serialize};

/// Kind of flyer being designed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlyerType {
    #[serde(rename = "Event Announcement")]
    EventAnnouncement,
    #[serde(rename = "Product Promotion")]
    ProductPromotion,
    #[serde(rename = "Grand Opening")]
    GrandOpening,
    #[serde(rename = "Workshop or Seminar")]
    WorkshopOrSeminar,
    #[serde(rename = "Hiring Ad")]
    HiringAd,
}

impl FlyerType {
    pub fn all() -> &'static [FlyerType] {
        &[
            FlyerType::EventAnnouncement,
            FlyerType::ProductPromotion,
            FlyerType::GrandOpening,
            FlyerType::WorkshopOrSeminar,
            FlyerType::HiringAd,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FlyerType::EventAnnouncement => "Event Announcement",
            FlyerType::ProductPromotion => "Product Promotion",
            FlyerType::GrandOpening => "Grand Opening",
            FlyerType::WorkshopOrSeminar => "Workshop or Seminar",
            FlyerType::HiringAd => "Hiring Ad",
        }
    }
}

/// Pixel dimensions of a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CanvasDimensions {
    pub width: u32,
    pub height: u32,
}

impl CanvasDimensions {
    /// Preview container padding that preserves the aspect ratio (percent of width).
    pub fn aspect_padding_percent(&self) -> f64 {
        self.height as f64 / self.width as f64 * 100.0
    }
}

/// Target canvas preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CanvasFormat {
    #[serde(rename = "Instagram Post (Square 1080x1080)")]
    Square,
    #[serde(rename = "Instagram Post (Portrait 1080x1350)")]
    Portrait,
    #[serde(rename = "Instagram Story (1080x1920)")]
    Story,
    #[serde(rename = "Landscape (1920x1080)")]
    Landscape,
    #[serde(rename = "A4 Document (2480x3508)")]
    A4,
}

impl CanvasFormat {
    pub fn all() -> &'static [CanvasFormat] {
        &[
            CanvasFormat::Square,
            CanvasFormat::Portrait,
            CanvasFormat::Story,
            CanvasFormat::Landscape,
            CanvasFormat::A4,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            CanvasFormat::Square => "Instagram Post (Square 1080x1080)",
            CanvasFormat::Portrait => "Instagram Post (Portrait 1080x1350)",
            CanvasFormat::Story => "Instagram Story (1080x1920)",
            CanvasFormat::Landscape => "Landscape (1920x1080)",
            CanvasFormat::A4 => "A4 Document (2480x3508)",
        }
    }

    /// Fixed pixel dimensions for this format.
    pub const fn dimensions(&self) -> CanvasDimensions {
        let (width, height) = match self {
            CanvasFormat::Square => (1080, 1080),
            CanvasFormat::Portrait => (1080, 1350),
            CanvasFormat::Story => (1080, 1920),
            CanvasFormat::Landscape => (1920, 1080),
            CanvasFormat::A4 => (2480, 3508),
        };
        CanvasDimensions { width, height }
    }
}

/// Art direction for the generated design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleTheme {
    #[serde(rename = "Minimalist & Clean")]
    Minimalist,
    #[serde(rename = "Bold & Modern")]
    Bold,
    #[serde(rename = "Elegant & Corporate")]
    Elegant,
    #[serde(rename = "Fun & Playful")]
    Playful,
    /// Let the model decide.
    #[serde(rename = "AI Choice")]
    AiChoice,
}

impl StyleTheme {
    pub fn all() -> &'static [StyleTheme] {
        &[
            StyleTheme::Minimalist,
            StyleTheme::Bold,
            StyleTheme::Elegant,
            StyleTheme::Playful,
            StyleTheme::AiChoice,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            StyleTheme::Minimalist => "Minimalist & Clean",
            StyleTheme::Bold => "Bold & Modern",
            StyleTheme::Elegant => "Elegant & Corporate",
            StyleTheme::Playful => "Fun & Playful",
            StyleTheme::AiChoice => "AI Choice",
        }
    }

    /// Design guidance handed to the model for this theme.
    pub fn description(&self) -> &'static str {
        match self {
            StyleTheme::Minimalist => {
                "Prioritize ample whitespace, a simple grid-based layout, sans-serif fonts (like Inter, Helvetica), and a limited color palette. Use thin lines and avoid heavy shadows, gradients, or complex shapes."
            }
            StyleTheme::Bold => {
                "Use strong, bold typography (heavy weights), vibrant colors from the palette, geometric shapes, and a dynamic, asymmetrical layout. High contrast is key. Feel free to use large font sizes."
            }
            StyleTheme::Elegant => {
                "Employ a sophisticated and formal design. Use classic serif or clean sans-serif fonts, a structured and balanced layout, and use the provided colors in a refined, understated way. Aim for professionalism and clarity."
            }
            StyleTheme::Playful => {
                "Create a friendly and energetic design. Use rounded fonts, playful icons or shapes, bright colors, and a more informal or organic layout. The design should feel approachable and cheerful."
            }
            StyleTheme::AiChoice => {
                "You have creative freedom to choose the most appropriate and effective design style based on the flyer's content (type, topic, text) and purpose."
            }
        }
    }
}

/// All user-editable flyer fields.
///
/// Replaced wholesale on every update; lives only as long as its session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlyerOptions {
    pub flyer_type: FlyerType,
    pub topic: String,
    /// `Title;Subtitle;Support Line 1;Support Line 2`
    pub primary_text: String,
    /// `Label: value | Label: value | ...`
    pub details_block: String,
    pub cta_text: String,
    #[serde(default)]
    pub brand_name: String,
    pub canvas_format: CanvasFormat,
    pub style_theme: StyleTheme,
    pub primary_color: String,
    pub accent_color: String,
}

impl Default for FlyerOptions {
    fn default() -> Self {
        Self {
            flyer_type: FlyerType::EventAnnouncement,
            topic: "AI & The Future of Design".to_string(),
            primary_text: "Innovate & Create;A Seminar on AI-Powered Design;Featuring John Doe, CEO of TechCorp;July 20th, 2024".to_string(),
            details_block: "Date: July 20, 2024 | Time: 10:00 AM - 4:00 PM | Location: Grand Tech Hall | RSVP: yourwebsite.com".to_string(),
            cta_text: "Register Now".to_string(),
            brand_name: String::new(),
            canvas_format: CanvasFormat::Square,
            style_theme: StyleTheme::Bold,
            primary_color: "#6366F1".to_string(),
            accent_color: "#F472B6".to_string(),
        }
    }
}

impl FlyerOptions {
    pub fn dimensions(&self) -> CanvasDimensions {
        self.canvas_format.dimensions()
    }

    /// Check the color fields look like `#rgb` or `#rrggbb`.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("primaryColor", &self.primary_color),
            ("accentColor", &self.accent_color),
        ] {
            if !is_hex_color(value) {
                return Err(format!("{} must be a hex color, got '{}'", field, value));
            }
        }
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dimensions_table() {
        let dims: Vec<(u32, u32)> = CanvasFormat::all()
            .iter()
            .map(|f| {
                let d = f.dimensions();
                (d.width, d.height)
            })
            .collect();
        assert_eq!(
            dims,
            vec![(1080, 1080), (1080, 1350), (1080, 1920), (1920, 1080), (2480, 3508)]
        );
    }

    #[test]
    fn test_dimensions_deterministic() {
        for format in CanvasFormat::all() {
            assert_eq!(format.dimensions(), format.dimensions());
        }
    }

    #[test]
    fn test_format_labels_roundtrip_serde() {
        for format in CanvasFormat::all() {
            let json = serde_json::to_string(format).unwrap();
            assert_eq!(json, format!("\"{}\"", format.label()));
        }
        let story: CanvasFormat = serde_json::from_str("\"Instagram Story (1080x1920)\"").unwrap();
        assert_eq!(story, CanvasFormat::Story);
    }

    #[test]
    fn test_aspect_padding() {
        let d = CanvasFormat::Story.dimensions();
        assert!((d.aspect_padding_percent() - 1920.0 / 1080.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_options_json_shape() {
        let json = serde_json::to_value(FlyerOptions::default()).unwrap();
        assert_eq!(json["canvasFormat"], "Instagram Post (Square 1080x1080)");
        assert_eq!(json["styleTheme"], "Bold & Modern");
        assert_eq!(json["flyerType"], "Event Announcement");
    }

    #[test]
    fn test_validate_colors() {
        assert!(FlyerOptions::default().validate().is_ok());
        let bad = FlyerOptions {
            accent_color: "pink".into(),
            ..Default::default()
        };
        assert!(bad.validate().unwrap_err().contains("accentColor"));
        assert!(is_hex_color("#abc"));
        assert!(!is_hex_color("#abcd"));
    }
}
