//! Built-in color palettes and stock backgrounds offered by the UI.

use serde::Serialize;

use super::{CanvasDimensions, CanvasFormat, FlyerOptions, FlyerType, StyleTheme};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Palette {
    pub name: &'static str,
    pub primary: &'static str,
    pub accent: &'static str,
}

pub const PALETTES: &[Palette] = &[
    Palette { name: "Indigo & Pink", primary: "#6366F1", accent: "#F472B6" },
    Palette { name: "Teal & Lime", primary: "#14B8A6", accent: "#A3E635" },
    Palette { name: "Slate & Sky", primary: "#475569", accent: "#38BDF8" },
    Palette { name: "Rose & Amber", primary: "#E11D48", accent: "#F59E0B" },
    Palette { name: "Violet & Emerald", primary: "#7C3AED", accent: "#10B981" },
    Palette { name: "Charcoal & Red", primary: "#334155", accent: "#EF4444" },
    Palette { name: "Ocean & Coral", primary: "#0891B2", accent: "#FB7185" },
    Palette { name: "Forest & Gold", primary: "#166534", accent: "#FACC15" },
];

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StockBackground {
    pub name: &'static str,
    pub url: &'static str,
}

pub const STOCK_BACKGROUNDS: &[StockBackground] = &[
    StockBackground {
        name: "Retro Tech",
        url: "https://images.unsplash.com/photo-1550745165-9bc0b252726a?q=80&w=1200",
    },
    StockBackground {
        name: "Abstract Waves",
        url: "https://images.unsplash.com/photo-1519681393784-d120267933ba?q=80&w=1200",
    },
    StockBackground {
        name: "Gradient Tech",
        url: "https://images.unsplash.com/photo-1531297484001-80022131f5a1?q=80&w=1200",
    },
    StockBackground {
        name: "Global Network",
        url: "https://images.unsplash.com/photo-1451187580459-43490279c0fa?q=80&w=1200",
    },
];

/// Find the palette matching a color pair (case-insensitive).
pub fn palette_for(primary: &str, accent: &str) -> Option<&'static Palette> {
    PALETTES.iter().find(|p| {
        p.primary.eq_ignore_ascii_case(primary) && p.accent.eq_ignore_ascii_case(accent)
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct FormatEntry {
    pub value: CanvasFormat,
    pub label: &'static str,
    pub dimensions: CanvasDimensions,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemeEntry {
    pub value: StyleTheme,
    pub label: &'static str,
    pub description: &'static str,
}

/// Everything the designer UI needs to build its pickers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub flyer_types: Vec<FlyerType>,
    pub canvas_formats: Vec<FormatEntry>,
    pub style_themes: Vec<ThemeEntry>,
    pub palettes: &'static [Palette],
    pub stock_backgrounds: &'static [StockBackground],
    pub defaults: FlyerOptions,
}

pub fn catalog() -> Catalog {
    Catalog {
        flyer_types: FlyerType::all().to_vec(),
        canvas_formats: CanvasFormat::all()
            .iter()
            .map(|&f| FormatEntry {
                value: f,
                label: f.label(),
                dimensions: f.dimensions(),
            })
            .collect(),
        style_themes: StyleTheme::all()
            .iter()
            .map(|&t| ThemeEntry {
                value: t,
                label: t.label(),
                description: t.description(),
            })
            .collect(),
        palettes: PALETTES,
        stock_backgrounds: STOCK_BACKGROUNDS,
        defaults: FlyerOptions::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_lookup_ignores_case() {
        let p = palette_for("#6366f1", "#f472b6").unwrap();
        assert_eq!(p.name, "Indigo & Pink");
        assert!(palette_for("#000000", "#ffffff").is_none());
    }

    #[test]
    fn test_catalog_json_shape() {
        let json = serde_json::to_value(catalog()).unwrap();
        assert_eq!(json["canvasFormats"].as_array().unwrap().len(), 5);
        assert_eq!(json["canvasFormats"][2]["value"], "Instagram Story (1080x1920)");
        assert_eq!(json["canvasFormats"][2]["dimensions"]["height"], 1920);
        assert_eq!(json["defaults"]["styleTheme"], "Bold & Modern");
        // the default colors are the first palette
        assert_eq!(json["palettes"][0]["primary"], json["defaults"]["primaryColor"]);
    }
}
