//! Product categories and their display colors

use std::collections::HashMap;

use plotters::style::RGBColor;

use crate::config::PaletteConfig;
use crate::error::EdaError;

/// Color for anything the palette has no entry for.
pub const FALLBACK_COLOR: RGBColor = RGBColor(0x33, 0x33, 0x33);

/// The four product categories sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductCategory {
    Aquatic,
    Livestock,
    Agricultural,
    Alcohol,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 4] = [
        ProductCategory::Aquatic,
        ProductCategory::Livestock,
        ProductCategory::Agricultural,
        ProductCategory::Alcohol,
    ];

    /// Label as it appears in the sales data.
    pub fn label(&self) -> &'static str {
        match self {
            ProductCategory::Aquatic => "水産物",
            ProductCategory::Livestock => "畜産物",
            ProductCategory::Agricultural => "農産物",
            ProductCategory::Alcohol => "酒類",
        }
    }

    pub fn color(&self) -> RGBColor {
        match self {
            ProductCategory::Aquatic => RGBColor(0x1f, 0x77, 0xb4),
            ProductCategory::Livestock => RGBColor(0xd6, 0x27, 0x28),
            ProductCategory::Agricultural => RGBColor(0x2c, 0xa0, 0x2c),
            ProductCategory::Alcohol => RGBColor(0x94, 0x67, 0xbd),
        }
    }

    /// Parse either the data label or the English name.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|c| {
            c.label() == label || format!("{:?}", c).eq_ignore_ascii_case(label)
        })
    }
}

/// Category label → color, with an explicit default.
#[derive(Debug, Clone)]
pub struct CategoryPalette {
    entries: Vec<(String, RGBColor)>,
    default: RGBColor,
}

impl CategoryPalette {
    pub fn new(default: RGBColor) -> Self {
        Self {
            entries: Vec::new(),
            default,
        }
    }

    /// Add or replace the color of `category`.
    pub fn insert(&mut self, category: &str, color: RGBColor) {
        match self.entries.iter_mut().find(|(label, _)| label == category) {
            Some(entry) => entry.1 = color,
            None => self.entries.push((category.to_string(), color)),
        }
    }

    pub fn color_of(&self, category: &str) -> RGBColor {
        self.entries
            .iter()
            .find(|(label, _)| label == category)
            .map(|(_, color)| *color)
            .unwrap_or(self.default)
    }

    /// Built-in colors overridden by the configured ones.
    ///
    /// Keys naming a known category resolve to its data label; any other
    /// key is taken as a category label verbatim.
    pub fn from_config(config: &PaletteConfig) -> crate::Result<Self> {
        let mut palette = Self::default();
        palette.default = config_color("fallback", &config.fallback)?;

        for (key, hex) in &config.categories {
            let label = ProductCategory::from_label(key).map_or(key.as_str(), |c| c.label());
            palette.insert(label, config_color(key, hex)?);
        }
        Ok(palette)
    }

    pub fn default_color(&self) -> RGBColor {
        self.default
    }

    /// Entries in insertion order, for legends.
    pub fn entries(&self) -> &[(String, RGBColor)] {
        &self.entries
    }
}

impl Default for CategoryPalette {
    fn default() -> Self {
        let mut palette = Self::new(FALLBACK_COLOR);
        for category in ProductCategory::ALL {
            palette.insert(category.label(), category.color());
        }
        palette
    }
}

/// Resolves a word-cloud label (a product name) to its category color.
pub struct ColorResolver<'a> {
    product_to_category: &'a HashMap<String, String>,
    palette: &'a CategoryPalette,
}

impl<'a> ColorResolver<'a> {
    pub fn new(product_to_category: &'a HashMap<String, String>, palette: &'a CategoryPalette) -> Self {
        Self {
            product_to_category,
            palette,
        }
    }

    /// Products without a known category get the palette default.
    pub fn resolve(&self, label: &str) -> RGBColor {
        match self.product_to_category.get(label) {
            Some(category) => self.palette.color_of(category),
            None => self.palette.default_color(),
        }
    }
}

fn config_color(key: &str, hex: &str) -> crate::Result<RGBColor> {
    parse_hex(hex).ok_or_else(|| {
        EdaError::InvalidConfig(format!("palette color for '{}' is not #rrggbb: {}", key, hex)).into()
    })
}

/// Parse `#rrggbb`.
pub fn parse_hex(hex: &str) -> Option<RGBColor> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette_colors() {
        let palette = CategoryPalette::default();
        assert_eq!(palette.color_of("水産物"), parse_hex("#1f77b4").unwrap());
        assert_eq!(palette.color_of("酒類"), parse_hex("#9467bd").unwrap());
        assert_eq!(palette.color_of("菓子"), FALLBACK_COLOR);
        assert_eq!(palette.entries().len(), 4);
    }

    #[test]
    fn test_resolver_falls_back_for_unknown_product() {
        let palette = CategoryPalette::default();
        let mapping: HashMap<String, String> = [
            ("A".to_string(), "水産物".to_string()),
            ("B".to_string(), "畜産物".to_string()),
        ]
        .into_iter()
        .collect();

        let resolver = ColorResolver::new(&mapping, &palette);
        assert_eq!(resolver.resolve("A"), ProductCategory::Aquatic.color());
        assert_eq!(resolver.resolve("B"), ProductCategory::Livestock.color());
        assert_eq!(resolver.resolve("C"), FALLBACK_COLOR);
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut palette = CategoryPalette::default();
        palette.insert("酒類", RGBColor(1, 2, 3));
        assert_eq!(palette.color_of("酒類"), RGBColor(1, 2, 3));
        assert_eq!(palette.entries().len(), 4);
    }

    #[test]
    fn test_category_from_label() {
        assert_eq!(ProductCategory::from_label("農産物"), Some(ProductCategory::Agricultural));
        assert_eq!(ProductCategory::from_label("alcohol"), Some(ProductCategory::Alcohol));
        assert_eq!(ProductCategory::from_label("toys"), None);
    }

    #[test]
    fn test_palette_from_config() {
        let mut config = PaletteConfig::default();
        config.categories.insert("alcohol".into(), "#010203".into());
        config.categories.insert("菓子".into(), "#aabbcc".into());

        let palette = CategoryPalette::from_config(&config).unwrap();
        assert_eq!(palette.color_of("酒類"), RGBColor(1, 2, 3));
        assert_eq!(palette.color_of("菓子"), RGBColor(0xaa, 0xbb, 0xcc));
        assert_eq!(palette.color_of("水産物"), ProductCategory::Aquatic.color());
        assert_eq!(palette.default_color(), FALLBACK_COLOR);
        assert_eq!(palette.entries().len(), 5);
    }

    #[test]
    fn test_palette_from_config_rejects_bad_hex() {
        let config = PaletteConfig {
            fallback: "grey".into(),
            ..Default::default()
        };
        assert!(CategoryPalette::from_config(&config).is_err());
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#333333"), Some(FALLBACK_COLOR));
        assert_eq!(parse_hex("zzzzzz"), None);
        assert_eq!(parse_hex("#123"), None);
    }
}
