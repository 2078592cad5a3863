//! Configuration file handling.
//!
//! Settings come from an optional `tallyforge.toml`, then command-line
//! flags override individual fields.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cli::Args;
use crate::error::EdaError;
use crate::palette::CategoryPalette;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "tallyforge.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub wordcloud: WordCloudConfig,
}

/// Input table locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    #[serde(default = "default_sales")]
    pub sales: PathBuf,

    #[serde(default = "default_customers")]
    pub customers: PathBuf,

    /// strftime pattern of the `order_date` column.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            sales: default_sales(),
            customers: default_customers(),
            date_format: default_date_format(),
        }
    }
}

fn default_sales() -> PathBuf {
    PathBuf::from("data/raw/sales.csv")
}

fn default_customers() -> PathBuf {
    PathBuf::from("data/raw/customers.csv")
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

/// Chart output settings, handed to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Font family for all chart text. Product and region labels are
    /// Japanese, so the default is a CJK face.
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            font_family: default_font_family(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_font_family() -> String {
    "Noto Sans CJK JP".to_string()
}

/// Text report settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Number of products in the ranking table and chart.
    #[serde(default = "default_top_products")]
    pub top_products: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_products: default_top_products(),
        }
    }
}

fn default_top_products() -> usize {
    10
}

/// Word-cloud layout settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordCloudConfig {
    #[serde(default = "default_cloud_width")]
    pub width: u32,

    #[serde(default = "default_cloud_height")]
    pub height: u32,

    #[serde(default = "default_min_font_size")]
    pub min_font_size: u32,

    #[serde(default = "default_max_font_size")]
    pub max_font_size: u32,

    /// Probability that a word is laid out horizontally.
    #[serde(default = "default_prefer_horizontal")]
    pub prefer_horizontal: f64,

    /// 0 ranks words only by order, 1 sizes them proportionally to weight.
    #[serde(default = "default_relative_scaling")]
    pub relative_scaling: f64,

    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Divisor applied to sales totals before they become weights.
    #[serde(default = "default_sales_scale")]
    pub sales_scale: f64,

    #[serde(default)]
    pub palette: PaletteConfig,
}

/// Category colors as `#rrggbb` strings.
///
/// `categories` keys are either the data label (`酒類`) or the English
/// name (`alcohol`); entries override the built-in colors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaletteConfig {
    /// Color for products whose category has no entry.
    #[serde(default = "default_fallback_color")]
    pub fallback: String,

    #[serde(default)]
    pub categories: BTreeMap<String, String>,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            fallback: default_fallback_color(),
            categories: BTreeMap::new(),
        }
    }
}

fn default_fallback_color() -> String {
    "#333333".to_string()
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            width: default_cloud_width(),
            height: default_cloud_height(),
            min_font_size: default_min_font_size(),
            max_font_size: default_max_font_size(),
            prefer_horizontal: default_prefer_horizontal(),
            relative_scaling: default_relative_scaling(),
            seed: default_seed(),
            sales_scale: default_sales_scale(),
            palette: PaletteConfig::default(),
        }
    }
}

fn default_cloud_width() -> u32 {
    800
}

fn default_cloud_height() -> u32 {
    600
}

fn default_min_font_size() -> u32 {
    12
}

fn default_max_font_size() -> u32 {
    120
}

fn default_prefer_horizontal() -> f64 {
    0.7
}

fn default_relative_scaling() -> f64 {
    0.5
}

fn default_seed() -> u64 {
    42
}

fn default_sales_scale() -> f64 {
    1000.0
}

impl Config {
    /// Load configuration from a file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load the explicit config file, else `tallyforge.toml` in the working
    /// directory if it exists, else the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load_from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply command-line overrides.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref sales) = args.sales {
            self.input.sales = sales.clone();
        }
        if let Some(ref customers) = args.customers {
            self.input.customers = customers.clone();
        }
        if let Some(ref dir) = args.output_dir {
            self.output.dir = dir.clone();
        }
        if let Some(ref font) = args.font {
            self.output.font_family = font.clone();
        }
    }

    /// Reject settings the pipelines cannot work with.
    pub fn validate(&self) -> Result<()> {
        let wc = &self.wordcloud;

        if self.report.top_products == 0 {
            return Err(EdaError::InvalidConfig("report.top_products must be at least 1".into()).into());
        }
        if wc.width == 0 || wc.height == 0 {
            return Err(EdaError::InvalidConfig("wordcloud width and height must be positive".into()).into());
        }
        if wc.min_font_size == 0 || wc.min_font_size > wc.max_font_size {
            return Err(EdaError::InvalidConfig(format!(
                "wordcloud font sizes must satisfy 0 < min ({}) <= max ({})",
                wc.min_font_size, wc.max_font_size
            ))
            .into());
        }
        if !(0.0..=1.0).contains(&wc.prefer_horizontal) || !(0.0..=1.0).contains(&wc.relative_scaling) {
            return Err(EdaError::InvalidConfig(
                "wordcloud prefer_horizontal and relative_scaling must lie in [0, 1]".into(),
            )
            .into());
        }
        if wc.sales_scale <= 0.0 {
            return Err(EdaError::InvalidConfig("wordcloud sales_scale must be positive".into()).into());
        }
        CategoryPalette::from_config(&wc.palette)?;
        Ok(())
    }

    /// Default configuration rendered as TOML, printed by `tallyforge config`.
    pub fn default_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.sales, PathBuf::from("data/raw/sales.csv"));
        assert_eq!(config.output.dir, PathBuf::from("outputs"));
        assert_eq!(config.report.top_products, 10);
        assert_eq!(config.wordcloud.max_font_size, 120);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[output]\ndir = \"charts\"\n\n[wordcloud]\nseed = 7").unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("charts"));
        assert_eq!(config.output.font_family, "Noto Sans CJK JP");
        assert_eq!(config.wordcloud.seed, 7);
        assert_eq!(config.wordcloud.width, 800);
    }

    #[test]
    fn test_default_toml_round_trips() {
        let text = Config::default_toml().unwrap();
        assert!(text.contains("[wordcloud.palette]"));
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_palette_section() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[wordcloud.palette]\nfallback = \"#000000\"\n\n[wordcloud.palette.categories]\nalcohol = \"#ff0000\"").unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.wordcloud.palette.fallback, "#000000");
        assert_eq!(config.wordcloud.palette.categories.get("alcohol").map(String::as_str), Some("#ff0000"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_palette_color() {
        let mut config = Config::default();
        config.wordcloud.palette.categories.insert("酒類".into(), "purple".into());
        let err = config.validate().unwrap_err();
        assert!(matches!(err.downcast_ref::<EdaError>(), Some(EdaError::InvalidConfig(_))));
    }

    #[test]
    fn test_args_override_file() {
        let mut config = Config::default();
        let args = Args {
            output_dir: Some(PathBuf::from("/tmp/elsewhere")),
            font: Some("IPAexGothic".to_string()),
            ..Default::default()
        };

        config.merge_with_args(&args);
        assert_eq!(config.output.dir, PathBuf::from("/tmp/elsewhere"));
        assert_eq!(config.output.font_family, "IPAexGothic");
        assert_eq!(config.input.sales, PathBuf::from("data/raw/sales.csv"));
    }

    #[test]
    fn test_validate_rejects_bad_fonts() {
        let mut config = Config::default();
        config.wordcloud.min_font_size = 200;
        assert!(config.validate().is_err());
    }
}
