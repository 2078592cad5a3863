//! Chart rendering using Plotters
//!
//! The `Renderer` owns the output directory and font; each public method
//! writes one PNG and returns its path. The `draw_*` helpers draw a single
//! chart kind onto any bitmap drawing area so several can share a figure.

use std::path::{Path, PathBuf};

use anyhow::Context;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::info;

use crate::aggregate::{CrossTab, CustomerTypeStats, GroupStats, MonthlySales, ProductTotal};
use crate::config::{OutputConfig, WordCloudConfig};
use crate::error::EdaError;
use crate::palette::{CategoryPalette, ColorResolver};
use crate::wordcloud;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

pub const MONTHLY_SALES_FILE: &str = "01_monthly_sales.png";
pub const CATEGORY_CHANNEL_FILE: &str = "02_category_channel_sales.png";
pub const CUSTOMER_TYPE_FILE: &str = "03_customer_type_analysis.png";
pub const REGION_FILE: &str = "04_region_analysis.png";
pub const TOP_PRODUCTS_FILE: &str = "05_product_top10.png";
pub const HEATMAP_FILE: &str = "06_monthly_category_heatmap.png";
pub const WORDCLOUD_FILE: &str = "07_wordcloud_comparison.png";

/// Amounts are plotted in units of 10,000 yen.
const YEN_UNIT: f64 = 10_000.0;

const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);
const DARK_ORANGE: RGBColor = RGBColor(255, 140, 0);
const TEAL: RGBColor = RGBColor(0, 128, 128);
const CORAL: RGBColor = RGBColor(255, 127, 80);
const SEA_GREEN: RGBColor = RGBColor(46, 139, 87);
const PURPLE: RGBColor = RGBColor(128, 0, 128);

/// Colors for two-way customer-type splits.
const PAIR_COLORS: [RGBColor; 2] = [RGBColor(0xff, 0x99, 0x99), RGBColor(0x66, 0xb3, 0xff)];

/// Yellow-orange-red ramp for the heatmap, low to high.
const YLORRD: [RGBColor; 5] = [
    RGBColor(255, 255, 204),
    RGBColor(254, 217, 118),
    RGBColor(253, 141, 60),
    RGBColor(227, 26, 28),
    RGBColor(128, 0, 38),
];

/// Writes every chart into one configured directory.
#[derive(Debug, Clone)]
pub struct Renderer {
    config: OutputConfig,
}

impl Renderer {
    /// Create the renderer, creating the output directory if needed.
    pub fn new(config: OutputConfig) -> crate::Result<Self> {
        std::fs::create_dir_all(&config.dir)
            .with_context(|| format!("Failed to create output directory {}", config.dir.display()))?;
        Ok(Self { config })
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.dir
    }

    pub fn output_path(&self, file: &str) -> PathBuf {
        self.config.dir.join(file)
    }

    fn font(&self) -> &str {
        &self.config.font_family
    }

    /// Monthly sales bars with the order count as a line on its own axis.
    pub fn monthly_sales(&self, rows: &[MonthlySales]) -> crate::Result<PathBuf> {
        let path = self.output_path(MONTHLY_SALES_FILE);
        let labels: Vec<String> = rows.iter().map(|r| r.month.clone()).collect();
        let sales: Vec<f64> = rows.iter().map(|r| r.total / YEN_UNIT).collect();
        let orders: Vec<f64> = rows.iter().map(|r| r.orders as f64).collect();

        {
            let root = BitMapBackend::new(&path, (1200, 600)).into_drawing_area();
            root.fill(&WHITE)?;
            draw_dual_axis(
                &root,
                "Monthly Sales and Order Count",
                &labels,
                (&sales, "Sales (10K JPY)"),
                (&orders, "Order Count"),
                self.font(),
            )?;
            root.present()?;
        }

        info!(path = %path.display(), "Chart saved");
        Ok(path)
    }

    /// Category and channel totals side by side.
    pub fn category_channel(&self, categories: &[GroupStats], channels: &[GroupStats]) -> crate::Result<PathBuf> {
        let path = self.output_path(CATEGORY_CHANNEL_FILE);

        {
            let root = BitMapBackend::new(&path, (1400, 500)).into_drawing_area();
            root.fill(&WHITE)?;
            let panels = root.split_evenly((1, 2));

            let (labels, values) = scaled_totals(categories);
            draw_hbar_chart(&panels[0], "Sales by Product Category", &labels, &values, TEAL, "Sales (10K JPY)", self.font())?;

            let (labels, values) = scaled_totals(channels);
            draw_hbar_chart(&panels[1], "Sales by Channel", &labels, &values, CORAL, "Sales (10K JPY)", self.font())?;

            root.present()?;
        }

        info!(path = %path.display(), "Chart saved");
        Ok(path)
    }

    /// Sales share pie per customer type and category × customer-type bars.
    pub fn customer_type(&self, types: &[CustomerTypeStats], by_category: &CrossTab) -> crate::Result<PathBuf> {
        let path = self.output_path(CUSTOMER_TYPE_FILE);
        let labels: Vec<String> = types.iter().map(|t| t.customer_type.clone()).collect();
        let totals: Vec<f64> = types.iter().map(|t| t.total).collect();

        {
            let root = BitMapBackend::new(&path, (1200, 500)).into_drawing_area();
            root.fill(&WHITE)?;
            let panels = root.split_evenly((1, 2));

            draw_pie_chart(&panels[0], "Sales Share by Customer Type", &labels, &totals, &PAIR_COLORS, self.font())?;
            draw_grouped_bars(
                &panels[1],
                "Sales by Category and Customer Type",
                by_category,
                &PAIR_COLORS,
                ("Product Category", "Sales (JPY)"),
                self.font(),
            )?;

            root.present()?;
        }

        info!(path = %path.display(), "Chart saved");
        Ok(path)
    }

    /// Regional totals and region × customer-type bars.
    pub fn region(&self, regions: &[GroupStats], by_type: &CrossTab) -> crate::Result<PathBuf> {
        let path = self.output_path(REGION_FILE);

        {
            let root = BitMapBackend::new(&path, (1200, 500)).into_drawing_area();
            root.fill(&WHITE)?;
            let panels = root.split_evenly((1, 2));

            let (labels, values) = scaled_totals(regions);
            draw_bar_chart(
                &panels[0],
                "Sales by Region",
                &labels,
                &values,
                SEA_GREEN,
                ("Region", "Sales (10K JPY)"),
                self.font(),
            )?;
            draw_grouped_bars(
                &panels[1],
                "Sales by Region and Customer Type",
                by_type,
                &PAIR_COLORS,
                ("Region", "Sales (JPY)"),
                self.font(),
            )?;

            root.present()?;
        }

        info!(path = %path.display(), "Chart saved");
        Ok(path)
    }

    /// Best-selling products, best at the top.
    pub fn top_products(&self, products: &[ProductTotal]) -> crate::Result<PathBuf> {
        let path = self.output_path(TOP_PRODUCTS_FILE);
        let labels: Vec<String> = products.iter().map(|p| p.name.clone()).collect();
        let values: Vec<f64> = products.iter().map(|p| p.total).collect();
        let title = format!("Top {} Products by Sales", products.len());

        {
            let root = BitMapBackend::new(&path, (1000, 600)).into_drawing_area();
            root.fill(&WHITE)?;
            draw_hbar_chart(&root, &title, &labels, &values, PURPLE, "Sales (JPY)", self.font())?;
            root.present()?;
        }

        info!(path = %path.display(), "Chart saved");
        Ok(path)
    }

    /// Category × month sales as a color matrix.
    pub fn monthly_category_heatmap(&self, table: &CrossTab) -> crate::Result<PathBuf> {
        let path = self.output_path(HEATMAP_FILE);

        {
            let root = BitMapBackend::new(&path, (1400, 500)).into_drawing_area();
            root.fill(&WHITE)?;
            draw_heatmap(&root, "Monthly Sales by Category (10K JPY)", table, YEN_UNIT, self.font())?;
            root.present()?;
        }

        info!(path = %path.display(), "Chart saved");
        Ok(path)
    }

    /// Two word clouds (by order count, by sales) over a category legend.
    pub fn wordcloud_comparison(
        &self,
        by_count: &[(String, f64)],
        by_sales: &[(String, f64)],
        resolver: &ColorResolver<'_>,
        palette: &CategoryPalette,
        options: &WordCloudConfig,
    ) -> crate::Result<PathBuf> {
        let path = self.output_path(WORDCLOUD_FILE);
        let legend_height = 80;
        let size = (options.width * 2, options.height + 40 + legend_height);

        {
            let root = BitMapBackend::new(&path, size).into_drawing_area();
            root.fill(&WHITE)?;

            let (clouds, legend) = root.split_vertically(size.1 as i32 - legend_height as i32);
            let panels = clouds.split_evenly((1, 2));

            draw_wordcloud(&panels[0], "Product Word Cloud (by order count)", by_count, resolver, options, self.font())?;
            draw_wordcloud(&panels[1], "Product Word Cloud (by total sales)", by_sales, resolver, options, self.font())?;
            draw_category_legend(&legend, "Product Category", palette, self.font())?;

            root.present()?;
        }

        info!(path = %path.display(), "Chart saved");
        Ok(path)
    }
}

// ── Chart primitives ────────────────────────────────────────────────────────

/// Vertical bars, one per label.
pub fn draw_bar_chart(
    area: &Area<'_>,
    title: &str,
    labels: &[String],
    values: &[f64],
    color: RGBColor,
    (x_desc, y_desc): (&str, &str),
    font: &str,
) -> crate::Result<()> {
    ensure_drawable(title, values)?;
    let n = labels.len();
    let label_fmt = |x: &f64| label_at(labels, *x);

    let mut chart = ChartBuilder::on(area)
        .caption(title, (font, 22))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(category_axis(n), 0f64..padded_max(values))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&label_fmt)
        .x_desc(x_desc)
        .y_desc(y_desc)
        .label_style((font, 12))
        .axis_desc_style((font, 15))
        .draw()?;

    chart.draw_series(
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Rectangle::new([(i as f64 - 0.4, 0.0), (i as f64 + 0.4, *v)], color.filled())),
    )?;

    Ok(())
}

/// Horizontal bars; the first label is drawn at the top.
pub fn draw_hbar_chart(
    area: &Area<'_>,
    title: &str,
    labels: &[String],
    values: &[f64],
    color: RGBColor,
    x_desc: &str,
    font: &str,
) -> crate::Result<()> {
    ensure_drawable(title, values)?;
    let n = labels.len();
    let top_down: Vec<String> = labels.iter().rev().cloned().collect();
    let label_fmt = |y: &f64| label_at(&top_down, *y);

    let mut chart = ChartBuilder::on(area)
        .caption(title, (font, 22))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(140)
        .build_cartesian_2d(0f64..padded_max(values), category_axis(n))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&label_fmt)
        .x_desc(x_desc)
        .label_style((font, 12))
        .axis_desc_style((font, 15))
        .draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        let y = (n - 1 - i) as f64;
        Rectangle::new([(0.0, y - 0.4), (*v, y + 0.4)], color.filled())
    }))?;

    Ok(())
}

/// Pie with labels and percentages.
pub fn draw_pie_chart(
    area: &Area<'_>,
    title: &str,
    labels: &[String],
    values: &[f64],
    colors: &[RGBColor],
    font: &str,
) -> crate::Result<()> {
    ensure_drawable(title, values)?;
    if values.iter().any(|v| *v < 0.0) || values.iter().sum::<f64>() <= 0.0 {
        return Err(EdaError::EmptyChart(format!("{}: pie needs positive shares", title)).into());
    }

    let area = area.titled(title, (font, 22))?;
    let (w, h) = area.dim_in_pixel();
    let center = ((w / 2) as i32, (h / 2) as i32);
    let radius = w.min(h) as f64 * 0.35;
    let slice_colors: Vec<RGBColor> = (0..values.len()).map(|i| colors[i % colors.len()]).collect();

    let mut pie = Pie::new(&center, &radius, values, &slice_colors, labels);
    pie.label_style((font, 16).into_font().color(&BLACK));
    pie.percentages((font, 14).into_font().color(&BLACK));
    area.draw(&pie)?;

    Ok(())
}

/// One bar per cross-tab column within each row group, with a legend.
pub fn draw_grouped_bars(
    area: &Area<'_>,
    title: &str,
    table: &CrossTab,
    colors: &[RGBColor],
    (x_desc, y_desc): (&str, &str),
    font: &str,
) -> crate::Result<()> {
    ensure_table(title, table)?;
    let groups = table.row_labels.len();
    let series = table.col_labels.len();
    let max = table.values.iter().cloned().fold(0.0, f64::max);
    let bar_width = 0.8 / series as f64;
    let label_fmt = |x: &f64| label_at(&table.row_labels, *x);

    let mut chart = ChartBuilder::on(area)
        .caption(title, (font, 22))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(category_axis(groups), 0f64..padded(max))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups)
        .x_label_formatter(&label_fmt)
        .x_desc(x_desc)
        .y_desc(y_desc)
        .label_style((font, 12))
        .axis_desc_style((font, 15))
        .draw()?;

    for (s, name) in table.col_labels.iter().enumerate() {
        let color = colors[s % colors.len()];
        let offset = -0.4 + bar_width * s as f64;

        chart
            .draw_series(table.column_values(s).into_iter().enumerate().map(move |(g, v)| {
                let left = g as f64 + offset;
                Rectangle::new([(left, 0.0), (left + bar_width, v)], color.filled())
            }))?
            .label(name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font((font, 12))
        .draw()?;

    Ok(())
}

/// Bars on the left axis and a marked line on an independent right axis.
pub fn draw_dual_axis(
    area: &Area<'_>,
    title: &str,
    labels: &[String],
    (bars, bar_desc): (&[f64], &str),
    (line, line_desc): (&[f64], &str),
    font: &str,
) -> crate::Result<()> {
    ensure_drawable(title, bars)?;
    ensure_drawable(title, line)?;
    let n = labels.len();
    let label_fmt = |x: &f64| label_at(labels, *x);

    let mut chart = ChartBuilder::on(area)
        .caption(title, (font, 22))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .right_y_label_area_size(70)
        .build_cartesian_2d(category_axis(n), 0f64..padded_max(bars))?
        .set_secondary_coord(category_axis(n), 0f64..padded_max(line));

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&label_fmt)
        .x_desc("Month")
        .y_desc(bar_desc)
        .label_style((font, 12))
        .axis_desc_style((font, 15).into_font().color(&STEEL_BLUE))
        .draw()?;

    chart
        .configure_secondary_axes()
        .y_desc(line_desc)
        .label_style((font, 12))
        .axis_desc_style((font, 15).into_font().color(&DARK_ORANGE))
        .draw()?;

    chart
        .draw_series(
            bars.iter()
                .enumerate()
                .map(|(i, v)| Rectangle::new([(i as f64 - 0.4, 0.0), (i as f64 + 0.4, *v)], STEEL_BLUE.mix(0.7).filled())),
        )?
        .label(bar_desc)
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], STEEL_BLUE.filled()));

    let points: Vec<(f64, f64)> = line.iter().enumerate().map(|(i, v)| (i as f64, *v)).collect();

    chart
        .draw_secondary_series(LineSeries::new(points.clone(), DARK_ORANGE.stroke_width(2)))?
        .label(line_desc)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 12, y)], DARK_ORANGE.stroke_width(2)));
    chart.draw_secondary_series(points.into_iter().map(|p| Circle::new(p, 4, DARK_ORANGE.filled())))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font((font, 12))
        .draw()?;

    Ok(())
}

/// Cross-tab as a color matrix: rows top to bottom, a color bar on the
/// right. Cell values are divided by `unit` before coloring.
pub fn draw_heatmap(area: &Area<'_>, title: &str, table: &CrossTab, unit: f64, font: &str) -> crate::Result<()> {
    ensure_table(title, table)?;
    let rows = table.row_labels.len();
    let cols = table.col_labels.len();
    let max = table.values.iter().cloned().fold(0.0, f64::max) / unit;

    let (w, _) = area.dim_in_pixel();
    let (plot, bar) = area.split_horizontally(w as i32 - 120);

    let top_down: Vec<String> = table.row_labels.iter().rev().cloned().collect();
    let x_fmt = |x: &f64| label_at(&table.col_labels, *x);
    let y_fmt = |y: &f64| label_at(&top_down, *y);

    let mut chart = ChartBuilder::on(&plot)
        .caption(title, (font, 22))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(category_axis(cols), category_axis(rows))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(cols)
        .y_labels(rows)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .label_style((font, 12))
        .draw()?;

    chart.draw_series(table.values.indexed_iter().map(|((r, c), v)| {
        let x = c as f64;
        let y = (rows - 1 - r) as f64;
        let color = heat_color(if max > 0.0 { v / unit / max } else { 0.0 });
        Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], color.filled())
    }))?;

    let mut scale = ChartBuilder::on(&bar)
        .margin_top(50)
        .margin_bottom(70)
        .margin_right(10)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..1f64, 0f64..padded(max))?;

    scale
        .configure_mesh()
        .disable_mesh()
        .x_labels(0)
        .y_desc("Sales (10K JPY)")
        .label_style((font, 11))
        .axis_desc_style((font, 13))
        .draw()?;

    let steps = 50;
    let top = padded(max);
    scale.draw_series((0..steps).map(|i| {
        let lo = top * i as f64 / steps as f64;
        let hi = top * (i + 1) as f64 / steps as f64;
        Rectangle::new([(0.0, lo), (1.0, hi)], heat_color(lo / top).filled())
    }))?;

    Ok(())
}

/// Lay out and draw one word cloud in `area` under `title`.
pub fn draw_wordcloud(
    area: &Area<'_>,
    title: &str,
    frequencies: &[(String, f64)],
    resolver: &ColorResolver<'_>,
    options: &WordCloudConfig,
    font: &str,
) -> crate::Result<()> {
    let panel = area.titled(title, (font, 20))?;
    let canvas = panel.dim_in_pixel();

    let words = wordcloud::layout(frequencies, canvas, options, |text, size| {
        let style = TextStyle::from((font, size as f64).into_font());
        Ok(panel.estimate_text_size(text, &style)?)
    })?;

    for word in &words {
        let color = resolver.resolve(&word.text);
        let style = TextStyle::from((font, word.font_size as f64).into_font()).color(&color);

        if word.vertical {
            let rotated = style.transform(FontTransform::Rotate270);
            panel.draw_text(&word.text, &rotated, (word.x, word.y + word.height as i32))?;
        } else {
            panel.draw_text(&word.text, &style, (word.x, word.y))?;
        }
    }

    Ok(())
}

/// Row of colored squares with category names, centered in `area`.
pub fn draw_category_legend(area: &Area<'_>, title: &str, palette: &CategoryPalette, font: &str) -> crate::Result<()> {
    let entries = palette.entries();
    let (w, h) = area.dim_in_pixel();
    let slot = 140;
    let start = (w as i32 - slot * entries.len() as i32) / 2;
    let y = h as i32 * 2 / 3;

    let title_style = TextStyle::from((font, 16).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    area.draw_text(title, &title_style, (w as i32 / 2, h as i32 / 4))?;

    let label_style = TextStyle::from((font, 16).into_font()).pos(Pos::new(HPos::Left, VPos::Center));
    for (i, (label, color)) in entries.iter().enumerate() {
        let x = start + slot * i as i32;
        area.draw(&Rectangle::new([(x, y - 8), (x + 16, y + 8)], color.filled()))?;
        area.draw_text(label, &label_style, (x + 24, y))?;
    }

    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Continuous axis over `n` category slots, slot `i` centered on `i`.
fn category_axis(n: usize) -> RangedCoordf64 {
    (-0.5f64..n as f64 - 0.5).into()
}

/// Label for an axis position, blank between slots.
fn label_at(labels: &[String], position: f64) -> String {
    let slot = position.round();
    if (position - slot).abs() > 1e-6 || slot < 0.0 {
        return String::new();
    }
    labels.get(slot as usize).cloned().unwrap_or_default()
}

fn scaled_totals(stats: &[GroupStats]) -> (Vec<String>, Vec<f64>) {
    stats.iter().map(|s| (s.key.clone(), s.total / YEN_UNIT)).unzip()
}

fn padded_max(values: &[f64]) -> f64 {
    padded(values.iter().cloned().fold(0.0, f64::max))
}

/// Axis upper bound with 10% headroom; never an empty range.
fn padded(max: f64) -> f64 {
    if max.is_finite() && max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn ensure_drawable(title: &str, values: &[f64]) -> crate::Result<()> {
    if values.is_empty() {
        return Err(EdaError::EmptyChart(title.to_string()).into());
    }
    Ok(())
}

fn ensure_table(title: &str, table: &CrossTab) -> crate::Result<()> {
    if table.values.is_empty() {
        return Err(EdaError::EmptyChart(title.to_string()).into());
    }
    Ok(())
}

/// Position `t` in [0, 1] on the yellow-orange-red ramp.
pub fn heat_color(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (YLORRD.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(YLORRD.len() - 2);
    let frac = scaled - i as f64;

    let (a, b) = (YLORRD[i], YLORRD[i + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CrossTab;
    use ndarray::array;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn create_test_renderer(dir: &Path) -> Renderer {
        Renderer::new(OutputConfig {
            dir: dir.join("charts"),
            font_family: "sans-serif".to_string(),
        })
        .unwrap()
    }

    fn stats(pairs: &[(&str, f64)]) -> Vec<GroupStats> {
        pairs
            .iter()
            .map(|(k, t)| GroupStats { key: k.to_string(), total: *t, mean: *t, count: 1 })
            .collect()
    }

    fn create_test_cross_tab() -> CrossTab {
        CrossTab {
            row_labels: vec!["Aquatic".into(), "Livestock".into()],
            col_labels: vec!["toB".into(), "toC".into()],
            values: array![[120_000.0, 0.0], [40_000.0, 75_000.0]],
        }
    }

    #[test]
    fn test_renderer_creates_output_dir() {
        let temp_dir = tempdir().unwrap();
        let renderer = create_test_renderer(temp_dir.path());
        assert!(renderer.output_dir().is_dir());
        assert_eq!(
            renderer.output_path(MONTHLY_SALES_FILE),
            temp_dir.path().join("charts").join(MONTHLY_SALES_FILE)
        );
    }

    #[test]
    fn test_monthly_sales_chart() {
        let temp_dir = tempdir().unwrap();
        let renderer = create_test_renderer(temp_dir.path());
        let rows = vec![
            MonthlySales { month: "2024-01".into(), total: 350_000.0, orders: 12 },
            MonthlySales { month: "2024-02".into(), total: 410_000.0, orders: 9 },
        ];

        let path = renderer.monthly_sales(&rows).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_category_channel_chart() {
        let temp_dir = tempdir().unwrap();
        let renderer = create_test_renderer(temp_dir.path());
        let categories = stats(&[("Aquatic", 500_000.0), ("Alcohol", 120_000.0)]);
        let channels = stats(&[("EC", 400_000.0), ("Store", 220_000.0)]);

        let path = renderer.category_channel(&categories, &channels).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_customer_type_and_region_charts() {
        let temp_dir = tempdir().unwrap();
        let renderer = create_test_renderer(temp_dir.path());
        let types = vec![
            CustomerTypeStats { customer_type: "toB".into(), total: 160_000.0, mean: 80_000.0, orders: 2, avg_quantity: 3.0 },
            CustomerTypeStats { customer_type: "toC".into(), total: 75_000.0, mean: 75_000.0, orders: 1, avg_quantity: 1.0 },
        ];

        let path = renderer.customer_type(&types, &create_test_cross_tab()).unwrap();
        assert!(path.exists());

        let regions = stats(&[("Sapporo", 150_000.0), ("Hakodate", 85_000.0)]);
        let path = renderer.region(&regions, &create_test_cross_tab()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_top_products_and_heatmap() {
        let temp_dir = tempdir().unwrap();
        let renderer = create_test_renderer(temp_dir.path());
        let products = vec![
            ProductTotal { name: "Scallop".into(), total: 90_000.0 },
            ProductTotal { name: "Wagyu".into(), total: 60_000.0 },
        ];

        assert!(renderer.top_products(&products).unwrap().exists());
        assert!(renderer.monthly_category_heatmap(&create_test_cross_tab()).unwrap().exists());
    }

    #[test]
    fn test_wordcloud_chart() {
        let temp_dir = tempdir().unwrap();
        let renderer = create_test_renderer(temp_dir.path());
        let palette = CategoryPalette::default();
        let mapping: HashMap<String, String> = [("Scallop".to_string(), "水産物".to_string())].into_iter().collect();
        let resolver = ColorResolver::new(&mapping, &palette);
        let freqs = vec![("Scallop".to_string(), 5.0), ("Mystery".to_string(), 2.0)];
        let options = WordCloudConfig { width: 300, height: 200, max_font_size: 40, ..Default::default() };

        let path = renderer.wordcloud_comparison(&freqs, &freqs, &resolver, &palette, &options).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_empty_chart_is_fatal() {
        let temp_dir = tempdir().unwrap();
        let renderer = create_test_renderer(temp_dir.path());

        let err = renderer.top_products(&[]).unwrap_err();
        assert!(matches!(err.downcast_ref::<EdaError>(), Some(EdaError::EmptyChart(_))));
    }

    #[test]
    fn test_label_at_slots() {
        let labels = vec!["a".to_string(), "b".to_string()];
        assert_eq!(label_at(&labels, 0.0), "a");
        assert_eq!(label_at(&labels, 1.0), "b");
        assert_eq!(label_at(&labels, 0.5), "");
        assert_eq!(label_at(&labels, 2.0), "");
        assert_eq!(label_at(&labels, -1.0), "");
    }

    #[test]
    fn test_category_axis_centers_slots() {
        let axis = category_axis(3);
        assert_eq!(axis.range(), -0.5..2.5);
        assert_eq!(axis.map(&0.0, (0, 300)), 50);
        assert_eq!(axis.map(&2.0, (0, 300)), 250);
    }

    #[test]
    fn test_heat_color_endpoints() {
        assert_eq!(heat_color(0.0), YLORRD[0]);
        assert_eq!(heat_color(1.0), YLORRD[4]);
        assert_eq!(heat_color(f64::NAN), YLORRD[0]);
        assert_eq!(heat_color(0.25), YLORRD[1]);
    }
}
