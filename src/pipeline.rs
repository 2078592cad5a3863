//! The two report pipelines
//!
//! Each step computes one aggregate, prints it, then renders it. Any
//! failure aborts the remaining steps.

use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::aggregate;
use crate::config::{ReportConfig, WordCloudConfig};
use crate::data::SalesData;
use crate::palette::{CategoryPalette, ColorResolver};
use crate::report;
use crate::schema::{derived, sales};
use crate::viz::Renderer;

/// Run the exploratory report: text sections 1-7 and charts 01-06.
///
/// # Returns
/// * Paths of the charts written, in order
pub fn run_eda<W: Write>(
    data: &SalesData,
    renderer: &Renderer,
    settings: &ReportConfig,
    out: &mut W,
) -> crate::Result<Vec<PathBuf>> {
    let df = &data.sales;
    let mut charts = Vec::new();

    info!("Step 1: basic statistics");
    report::banner(out, "1. Basic statistics")?;
    report::heading(out, "Sales overview")?;
    report::write_overview(out, &aggregate::overview(df)?)?;
    report::heading(out, "Customer table")?;
    let customer_columns: Vec<String> = data
        .customers
        .get_column_names()
        .iter()
        .map(|c| c.to_string())
        .collect();
    report::write_customer_table(out, data.customers.height(), &customer_columns)?;
    report::heading(out, "Numeric columns")?;
    report::write_describe(out, &aggregate::describe(df, &sales::NUMERIC)?)?;

    info!("Step 2: data types and missing values");
    report::banner(out, "2. Data types and missing values")?;
    report::write_column_info(out, &aggregate::missing_values(df), aggregate::repeat_missing_ratio(df)?)?;

    info!("Step 3: monthly sales");
    report::banner(out, "3. Monthly sales")?;
    let monthly = aggregate::monthly_sales(df)?;
    report::write_monthly(out, &monthly)?;
    charts.push(renderer.monthly_sales(&monthly)?);

    info!("Step 4: category and channel");
    report::banner(out, "4. Sales by product category and channel")?;
    let categories = aggregate::summarize_by(df, sales::PRODUCT_CATEGORY)?;
    report::heading(out, "By product category")?;
    report::write_group_stats(out, sales::PRODUCT_CATEGORY, &categories)?;
    let channels = aggregate::summarize_by(df, sales::CHANNEL)?;
    report::heading(out, "By channel")?;
    report::write_group_stats(out, sales::CHANNEL, &channels)?;
    charts.push(renderer.category_channel(&categories, &channels)?);

    info!("Step 5: customer type");
    report::banner(out, "5. Customer type comparison (toB / toC)")?;
    let types = aggregate::customer_type_summary(df)?;
    report::write_customer_types(out, &types)?;
    let type_by_category = aggregate::cross_tab(df, sales::PRODUCT_CATEGORY, sales::CUSTOMER_TYPE, sales::TOTAL_AMOUNT)?;
    report::heading(out, "Category x customer type")?;
    report::write_cross_tab(out, &type_by_category)?;
    charts.push(renderer.customer_type(&types, &type_by_category)?);

    info!("Step 6: region");
    report::banner(out, "6. Regional analysis")?;
    let regions = aggregate::summarize_by(df, sales::REGION)?;
    report::write_group_stats(out, sales::REGION, &regions)?;
    let region_by_type = aggregate::cross_tab(df, sales::REGION, sales::CUSTOMER_TYPE, sales::TOTAL_AMOUNT)?;
    report::heading(out, "Region x customer type")?;
    report::write_cross_tab(out, &region_by_type)?;
    charts.push(renderer.region(&regions, &region_by_type)?);

    info!("Step 7: correlation and products");
    report::banner(out, "7. Correlation and additional analysis")?;
    report::heading(out, "Correlation of numeric columns")?;
    report::write_correlation(out, &aggregate::correlation_matrix(df, &sales::NUMERIC)?)?;

    let products = aggregate::product_ranking(df, settings.top_products)?;
    report::heading(out, &format!("Top {} products by sales", settings.top_products))?;
    report::write_product_ranking(out, &products)?;

    report::heading(out, "Repeat rate by customer type")?;
    report::write_repeat_rates(out, &aggregate::repeat_rate_by(df, sales::CUSTOMER_TYPE)?)?;

    charts.push(renderer.top_products(&products)?);
    let category_by_month = aggregate::cross_tab(df, sales::PRODUCT_CATEGORY, derived::MONTH, sales::TOTAL_AMOUNT)?;
    charts.push(renderer.monthly_category_heatmap(&category_by_month)?);

    report::banner(out, &format!("Analysis complete: charts saved to {}", renderer.output_dir().display()))?;
    report::heading(out, "Summary")?;
    report::write_headline(out, &aggregate::headline(df, &categories, &products)?)?;

    debug!(charts = charts.len(), "EDA pipeline finished");
    Ok(charts)
}

/// Run the word-cloud report: chart 07 and the per-product table.
pub fn run_wordcloud<W: Write>(
    data: &SalesData,
    renderer: &Renderer,
    options: &WordCloudConfig,
    out: &mut W,
) -> crate::Result<PathBuf> {
    let stats = aggregate::product_stats(&data.sales)?;
    let product_to_category = aggregate::product_category_map(&stats);
    let palette = CategoryPalette::from_config(&options.palette)?;
    let resolver = ColorResolver::new(&product_to_category, &palette);

    let by_count: Vec<(String, f64)> = stats.iter().map(|s| (s.name.clone(), s.count as f64)).collect();
    let by_sales: Vec<(String, f64)> = stats
        .iter()
        .map(|s| (s.name.clone(), s.total / options.sales_scale))
        .collect();

    info!(products = stats.len(), "Rendering word clouds");
    let path = renderer.wordcloud_comparison(&by_count, &by_sales, &resolver, &palette, options)?;

    report::banner(out, "Product word clouds")?;
    writeln!(out, "Output: {}", path.display())?;
    report::heading(out, "Per-product statistics")?;
    report::write_product_stats(out, &stats)?;

    Ok(path)
}
