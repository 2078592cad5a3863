//! Data loading for the sales and customer tables using Polars

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use polars::prelude::*;
use tracing::{debug, info};

use crate::config::InputConfig;
use crate::error::EdaError;
use crate::schema::{customers, derived, sales};

/// Both input tables, loaded once and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct SalesData {
    /// Sales transactions with text ids, parsed `order_date`, derived `month` and a
    /// nullable boolean `is_repeat`.
    pub sales: DataFrame,
    /// Customer master data, kept for completeness.
    pub customers: DataFrame,
}

/// Load both tables named by the input configuration.
pub fn load_dataset(input: &InputConfig) -> crate::Result<SalesData> {
    let sales = load_sales(&input.sales, &input.date_format)?;
    let customers = load_customers(&input.customers)?;
    Ok(SalesData { sales, customers })
}

/// Load the sales CSV and normalise its column types.
///
/// # Arguments
/// * `path` - Path to the sales CSV file
/// * `date_format` - strftime pattern of the `order_date` column
///
/// # Returns
/// * `DataFrame` with text ids, `Int64` quantity, `Float64` prices, a `Date`
///   order date, a `YYYY-MM` month bucket and a nullable boolean repeat flag
pub fn load_sales(path: &Path, date_format: &str) -> crate::Result<DataFrame> {
    let raw = read_csv(path)?;
    require_columns(&raw, &sales::REQUIRED)?;

    if raw.height() == 0 {
        return Err(EdaError::EmptyDataset(path.display().to_string()).into());
    }

    let repeat = parse_repeat_flags(&raw)?;

    let mut df = raw
        .lazy()
        .with_columns([
            col(sales::QUANTITY).cast(DataType::Float64).cast(DataType::Int64),
            col(sales::UNIT_PRICE).cast(DataType::Float64),
            col(sales::TOTAL_AMOUNT).cast(DataType::Float64),
            col(sales::ORDER_DATE).str().to_date(StrptimeOptions {
                format: Some(date_format.into()),
                strict: true,
                ..Default::default()
            }),
        ])
        .with_column(
            col(sales::ORDER_DATE)
                .dt()
                .strftime("%Y-%m")
                .alias(derived::MONTH),
        )
        .collect()
        .with_context(|| format!("Failed to parse sales table {}", path.display()))?;

    df.with_column(repeat)?;

    info!(rows = df.height(), path = %path.display(), "Loaded sales table");
    Ok(df)
}

/// Load the customer CSV. Only the key column is checked.
pub fn load_customers(path: &Path) -> crate::Result<DataFrame> {
    let df = read_csv(path)?;
    require_columns(&df, &[customers::CUSTOMER_ID])?;
    info!(rows = df.height(), path = %path.display(), "Loaded customer table");
    Ok(df)
}

/// Read every column as text. Types are assigned by the caller, so
/// identifiers like `007` keep their leading zeros.
fn read_csv(path: &Path) -> crate::Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file {}", path.display()))?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("Failed to read CSV {}", path.display()))?;

    debug!(columns = ?df.get_column_names(), "CSV header");
    Ok(df)
}

/// Fail with `MissingColumn` for the first expected column the frame lacks.
pub fn require_columns(df: &DataFrame, names: &[&str]) -> crate::Result<()> {
    for name in names {
        if df.get_column_index(name).is_none() {
            return Err(EdaError::MissingColumn((*name).to_string()).into());
        }
    }
    Ok(())
}

/// Build the boolean `is_repeat` column. A missing column or an
/// unrecognised cell becomes null (unknown).
fn parse_repeat_flags(df: &DataFrame) -> crate::Result<Series> {
    let name = PlSmallStr::from_static(sales::IS_REPEAT);

    if df.get_column_index(sales::IS_REPEAT).is_none() {
        return Ok(Series::full_null(name, df.height(), &DataType::Boolean));
    }

    let text = df.column(sales::IS_REPEAT)?.cast(&DataType::String)?;
    let flags: Vec<Option<bool>> = text
        .str()?
        .into_iter()
        .map(|cell| cell.and_then(parse_flag))
        .collect();

    Ok(Series::new(name, flags))
}

/// Interpret one repeat-flag cell.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" | "yes" | "y" => Some(true),
        "false" | "0" | "0.0" | "no" | "n" => Some(false),
        _ => None,
    }
}
