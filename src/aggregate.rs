//! Grouped reductions over the sales table
//!
//! Every function here is a pure read-only reduction: the input frame is
//! never modified and each call recomputes its result from scratch.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use ndarray::Array2;
use polars::prelude::*;

use crate::error::EdaError;
use crate::schema::{agg, derived, sales};

/// Reduction applied to one column within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    Sum,
    Mean,
    /// Non-null values in the group.
    Count,
    /// First value in appearance order.
    First,
}

/// One output column of a grouped reduction.
#[derive(Debug, Clone)]
pub struct Reduction {
    pub column: String,
    pub op: ReduceOp,
    pub alias: String,
}

impl Reduction {
    pub fn new(column: &str, op: ReduceOp, alias: &str) -> Self {
        Self {
            column: column.to_string(),
            op,
            alias: alias.to_string(),
        }
    }

    fn expr(&self) -> Expr {
        let source = col(self.column.as_str());
        let reduced = match self.op {
            ReduceOp::Sum => source.cast(DataType::Float64).sum(),
            ReduceOp::Mean => source.cast(DataType::Float64).mean(),
            ReduceOp::Count => source.count(),
            ReduceOp::First => source.first(),
        };
        reduced.alias(self.alias.as_str())
    }
}

/// Ordering applied to a grouped result.
///
/// Groups are ranked by `metric`; equal metrics fall back to the grouping
/// keys in ascending lexicographic order so identical input always ranks
/// identically.
#[derive(Debug, Clone)]
pub struct Ranking {
    pub metric: String,
    pub descending: bool,
    pub limit: Option<usize>,
}

impl Ranking {
    /// Largest `metric` first.
    pub fn top(metric: &str) -> Self {
        Self {
            metric: metric.to_string(),
            descending: true,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Group `df` by `keys` and apply `reductions` per group.
///
/// Rows with a null key are dropped. Without a ranking, groups appear in
/// order of first appearance.
pub fn group_and_reduce(
    df: &DataFrame,
    keys: &[&str],
    reductions: &[Reduction],
    ranking: Option<&Ranking>,
) -> crate::Result<DataFrame> {
    for key in keys {
        column(df, key)?;
    }
    for reduction in reductions {
        column(df, &reduction.column)?;
    }

    let key_exprs: Vec<Expr> = keys.iter().map(|k| col(*k)).collect();
    let non_null_keys = keys
        .iter()
        .fold(lit(true), |acc, k| acc.and(col(*k).is_not_null()));

    let mut lf = df
        .clone()
        .lazy()
        .filter(non_null_keys)
        .group_by_stable(key_exprs)
        .agg(reductions.iter().map(Reduction::expr).collect::<Vec<_>>());

    if let Some(ranking) = ranking {
        let mut by = vec![col(ranking.metric.as_str())];
        by.extend(keys.iter().map(|k| col(*k)));

        let mut descending = vec![ranking.descending];
        descending.extend(std::iter::repeat(false).take(keys.len()));

        lf = lf.sort_by_exprs(
            by,
            SortMultipleOptions::default()
                .with_order_descending_multi(descending)
                .with_maintain_order(true),
        );

        if let Some(limit) = ranking.limit {
            lf = lf.limit(limit as IdxSize);
        }
    }

    Ok(lf.collect()?)
}

// ── Typed aggregate rows ────────────────────────────────────────────────────

/// Sales per month bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySales {
    pub month: String,
    pub total: f64,
    pub orders: u32,
}

/// Sum, mean and count of `total_amount` for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub key: String,
    pub total: f64,
    pub mean: f64,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerTypeStats {
    pub customer_type: String,
    pub total: f64,
    pub mean: f64,
    pub orders: u32,
    pub avg_quantity: f64,
}

/// Share of repeat purchases among records whose flag is known.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatRate {
    pub key: String,
    pub rate: f64,
    /// Records with a known flag.
    pub known: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductTotal {
    pub name: String,
    pub total: f64,
}

/// Per-product order count and sales, with the first category observed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductStats {
    pub name: String,
    pub category: String,
    pub count: u32,
    pub total: f64,
}

/// Two-key pivot of summed values. Unobserved pairs hold `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossTab {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub values: Array2<f64>,
}

impl CrossTab {
    /// Value at (`row`, `col`), or `None` for labels not in the table.
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let r = self.row_labels.iter().position(|l| l == row)?;
        let c = self.col_labels.iter().position(|l| l == col)?;
        Some(self.values[[r, c]])
    }

    /// Column `c` as a series across all rows.
    pub fn column_values(&self, c: usize) -> Vec<f64> {
        self.values.column(c).to_vec()
    }
}

/// Pairwise Pearson coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Array2<f64>,
}

/// pandas-style `describe()` of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub nulls: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub records: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// Closing summary of the EDA report.
#[derive(Debug, Clone, PartialEq)]
pub struct Headline {
    pub grand_total: f64,
    pub orders: usize,
    pub average_order: f64,
    pub unique_customers: usize,
    pub top_category: Option<String>,
    pub top_product: Option<String>,
}

// ── Breakdowns ──────────────────────────────────────────────────────────────

/// Total amount and order count per month, in calendar order.
pub fn monthly_sales(df: &DataFrame) -> crate::Result<Vec<MonthlySales>> {
    let grouped = group_and_reduce(
        df,
        &[derived::MONTH],
        &[
            Reduction::new(sales::TOTAL_AMOUNT, ReduceOp::Sum, agg::TOTAL),
            Reduction::new(sales::ORDER_ID, ReduceOp::Count, agg::COUNT),
        ],
        None,
    )?;

    let months = str_values(&grouped, derived::MONTH)?;
    let totals = f64_values(&grouped, agg::TOTAL)?;
    let counts = u32_values(&grouped, agg::COUNT)?;

    let mut rows: Vec<MonthlySales> = months
        .into_iter()
        .zip(totals)
        .zip(counts)
        .map(|((month, total), orders)| MonthlySales {
            month: month.unwrap_or_default(),
            total: total.unwrap_or(0.0),
            orders: orders.unwrap_or(0),
        })
        .collect();

    // "YYYY-MM" sorts chronologically as text
    rows.sort_by(|a, b| a.month.cmp(&b.month));
    Ok(rows)
}

/// Sum, mean and count of `total_amount` per `key`, largest total first.
pub fn summarize_by(df: &DataFrame, key: &str) -> crate::Result<Vec<GroupStats>> {
    let grouped = group_and_reduce(
        df,
        &[key],
        &[
            Reduction::new(sales::TOTAL_AMOUNT, ReduceOp::Sum, agg::TOTAL),
            Reduction::new(sales::TOTAL_AMOUNT, ReduceOp::Mean, agg::MEAN),
            Reduction::new(sales::TOTAL_AMOUNT, ReduceOp::Count, agg::COUNT),
        ],
        Some(&Ranking::top(agg::TOTAL)),
    )?;

    let keys = str_values(&grouped, key)?;
    let totals = f64_values(&grouped, agg::TOTAL)?;
    let means = f64_values(&grouped, agg::MEAN)?;
    let counts = u32_values(&grouped, agg::COUNT)?;

    Ok(keys
        .into_iter()
        .zip(totals)
        .zip(means)
        .zip(counts)
        .map(|(((key, total), mean), count)| GroupStats {
            key: key.unwrap_or_default(),
            total: total.unwrap_or(0.0),
            mean: mean.unwrap_or(f64::NAN),
            count: count.unwrap_or(0),
        })
        .collect())
}

/// Business vs consumer comparison, ordered by customer type.
pub fn customer_type_summary(df: &DataFrame) -> crate::Result<Vec<CustomerTypeStats>> {
    let grouped = group_and_reduce(
        df,
        &[sales::CUSTOMER_TYPE],
        &[
            Reduction::new(sales::TOTAL_AMOUNT, ReduceOp::Sum, agg::TOTAL),
            Reduction::new(sales::TOTAL_AMOUNT, ReduceOp::Mean, agg::MEAN),
            Reduction::new(sales::TOTAL_AMOUNT, ReduceOp::Count, agg::COUNT),
            Reduction::new(sales::QUANTITY, ReduceOp::Mean, agg::AVG_QUANTITY),
        ],
        None,
    )?;

    let keys = str_values(&grouped, sales::CUSTOMER_TYPE)?;
    let totals = f64_values(&grouped, agg::TOTAL)?;
    let means = f64_values(&grouped, agg::MEAN)?;
    let counts = u32_values(&grouped, agg::COUNT)?;
    let quantities = f64_values(&grouped, agg::AVG_QUANTITY)?;

    let mut rows: Vec<CustomerTypeStats> = keys
        .into_iter()
        .zip(totals)
        .zip(means)
        .zip(counts)
        .zip(quantities)
        .map(|((((key, total), mean), orders), qty)| CustomerTypeStats {
            customer_type: key.unwrap_or_default(),
            total: total.unwrap_or(0.0),
            mean: mean.unwrap_or(f64::NAN),
            orders: orders.unwrap_or(0),
            avg_quantity: qty.unwrap_or(f64::NAN),
        })
        .collect();

    rows.sort_by(|a, b| a.customer_type.cmp(&b.customer_type));
    Ok(rows)
}

/// Pivot the sum of `value` over (`row_key`, `col_key`).
///
/// Row and column labels are the sorted distinct observed values.
pub fn cross_tab(df: &DataFrame, row_key: &str, col_key: &str, value: &str) -> crate::Result<CrossTab> {
    let grouped = group_and_reduce(
        df,
        &[row_key, col_key],
        &[Reduction::new(value, ReduceOp::Sum, agg::TOTAL)],
        None,
    )?;

    let rows = str_values(&grouped, row_key)?;
    let cols = str_values(&grouped, col_key)?;
    let totals = f64_values(&grouped, agg::TOTAL)?;

    let row_labels: Vec<String> = rows.iter().flatten().cloned().collect::<BTreeSet<_>>().into_iter().collect();
    let col_labels: Vec<String> = cols.iter().flatten().cloned().collect::<BTreeSet<_>>().into_iter().collect();

    let row_index: HashMap<&str, usize> = row_labels.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();
    let col_index: HashMap<&str, usize> = col_labels.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();

    let mut values = Array2::<f64>::zeros((row_labels.len(), col_labels.len()));
    for ((r, c), total) in rows.iter().zip(cols.iter()).zip(totals) {
        if let (Some(r), Some(c)) = (r, c) {
            values[[row_index[r.as_str()], col_index[c.as_str()]]] += total.unwrap_or(0.0);
        }
    }

    Ok(CrossTab {
        row_labels,
        col_labels,
        values,
    })
}

/// Pearson correlation of every pair of `columns`.
///
/// Each pair uses the rows where both values are present. A column with
/// no variance yields NaN, including on its own diagonal entry.
pub fn correlation_matrix(df: &DataFrame, columns: &[&str]) -> crate::Result<CorrelationMatrix> {
    let n = columns.len();
    let mut values = Array2::<f64>::from_elem((n, n), f64::NAN);

    for i in 0..n {
        for j in i..n {
            let r = pearson(df, columns[i], columns[j])?;
            if i == j {
                values[[i, i]] = if r.is_nan() { f64::NAN } else { 1.0 };
            } else {
                values[[i, j]] = r;
                values[[j, i]] = r;
            }
        }
    }

    Ok(CorrelationMatrix {
        labels: columns.iter().map(|c| c.to_string()).collect(),
        values,
    })
}

/// Pearson coefficient of columns `x` and `y` over rows where both are
/// present. NaN with fewer than two pairs or a constant side.
pub fn pearson(df: &DataFrame, x: &str, y: &str) -> crate::Result<f64> {
    column(df, x)?;
    column(df, y)?;

    let stats = df
        .clone()
        .lazy()
        .select([
            col(x).cast(DataType::Float64).alias("x"),
            col(y).cast(DataType::Float64).alias("y"),
        ])
        .drop_nulls(None)
        .select([
            len().cast(DataType::Float64).alias("n"),
            col("x").std(1).alias("std_x"),
            col("y").std(1).alias("std_y"),
            pearson_corr(col("x"), col("y")).alias("r"),
        ])
        .collect()?;

    let pairs = scalar(&stats, "n")?.unwrap_or(0.0);
    let spread = |name: &str| -> crate::Result<bool> { Ok(scalar(&stats, name)?.is_some_and(|s| s > 0.0)) };
    if pairs < 2.0 || !spread("std_x")? || !spread("std_y")? {
        return Ok(f64::NAN);
    }

    Ok(scalar(&stats, "r")?.map_or(f64::NAN, |r| r.clamp(-1.0, 1.0)))
}

/// Fraction of repeat purchases per `key`, over known flags only.
pub fn repeat_rate_by(df: &DataFrame, key: &str) -> crate::Result<Vec<RepeatRate>> {
    column(df, sales::IS_REPEAT)?;

    let known = df
        .clone()
        .lazy()
        .filter(col(sales::IS_REPEAT).is_not_null())
        .collect()?;

    let grouped = group_and_reduce(
        &known,
        &[key],
        &[
            Reduction::new(sales::IS_REPEAT, ReduceOp::Mean, agg::RATE),
            Reduction::new(sales::IS_REPEAT, ReduceOp::Count, agg::COUNT),
        ],
        None,
    )?;

    let keys = str_values(&grouped, key)?;
    let rates = f64_values(&grouped, agg::RATE)?;
    let counts = u32_values(&grouped, agg::COUNT)?;

    let mut rows: Vec<RepeatRate> = keys
        .into_iter()
        .zip(rates)
        .zip(counts)
        .map(|((key, rate), known)| RepeatRate {
            key: key.unwrap_or_default(),
            rate: rate.unwrap_or(f64::NAN),
            known: known.unwrap_or(0),
        })
        .collect();

    rows.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(rows)
}

/// Products by total amount, best first, at most `top_n`.
pub fn product_ranking(df: &DataFrame, top_n: usize) -> crate::Result<Vec<ProductTotal>> {
    let grouped = group_and_reduce(
        df,
        &[sales::PRODUCT_NAME],
        &[Reduction::new(sales::TOTAL_AMOUNT, ReduceOp::Sum, agg::TOTAL)],
        Some(&Ranking::top(agg::TOTAL).with_limit(top_n)),
    )?;

    let names = str_values(&grouped, sales::PRODUCT_NAME)?;
    let totals = f64_values(&grouped, agg::TOTAL)?;

    Ok(names
        .into_iter()
        .zip(totals)
        .map(|(name, total)| ProductTotal {
            name: name.unwrap_or_default(),
            total: total.unwrap_or(0.0),
        })
        .collect())
}

/// Order count and total amount per product, best-selling first.
pub fn product_stats(df: &DataFrame) -> crate::Result<Vec<ProductStats>> {
    let grouped = group_and_reduce(
        df,
        &[sales::PRODUCT_NAME],
        &[
            Reduction::new(sales::PRODUCT_CATEGORY, ReduceOp::First, agg::CATEGORY),
            Reduction::new(sales::ORDER_ID, ReduceOp::Count, agg::COUNT),
            Reduction::new(sales::TOTAL_AMOUNT, ReduceOp::Sum, agg::TOTAL),
        ],
        Some(&Ranking::top(agg::TOTAL)),
    )?;

    let names = str_values(&grouped, sales::PRODUCT_NAME)?;
    let categories = str_values(&grouped, agg::CATEGORY)?;
    let counts = u32_values(&grouped, agg::COUNT)?;
    let totals = f64_values(&grouped, agg::TOTAL)?;

    Ok(names
        .into_iter()
        .zip(categories)
        .zip(counts)
        .zip(totals)
        .map(|(((name, category), count), total)| ProductStats {
            name: name.unwrap_or_default(),
            category: category.unwrap_or_default(),
            count: count.unwrap_or(0),
            total: total.unwrap_or(0.0),
        })
        .collect())
}

/// Product name → category lookup.
pub fn product_category_map(stats: &[ProductStats]) -> HashMap<String, String> {
    let mut map = HashMap::with_capacity(stats.len());
    for s in stats {
        map.entry(s.name.clone()).or_insert_with(|| s.category.clone());
    }
    map
}

/// Summary statistics of each numeric column.
///
/// Standard deviation is the sample one; quantiles interpolate linearly.
pub fn describe(df: &DataFrame, columns: &[&str]) -> crate::Result<Vec<NumericSummary>> {
    columns
        .iter()
        .map(|name| -> crate::Result<NumericSummary> {
            column(df, name)?;
            let values = col(*name).cast(DataType::Float64);

            let stats = df
                .clone()
                .lazy()
                .select([
                    values.clone().count().cast(DataType::Float64).alias("count"),
                    values.clone().mean().alias("mean"),
                    values.clone().std(1).alias("std"),
                    values.clone().min().alias("min"),
                    values.clone().quantile(lit(0.25), QuantileMethod::Linear).alias("q25"),
                    values.clone().quantile(lit(0.5), QuantileMethod::Linear).alias("median"),
                    values.clone().quantile(lit(0.75), QuantileMethod::Linear).alias("q75"),
                    values.max().alias("max"),
                ])
                .collect()?;

            let get = |field: &str| -> crate::Result<f64> { Ok(scalar(&stats, field)?.unwrap_or(f64::NAN)) };

            Ok(NumericSummary {
                column: name.to_string(),
                count: scalar(&stats, "count")?.unwrap_or(0.0) as usize,
                mean: get("mean")?,
                std: get("std")?,
                min: get("min")?,
                q25: get("q25")?,
                median: get("median")?,
                q75: get("q75")?,
                max: get("max")?,
            })
        })
        .collect()
}

/// Data type and null count of every column.
pub fn missing_values(df: &DataFrame) -> Vec<ColumnInfo> {
    df.get_columns()
        .iter()
        .map(|c| ColumnInfo {
            name: c.name().to_string(),
            dtype: c.dtype().to_string(),
            nulls: c.null_count(),
        })
        .collect()
}

/// Share of records whose repeat flag is unknown, in percent.
pub fn repeat_missing_ratio(df: &DataFrame) -> crate::Result<f64> {
    if df.height() == 0 {
        return Ok(0.0);
    }
    let nulls = column(df, sales::IS_REPEAT)?.null_count();
    Ok(nulls as f64 / df.height() as f64 * 100.0)
}

/// Record count and order-date range.
pub fn overview(df: &DataFrame) -> crate::Result<Overview> {
    column(df, sales::ORDER_DATE)?;

    let bounds = df
        .clone()
        .lazy()
        .select([
            col(sales::ORDER_DATE).min().dt().strftime("%Y-%m-%d").alias("first"),
            col(sales::ORDER_DATE).max().dt().strftime("%Y-%m-%d").alias("last"),
        ])
        .collect()?;

    let parse = |name: &str| -> crate::Result<NaiveDate> {
        let text = bounds
            .column(name)?
            .str()?
            .get(0)
            .ok_or_else(|| EdaError::EmptyDataset("no order dates".into()))?;
        Ok(NaiveDate::parse_from_str(text, "%Y-%m-%d")?)
    };

    Ok(Overview {
        records: df.height(),
        first_date: parse("first")?,
        last_date: parse("last")?,
    })
}

/// Grand totals plus the best category and product from earlier rankings.
pub fn headline(df: &DataFrame, categories: &[GroupStats], products: &[ProductTotal]) -> crate::Result<Headline> {
    let amounts: Vec<f64> = f64_values(df, sales::TOTAL_AMOUNT)?.into_iter().flatten().collect();
    let grand_total: f64 = amounts.iter().sum();
    let average_order = if amounts.is_empty() {
        0.0
    } else {
        grand_total / amounts.len() as f64
    };

    let unique_customers = str_values(df, sales::CUSTOMER_ID)?
        .into_iter()
        .flatten()
        .collect::<HashSet<_>>()
        .len();

    Ok(Headline {
        grand_total,
        orders: df.height(),
        average_order,
        unique_customers,
        top_category: categories.first().map(|c| c.key.clone()),
        top_product: products.first().map(|p| p.name.clone()),
    })
}

// ── Column extraction ───────────────────────────────────────────────────────

fn column<'a>(df: &'a DataFrame, name: &str) -> crate::Result<&'a Column> {
    df.column(name)
        .map_err(|_| EdaError::MissingColumn(name.to_string()).into())
}

fn f64_values(df: &DataFrame, name: &str) -> crate::Result<Vec<Option<f64>>> {
    let cast = column(df, name)?.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// First value of a one-row result column, as `f64`.
fn scalar(df: &DataFrame, name: &str) -> crate::Result<Option<f64>> {
    let cast = column(df, name)?.cast(&DataType::Float64)?;
    Ok(cast.f64()?.get(0))
}

fn u32_values(df: &DataFrame, name: &str) -> crate::Result<Vec<Option<u32>>> {
    let cast = column(df, name)?.cast(&DataType::UInt32)?;
    Ok(cast.u32()?.into_iter().collect())
}

fn str_values(df: &DataFrame, name: &str) -> crate::Result<Vec<Option<String>>> {
    let cast = column(df, name)?.cast(&DataType::String)?;
    Ok(cast.str()?.into_iter().map(|v| v.map(str::to_string)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_sales() -> DataFrame {
        df!(
            sales::ORDER_ID => ["1", "2", "3", "4", "5"],
            sales::ORDER_DATE => vec![
                date(2024, 1, 5),
                date(2024, 1, 20),
                date(2024, 2, 2),
                date(2024, 3, 9),
                date(2024, 3, 30),
            ],
            derived::MONTH => ["2024-01", "2024-01", "2024-02", "2024-03", "2024-03"],
            sales::PRODUCT_NAME => ["Scallop", "Wagyu", "Scallop", "Sake", "Melon"],
            sales::PRODUCT_CATEGORY => ["水産物", "畜産物", "水産物", "酒類", "農産物"],
            sales::CHANNEL => ["EC", "Store", "EC", "EC", "Store"],
            sales::CUSTOMER_ID => ["C1", "C2", "C1", "C3", "C2"],
            sales::CUSTOMER_TYPE => ["toC", "toB", "toC", "toB", "toB"],
            sales::REGION => ["Sapporo", "Hakodate", "Sapporo", "Kushiro", "Hakodate"],
            sales::QUANTITY => [1i64, 2, 3, 4, 5],
            sales::UNIT_PRICE => [100.0, 150.0, 100.0, 50.0, 80.0],
            sales::TOTAL_AMOUNT => [100.0, 300.0, 300.0, 200.0, 400.0],
            sales::IS_REPEAT => [Some(true), Some(false), Some(true), None, Some(true)],
        )
        .unwrap()
    }

    #[test]
    fn test_monthly_sales_covers_every_month_and_total() {
        let df = create_test_sales();
        let monthly = monthly_sales(&df).unwrap();

        assert_eq!(monthly.len(), 3);
        assert_eq!(monthly[0].month, "2024-01");
        assert_eq!(monthly[0].orders, 2);
        assert_eq!(monthly[2].total, 600.0);

        let sum: f64 = monthly.iter().map(|m| m.total).sum();
        assert_eq!(sum, 1300.0);
    }

    #[test]
    fn test_summarize_by_with_tie_is_lexicographic() {
        let df = df!(
            sales::PRODUCT_CATEGORY => ["X", "X", "Y"],
            sales::TOTAL_AMOUNT => [100.0, 200.0, 300.0],
        )
        .unwrap();

        let stats = summarize_by(&df, sales::PRODUCT_CATEGORY).unwrap();
        assert_eq!(
            stats,
            vec![
                GroupStats { key: "X".into(), total: 300.0, mean: 150.0, count: 2 },
                GroupStats { key: "Y".into(), total: 300.0, mean: 300.0, count: 1 },
            ]
        );

        // Reversed input order ranks the same way
        let reversed = df!(
            sales::PRODUCT_CATEGORY => ["Y", "X", "X"],
            sales::TOTAL_AMOUNT => [300.0, 200.0, 100.0],
        )
        .unwrap();
        let again = summarize_by(&reversed, sales::PRODUCT_CATEGORY).unwrap();
        assert_eq!(again[0].key, "X");
    }

    #[test]
    fn test_cross_tab_fills_missing_pairs_with_zero() {
        let df = create_test_sales();
        let table = cross_tab(&df, sales::PRODUCT_CATEGORY, sales::CUSTOMER_TYPE, sales::TOTAL_AMOUNT).unwrap();

        assert_eq!(table.col_labels, vec!["toB".to_string(), "toC".to_string()]);
        assert_eq!(table.row_labels.len(), 4);
        assert_eq!(table.get("水産物", "toC"), Some(400.0));
        assert_eq!(table.get("水産物", "toB"), Some(0.0));
        assert_eq!(table.get("畜産物", "toC"), Some(0.0));
        assert_eq!(table.get("unknown", "toC"), None);
    }

    #[test]
    fn test_correlation_matrix_is_symmetric_with_unit_diagonal() {
        let df = create_test_sales();
        let corr = correlation_matrix(&df, &sales::NUMERIC).unwrap();

        assert_eq!(corr.values.shape(), &[3, 3]);
        for i in 0..3 {
            assert_eq!(corr.values[[i, i]], 1.0);
            for j in 0..3 {
                assert_eq!(corr.values[[i, j]], corr.values[[j, i]]);
                assert!(corr.values[[i, j]].abs() <= 1.0);
            }
        }
    }

    #[test]
    fn test_pearson_known_values() {
        let df = df!(
            "x" => [Some(1.0), Some(2.0), Some(3.0), None],
            "up" => [Some(2.0), Some(4.0), Some(6.0), Some(100.0)],
            "down" => [3.0, 2.0, 1.0, -50.0],
            "flat" => [5.0, 5.0, 5.0, 5.0],
        )
        .unwrap();

        // The row with a missing x is ignored for every pair involving x
        assert!((pearson(&df, "x", "up").unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&df, "x", "down").unwrap() + 1.0).abs() < 1e-12);
        assert!(pearson(&df, "x", "flat").unwrap().is_nan());

        let corr = correlation_matrix(&df, &["x", "flat"]).unwrap();
        assert_eq!(corr.values[[0, 0]], 1.0);
        assert!(corr.values[[1, 1]].is_nan());
    }

    #[test]
    fn test_repeat_rate_excludes_unknown_flags() {
        let df = df!(
            sales::CUSTOMER_TYPE => ["toC", "toC", "toC", "toC"],
            sales::IS_REPEAT => [Some(true), Some(false), Some(true), None],
        )
        .unwrap();

        let rates = repeat_rate_by(&df, sales::CUSTOMER_TYPE).unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].known, 3);
        assert!((rates[0].rate - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_product_ranking_and_stats() {
        let df = create_test_sales();

        let top = product_ranking(&df, 2).unwrap();
        assert_eq!(top.len(), 2);
        // Melon and Scallop tie at 400; the key breaks the tie
        assert_eq!(top[0].name, "Melon");
        assert_eq!(top[1].name, "Scallop");
        assert_eq!(top[1].total, 400.0);

        let stats = product_stats(&df).unwrap();
        let scallop = stats.iter().find(|s| s.name == "Scallop").unwrap();
        assert_eq!(scallop.count, 2);
        assert_eq!(scallop.category, "水産物");

        let map = product_category_map(&stats);
        assert_eq!(map.get("Sake").map(String::as_str), Some("酒類"));
    }

    #[test]
    fn test_describe_quantiles() {
        let df = create_test_sales();
        let summary = describe(&df, &[sales::QUANTITY]).unwrap();

        let q = &summary[0];
        assert_eq!(q.count, 5);
        assert_eq!(q.mean, 3.0);
        assert_eq!(q.min, 1.0);
        assert_eq!(q.q25, 2.0);
        assert_eq!(q.median, 3.0);
        assert_eq!(q.max, 5.0);
        assert!((q.std - 2.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_overview_and_headline() {
        let df = create_test_sales();

        let ov = overview(&df).unwrap();
        assert_eq!(ov.records, 5);
        assert_eq!(ov.first_date, date(2024, 1, 5));
        assert_eq!(ov.last_date, date(2024, 3, 30));

        let categories = summarize_by(&df, sales::PRODUCT_CATEGORY).unwrap();
        let products = product_ranking(&df, 10).unwrap();
        let head = headline(&df, &categories, &products).unwrap();

        assert_eq!(head.grand_total, 1300.0);
        assert_eq!(head.unique_customers, 3);
        assert_eq!(head.average_order, 260.0);
        assert_eq!(head.top_category.as_deref(), Some("水産物"));
    }

    #[test]
    fn test_missing_values_and_ratio() {
        let df = create_test_sales();
        let info = missing_values(&df);
        let repeat = info.iter().find(|c| c.name == sales::IS_REPEAT).unwrap();
        assert_eq!(repeat.nulls, 1);
        assert_eq!(repeat_missing_ratio(&df).unwrap(), 20.0);
    }

    #[test]
    fn test_unknown_group_key_is_schema_error() {
        let df = create_test_sales();
        let err = summarize_by(&df, "warehouse").unwrap_err();
        assert!(matches!(err.downcast_ref::<EdaError>(), Some(EdaError::MissingColumn(_))));
    }
}
