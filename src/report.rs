//! Plain-text report tables
//!
//! Every writer takes any `std::io::Write`; the binary passes a locked
//! stdout, tests pass a `Vec<u8>`.

use std::io::Write;

use unicode_width::UnicodeWidthStr;

use crate::aggregate::{
    ColumnInfo, CorrelationMatrix, CrossTab, CustomerTypeStats, GroupStats, Headline, MonthlySales,
    NumericSummary, Overview, ProductStats, ProductTotal, RepeatRate,
};

const RULE_WIDTH: usize = 60;

/// Section banner: a rule, the title, another rule.
pub fn banner<W: Write>(out: &mut W, title: &str) -> crate::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "\n{}", rule)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", rule)?;
    Ok(())
}

/// Sub-heading within a section.
pub fn heading<W: Write>(out: &mut W, title: &str) -> crate::Result<()> {
    writeln!(out, "\n[{}]", title)?;
    Ok(())
}

pub fn write_overview<W: Write>(out: &mut W, overview: &Overview) -> crate::Result<()> {
    writeln!(out, "Records: {}", overview.records)?;
    writeln!(out, "Period:  {} .. {}", overview.first_date, overview.last_date)?;
    Ok(())
}

pub fn write_customer_table<W: Write>(out: &mut W, rows: usize, columns: &[String]) -> crate::Result<()> {
    writeln!(out, "Customers: {}", rows)?;
    writeln!(out, "Columns:   {}", columns.join(", "))?;
    Ok(())
}

/// `describe()`-style block, one column per numeric field.
pub fn write_describe<W: Write>(out: &mut W, summaries: &[NumericSummary]) -> crate::Result<()> {
    write!(out, "{:<8}", "")?;
    for s in summaries {
        write!(out, " {}", right(&s.column, 14))?;
    }
    writeln!(out)?;

    let rows: [(&str, fn(&NumericSummary) -> f64); 8] = [
        ("count", |s| s.count as f64),
        ("mean", |s| s.mean),
        ("std", |s| s.std),
        ("min", |s| s.min),
        ("25%", |s| s.q25),
        ("50%", |s| s.median),
        ("75%", |s| s.q75),
        ("max", |s| s.max),
    ];

    for (label, pick) in rows {
        write!(out, "{:<8}", label)?;
        for s in summaries {
            write!(out, " {:>14.2}", pick(s))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Column types and null counts.
pub fn write_column_info<W: Write>(out: &mut W, columns: &[ColumnInfo], repeat_missing_pct: f64) -> crate::Result<()> {
    writeln!(out, "{:<18} | {:<10} | {:>6}", "column", "dtype", "nulls")?;
    writeln!(out, "{}", "-".repeat(40))?;
    for c in columns {
        writeln!(out, "{} | {} | {:>6}", left(&c.name, 18), left(&c.dtype, 10), c.nulls)?;
    }
    writeln!(out, "\nis_repeat missing: {:.1}%", repeat_missing_pct)?;
    Ok(())
}

pub fn write_monthly<W: Write>(out: &mut W, rows: &[MonthlySales]) -> crate::Result<()> {
    writeln!(out, "{:<8} | {:>14} | {:>11}", "month", "total_amount", "order_count")?;
    writeln!(out, "{}", "-".repeat(39))?;
    for r in rows {
        writeln!(out, "{:<8} | {:>14.0} | {:>11}", r.month, r.total, r.orders)?;
    }
    Ok(())
}

/// Total / mean / count per group, amounts rounded to whole yen.
pub fn write_group_stats<W: Write>(out: &mut W, key_header: &str, rows: &[GroupStats]) -> crate::Result<()> {
    writeln!(out, "{} | {:>14} | {:>10} | {:>6}", left(key_header, 16), "total", "avg", "count")?;
    writeln!(out, "{}", "-".repeat(56))?;
    for r in rows {
        writeln!(out, "{} | {:>14.0} | {:>10.0} | {:>6}", left(&r.key, 16), r.total, r.mean, r.count)?;
    }
    Ok(())
}

pub fn write_customer_types<W: Write>(out: &mut W, rows: &[CustomerTypeStats]) -> crate::Result<()> {
    writeln!(
        out,
        "{:<14} | {:>14} | {:>10} | {:>11} | {:>12}",
        "customer_type", "total_sales", "avg_sales", "order_count", "avg_quantity"
    )?;
    writeln!(out, "{}", "-".repeat(72))?;
    for r in rows {
        writeln!(
            out,
            "{} | {:>14.0} | {:>10.0} | {:>11} | {:>12.0}",
            left(&r.customer_type, 14),
            r.total, r.mean, r.orders, r.avg_quantity
        )?;
    }
    Ok(())
}

/// Matrix with row labels down the side and column labels across.
pub fn write_cross_tab<W: Write>(out: &mut W, table: &CrossTab) -> crate::Result<()> {
    write!(out, "{:<16}", "")?;
    for c in &table.col_labels {
        write!(out, " {}", right(c, 14))?;
    }
    writeln!(out)?;

    for (r, label) in table.row_labels.iter().enumerate() {
        write!(out, "{}", left(label, 16))?;
        for value in table.values.row(r) {
            write!(out, " {:>14.0}", value)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Coefficients rounded to three places.
pub fn write_correlation<W: Write>(out: &mut W, matrix: &CorrelationMatrix) -> crate::Result<()> {
    write!(out, "{:<14}", "")?;
    for label in &matrix.labels {
        write!(out, " {:>13}", label)?;
    }
    writeln!(out)?;

    for (i, label) in matrix.labels.iter().enumerate() {
        write!(out, "{:<14}", label)?;
        for value in matrix.values.row(i) {
            write!(out, " {:>13.3}", value)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_product_ranking<W: Write>(out: &mut W, products: &[ProductTotal]) -> crate::Result<()> {
    for (rank, p) in products.iter().enumerate() {
        writeln!(out, "{:>2}. {} {:>14.0}", rank + 1, left(&p.name, 24), p.total)?;
    }
    Ok(())
}

pub fn write_repeat_rates<W: Write>(out: &mut W, rates: &[RepeatRate]) -> crate::Result<()> {
    writeln!(out, "{:<14} | {:>6} | {:>6}", "customer_type", "rate", "known")?;
    writeln!(out, "{}", "-".repeat(32))?;
    for r in rates {
        writeln!(out, "{} | {:>6.3} | {:>6}", left(&r.key, 14), r.rate, r.known)?;
    }
    Ok(())
}

pub fn write_headline<W: Write>(out: &mut W, headline: &Headline) -> crate::Result<()> {
    writeln!(out, "Total sales:         {} JPY", thousands(headline.grand_total))?;
    writeln!(out, "Total orders:        {}", headline.orders)?;
    writeln!(out, "Average order value: {} JPY", thousands(headline.average_order))?;
    writeln!(out, "Unique customers:    {}", headline.unique_customers)?;
    writeln!(out, "Top category:        {}", headline.top_category.as_deref().unwrap_or("-"))?;
    writeln!(out, "Top product:         {}", headline.top_product.as_deref().unwrap_or("-"))?;
    Ok(())
}

/// Per-product statistics used by the word clouds.
pub fn write_product_stats<W: Write>(out: &mut W, stats: &[ProductStats]) -> crate::Result<()> {
    writeln!(out, "{:<24} | {:<10} | {:>6} | {:>14}", "product_name", "category", "count", "total_sales")?;
    writeln!(out, "{}", "-".repeat(64))?;
    for s in stats {
        writeln!(
            out,
            "{} | {} | {:>6} | {:>14.0}",
            left(&s.name, 24),
            left(&s.category, 10),
            s.count,
            s.total
        )?;
    }
    Ok(())
}

/// Pad `text` on the right to `width` terminal columns. CJK characters
/// occupy two columns each.
fn left(text: &str, width: usize) -> String {
    format!("{}{}", text, " ".repeat(width.saturating_sub(text.width())))
}

/// Pad `text` on the left to `width` terminal columns.
fn right(text: &str, width: usize) -> String {
    format!("{}{}", " ".repeat(width.saturating_sub(text.width())), text)
}

/// Whole-number amount with comma thousands separators.
pub fn thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> crate::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_banner() {
        let text = render(|out| banner(out, "3. Monthly sales"));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "=".repeat(60));
        assert_eq!(lines[2], "3. Monthly sales");
        assert_eq!(lines[3], "=".repeat(60));
    }

    #[test]
    fn test_group_stats_rounds_amounts() {
        let rows = vec![GroupStats { key: "EC".into(), total: 1234.6, mean: 617.3, count: 2 }];
        let text = render(|out| write_group_stats(out, "channel", &rows));
        assert!(text.contains("1235"));
        assert!(text.contains("617"));
        assert!(text.lines().last().unwrap().trim_end().ends_with('2'));
    }

    #[test]
    fn test_cross_tab_prints_zero_cells() {
        let table = CrossTab {
            row_labels: vec!["Aquatic".into()],
            col_labels: vec!["toB".into(), "toC".into()],
            values: array![[0.0, 500.0]],
        };
        let text = render(|out| write_cross_tab(out, &table));
        let row = text.lines().nth(1).unwrap();
        let cells: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(cells, vec!["Aquatic", "0", "500"]);
    }

    #[test]
    fn test_correlation_three_places() {
        let matrix = CorrelationMatrix {
            labels: vec!["a".into(), "b".into()],
            values: array![[1.0, 0.123456], [0.123456, 1.0]],
        };
        let text = render(|out| write_correlation(out, &matrix));
        assert!(text.contains("0.123"));
        assert!(!text.contains("0.1235"));
        assert!(text.contains("1.000"));
    }

    #[test]
    fn test_headline_without_rankings() {
        let headline = Headline {
            grand_total: 1_234_567.4,
            orders: 3,
            average_order: 411_522.5,
            unique_customers: 2,
            top_category: None,
            top_product: Some("Scallop".into()),
        };
        let text = render(|out| write_headline(out, &headline));
        assert!(text.contains("1,234,567 JPY"));
        assert!(text.contains("Top category:        -"));
        assert!(text.contains("Scallop"));
    }

    #[test]
    fn test_wide_labels_stay_aligned() {
        assert_eq!(left("札幌", 6), "札幌  ");
        assert_eq!(right("toB", 5), "  toB");

        let rows = vec![
            GroupStats { key: "水産物".into(), total: 400.0, mean: 200.0, count: 2 },
            GroupStats { key: "EC".into(), total: 300.0, mean: 300.0, count: 1 },
        ];
        let text = render(|out| write_group_stats(out, "category", &rows));
        let bars: Vec<usize> = text
            .lines()
            .filter(|l| l.contains('|'))
            .map(|l| l[..l.find('|').unwrap()].width())
            .collect();
        assert_eq!(bars, vec![17, 17, 17]);
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0.0), "0");
        assert_eq!(thousands(999.0), "999");
        assert_eq!(thousands(1000.0), "1,000");
        assert_eq!(thousands(-1234567.0), "-1,234,567");
    }
}
