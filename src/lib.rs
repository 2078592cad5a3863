//! TallyForge: a Rust CLI application for exploratory analysis of retail sales
//!
//! This library loads sales and customer CSVs with Polars, computes grouped
//! breakdowns, prints them as text tables and renders charts and product
//! word clouds with Plotters.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod palette;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod viz;
pub mod wordcloud;

// Re-export public items for easier access
pub use cli::{Args, Command};
pub use config::Config;
pub use data::{load_dataset, load_sales, SalesData};
pub use error::EdaError;
pub use pipeline::{run_eda, run_wordcloud};
pub use viz::Renderer;

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
