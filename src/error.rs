use thiserror::Error;

/// Domain failures raised by the loader, aggregator and renderers.
///
/// Everything else (I/O, polars, plotting backends) travels as
/// `anyhow::Error` with context attached at the call site.
#[derive(Error, Debug)]
pub enum EdaError {
    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),

    #[error("Nothing to draw for chart: {0}")]
    EmptyChart(String),

    #[error("Word cloud needs at least one positive frequency")]
    EmptyFrequencies,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
