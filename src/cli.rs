//! Command-line interface definitions and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

/// Sales EDA report generator: aggregate tables, charts and word clouds
///
/// Runs with no arguments using `tallyforge.toml` (if present) or the
/// built-in defaults.
///
/// Examples:
///   tallyforge
///   tallyforge eda --sales data/raw/sales.csv --output-dir outputs
///   tallyforge wordcloud --font "Noto Sans CJK JP"
///   tallyforge config > tallyforge.toml
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Which report to run (default: both)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Path to the sales CSV file
    #[arg(long, value_name = "FILE", global = true, env = "TALLYFORGE_SALES")]
    pub sales: Option<PathBuf>,

    /// Path to the customers CSV file
    #[arg(long, value_name = "FILE", global = true, env = "TALLYFORGE_CUSTOMERS")]
    pub customers: Option<PathBuf>,

    /// Directory the chart images are written to
    #[arg(short, long, value_name = "DIR", global = true)]
    pub output_dir: Option<PathBuf>,

    /// Font family used for chart text
    #[arg(long, value_name = "FAMILY", global = true)]
    pub font: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Report pipelines.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Descriptive statistics, breakdowns and charts 01-06
    Eda,
    /// Product word clouds colored by category (chart 07)
    Wordcloud,
    /// Run both pipelines
    All,
    /// Print the default configuration file and exit
    Config,
}

impl Args {
    /// Selected pipeline; no subcommand means all of them.
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::All)
    }

    /// Log level implied by the verbosity flag.
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_runs_everything() {
        let args = Args::parse_from(["tallyforge"]);
        assert_eq!(args.command(), Command::All);
        assert_eq!(args.log_level(), Level::INFO);
    }

    #[test]
    fn test_subcommand_with_global_flags() {
        let args = Args::parse_from([
            "tallyforge",
            "wordcloud",
            "--output-dir",
            "/tmp/out",
            "--font",
            "Noto Sans CJK JP",
            "-v",
        ]);

        assert_eq!(args.command(), Command::Wordcloud);
        assert_eq!(args.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(args.font.as_deref(), Some("Noto Sans CJK JP"));
        assert_eq!(args.log_level(), Level::DEBUG);
    }

    #[test]
    fn test_config_subcommand() {
        let args = Args::parse_from(["tallyforge", "config"]);
        assert_eq!(args.command(), Command::Config);
    }
}
