//! TallyForge: sales EDA report generator
//!
//! This is the main entrypoint that loads configuration, reads the input
//! tables and runs the selected report pipelines.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::time::Instant;
use tallyforge::{load_dataset, run_eda, run_wordcloud, Args, Command, Config, Renderer};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    init_logging(&args)?;
    info!("TallyForge v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if args.command() == Command::Config {
        print!("{}", Config::default_toml()?);
        return Ok(());
    }

    let mut config = Config::load(args.config.as_deref())?;
    config.merge_with_args(&args);
    config.validate()?;

    run(&args, &config)
}

/// Initialize logging based on verbosity settings; `RUST_LOG` wins.
fn init_logging(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

/// Load the tables once and run the selected pipelines in order.
fn run(args: &Args, config: &Config) -> Result<()> {
    let start_time = Instant::now();

    info!(sales = %config.input.sales.display(), customers = %config.input.customers.display(), "Loading data");
    let data = load_dataset(&config.input)?;
    let renderer = Renderer::new(config.output.clone())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.command() {
        Command::Eda => {
            run_eda(&data, &renderer, &config.report, &mut out)?;
        }
        Command::Wordcloud => {
            run_wordcloud(&data, &renderer, &config.wordcloud, &mut out)?;
        }
        Command::All => {
            run_eda(&data, &renderer, &config.report, &mut out)?;
            run_wordcloud(&data, &renderer, &config.wordcloud, &mut out)?;
        }
        // printed before any data is loaded
        Command::Config => {}
    }

    out.flush()?;
    info!(
        elapsed = %format!("{:.2}s", start_time.elapsed().as_secs_f64()),
        output = %renderer.output_dir().display(),
        "Done"
    );
    Ok(())
}
