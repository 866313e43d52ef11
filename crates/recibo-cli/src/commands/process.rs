//! Process command - extract fields from a single invoice file.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use recibo_core::{Column, Report};

use super::{load_config, render_report, Engine, Extractor, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Extraction engine
    #[arg(long, value_enum, default_value = "heuristic")]
    engine: Engine,

    /// Comma-separated report columns (default: configured order)
    #[arg(long)]
    columns: Option<String>,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let columns = match &args.columns {
        Some(list) => Column::parse_list(list)?,
        None => config.report.columns.clone(),
    };

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Extracting {}", args.input.display()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let mut extractor = Extractor::new(args.engine, &config)?;
    let result = extractor.extract(&args.input).await;

    pb.finish_and_clear();

    if let Some(error) = result.error() {
        eprintln!("{} {}: {}", style("✗").red(), result.filename(), error);
    }

    let report = Report::assemble(columns, [&result]);
    let output = render_report(&report, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    info!("Completed in {:?}", start.elapsed());
    Ok(())
}
