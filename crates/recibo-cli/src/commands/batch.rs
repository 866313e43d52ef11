//! Batch command - extract many invoices into one report.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use recibo_core::{Column, DocumentResult, Report};

use super::{load_config, render_report, Engine, Extractor, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input PDFs (e.g. "facturas/*.pdf")
    #[arg(required = true)]
    input: String,

    /// Output directory (default: current directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Extraction engine
    #[arg(long, value_enum, default_value = "heuristic")]
    engine: Engine,

    /// Comma-separated report columns (default: configured order)
    #[arg(long)]
    columns: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let columns = match &args.columns {
        Some(list) => Column::parse_list(list)?,
        None => config.report.columns.clone(),
    };

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let output_dir = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // One document at a time; reader calls are paced inside the extractor.
    let mut extractor = Extractor::new(args.engine, &config)?;
    let mut results = Vec::with_capacity(files.len());
    for path in &files {
        let result = extractor.extract(path).await;
        if let Some(error) = result.error() {
            warn!("Failed to process {}: {}", path.display(), error);
        }
        results.push(result);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let report = Report::assemble(columns, &results);
    let report_path = output_dir.join(format!("report.{}", args.format.extension()));
    fs::write(&report_path, render_report(&report, args.format)?)?;
    debug!("Wrote report to {}", report_path.display());

    let failed: Vec<&DocumentResult> = results.iter().filter(|r| r.error().is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!("  Successful: {}", results.len() - failed.len());
    println!("  Failed: {}", failed.len());

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.filename(),
                result.error().unwrap_or_default()
            );
        }
    }

    println!(
        "{} Report written to {}",
        style("✓").green(),
        report_path.display()
    );

    Ok(())
}
