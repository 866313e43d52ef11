//! Diagnose command - show what the text layer of each PDF looks like.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;

use recibo_core::invoice::diagnostics::{diagnose_with, era, Diagnosis, ANCHOR_KEYWORDS};
use recibo_core::invoice::LayoutClassifier;
use recibo_core::models::config::ReciboConfig;
use recibo_core::{PdfExtractor, PdfProcessor};

use super::load_config;

/// Arguments for the diagnose command.
#[derive(Args)]
pub struct DiagnoseArgs {
    /// PDF files to inspect
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print one JSON object per file instead of the readable summary
    #[arg(long)]
    json: bool,
}

pub async fn run(args: DiagnoseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let classifier = LayoutClassifier::with_markers(config.classifier.clone());

    for path in &args.files {
        let text = match read_text(path, &config) {
            Ok(text) => text,
            Err(e) => {
                println!(
                    "{} Can't read {}: {}",
                    style("✗").red(),
                    path.display(),
                    e
                );
                continue;
            }
        };

        let diagnosis = diagnose_with(&text, &classifier, config.pdf.min_text_length);

        if args.json {
            let mut value = serde_json::to_value(&diagnosis)?;
            value["file"] = serde_json::Value::String(path.display().to_string());
            println!("{}", serde_json::to_string(&value)?);
        } else {
            print_diagnosis(path, &diagnosis);
        }
    }

    Ok(())
}

fn read_text(path: &Path, config: &ReciboConfig) -> anyhow::Result<String> {
    let data = fs::read(path)?;
    let mut pdf = PdfExtractor::new();
    pdf.load(&data)?;
    Ok(pdf.extract_content(&config.pdf)?.text())
}

fn print_diagnosis(path: &Path, diagnosis: &Diagnosis) {
    println!("{}", style(path.display()).bold());

    if diagnosis.is_scanned {
        println!(
            "  {} {} characters of text, looks scanned (needs OCR)",
            style("⚠").yellow(),
            diagnosis.char_count
        );
    } else {
        println!(
            "  {} {} characters of text",
            style("✓").green(),
            diagnosis.char_count
        );
    }

    println!("  First lines:");
    for (i, line) in diagnosis.preview.iter().enumerate() {
        println!("    L{:02}: {}", i + 1, line);
    }

    println!("  Keywords:");
    for keyword in ANCHOR_KEYWORDS.iter() {
        let hits: Vec<_> = diagnosis.hits_for(keyword).collect();
        if hits.is_empty() {
            println!("    {:<8} {}", keyword, style("not found").dim());
            continue;
        }
        for hit in hits {
            let marker = if hit.has_digits { "#" } else { " " };
            println!("    {:<8} L{:02} {} {}", keyword, hit.line, marker, hit.text);
        }
    }

    println!(
        "  Verdict: {} ({})",
        style(diagnosis.model).cyan(),
        era(diagnosis.model)
    );
    println!();
}
