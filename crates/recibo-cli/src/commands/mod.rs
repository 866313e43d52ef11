//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod diagnose;
pub mod process;

use std::fs;
use std::path::Path;
use std::time::Instant;

use recibo_core::models::config::ReciboConfig;
use recibo_core::reader::{read_with_fallback, Pacer};
use recibo_core::{DocumentPipeline, DocumentResult, PdfExtractor, Report};
use tracing::debug;

use crate::reader_client::GeminiReader;

/// Extraction engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Engine {
    /// Layout classification and per-layout rules
    Heuristic,
    /// Hosted language model with ordered fallback
    Reader,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array of objects
    Json,
    /// CSV with literal field-name headers
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

/// Load configuration from `-c`, else the default path when it exists.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ReciboConfig> {
    let config = match config_path {
        Some(path) => ReciboConfig::from_file(Path::new(path))?,
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                debug!("Using config at {}", default_path.display());
                ReciboConfig::from_file(&default_path)?
            } else {
                ReciboConfig::default()
            }
        }
    };
    config.validate()?;
    Ok(config)
}

/// Runs documents through either engine, pacing reader calls.
pub struct Extractor {
    engine: Engine,
    pipeline: DocumentPipeline,
    reader: Option<GeminiReader>,
    models: Vec<String>,
    pacer: Pacer,
}

impl Extractor {
    pub fn new(engine: Engine, config: &ReciboConfig) -> anyhow::Result<Self> {
        let reader = match engine {
            Engine::Reader => Some(GeminiReader::from_config(&config.reader)?),
            Engine::Heuristic => None,
        };

        Ok(Self {
            engine,
            pipeline: DocumentPipeline::from_config(config),
            reader,
            models: config.reader.models.clone(),
            pacer: Pacer::from_millis(config.reader.min_delay_ms),
        })
    }

    /// Extract one file. Unreadable input becomes a failed row.
    pub async fn extract(&mut self, path: &Path) -> DocumentResult {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                return DocumentResult::Failed {
                    filename,
                    error: e.to_string(),
                };
            }
        };

        match (self.engine, &self.reader) {
            (Engine::Reader, Some(reader)) => {
                let wait = self.pacer.wait_time(Instant::now());
                if !wait.is_zero() {
                    debug!("Pacing reader calls: waiting {:?}", wait);
                    tokio::time::sleep(wait).await;
                }
                self.pacer.mark(Instant::now());
                DocumentResult::Extracted(
                    read_with_fallback(reader, &self.models, &data, &filename).await,
                )
            }
            _ => self
                .pipeline
                .process(&mut PdfExtractor::new(), &filename, &data),
        }
    }
}

/// Render a report in the requested format.
pub fn render_report(report: &Report, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(report.headers())?;
            for row in &report.rows {
                wtr.write_record(row.iter().map(|cell| cell.to_field()))?;
            }
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => {
            let width = report
                .headers()
                .iter()
                .map(|h| h.len())
                .max()
                .unwrap_or(0);
            let mut output = String::new();
            for row in &report.rows {
                for (header, cell) in report.headers().iter().zip(row) {
                    output.push_str(&format!("{:width$}  {}\n", header, cell.to_field()));
                }
                output.push('\n');
            }
            Ok(output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recibo_core::{Column, InvoiceRecord};

    fn sample_report() -> Report {
        let mut record = InvoiceRecord::new("a.pdf");
        record.customer_name = Some("PEREZ, ANA".to_string());
        record.total_due = 125000.0;
        let rows = vec![
            DocumentResult::Extracted(record),
            DocumentResult::Failed {
                filename: "b.pdf".to_string(),
                error: "PDF has no pages".to_string(),
            },
        ];
        Report::assemble(
            vec![Column::Filename, Column::CustomerName, Column::TotalDue, Column::Error],
            &rows,
        )
    }

    #[test]
    fn test_render_csv() {
        let csv = render_report(&sample_report(), OutputFormat::Csv).unwrap();
        assert_eq!(
            csv,
            "filename,customer_name,total_due,error\n\
             a.pdf,\"PEREZ, ANA\",125000,\n\
             b.pdf,,,PDF has no pages\n"
        );
    }

    #[test]
    fn test_render_json() {
        let json = render_report(&sample_report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[1]["error"], "PDF has no pages");
        assert!(value[1]["total_due"].is_null());
        assert_eq!(value[0]["total_due"], 125000.0);
    }
}
