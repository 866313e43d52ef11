//! Invoice parser: classify, dispatch to the layout strategy, then apply
//! the rules shared by every layout.

use std::time::Instant;

use tracing::{debug, info};

use super::classifier::LayoutClassifier;
use super::rules::{digits_only, POLICY_NUMBER};
use super::strategies::{strategy_for, DocumentText};
use crate::models::config::{ExtractionConfig, ReciboConfig};
use crate::models::record::{InvoiceRecord, LayoutModel};
use crate::pdf::{PageTable, PdfContent};

/// Result of invoice extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted record.
    pub record: InvoiceRecord,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Heuristic parser over extracted document text.
pub struct InvoiceParser {
    classifier: LayoutClassifier,
    extraction: ExtractionConfig,
    /// Texts shorter than this are flagged as likely scans.
    min_text_length: usize,
}

impl InvoiceParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&ReciboConfig::default())
    }

    /// Create a parser from the pipeline configuration.
    pub fn from_config(config: &ReciboConfig) -> Self {
        Self {
            classifier: LayoutClassifier::with_markers(config.classifier.clone()),
            extraction: config.extraction.clone(),
            min_text_length: config.pdf.min_text_length,
        }
    }

    /// Set extraction options.
    pub fn with_extraction(mut self, extraction: ExtractionConfig) -> Self {
        self.extraction = extraction;
        self
    }

    /// Parse extracted PDF content.
    pub fn parse_content(&self, filename: &str, content: &PdfContent) -> ExtractionResult {
        let text = content.text();
        self.parse_with_tables(filename, &text, content.tables())
    }

    /// Parse plain text.
    pub fn parse(&self, filename: &str, text: &str) -> ExtractionResult {
        self.parse_with_tables(filename, text, Vec::new())
    }

    fn parse_with_tables(
        &self,
        filename: &str,
        text: &str,
        tables: Vec<&PageTable>,
    ) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        info!("Parsing {} from {} characters of text", filename, text.len());

        let char_count = text.trim().chars().count();
        if char_count < self.min_text_length {
            warnings.push(format!(
                "Only {} characters of text; the document may be a scan",
                char_count
            ));
        }

        let model = self.classifier.classify(text);
        let doc = DocumentText::new(text, tables);

        let mut record = InvoiceRecord::new(filename);
        record.model = Some(model);
        strategy_for(model, &self.extraction).extract(&doc, &mut record);
        record.policy_number = POLICY_NUMBER
            .captures(text)
            .and_then(|caps| digits_only(&caps[1]));

        for field in record.missing_fields() {
            if model == LayoutModel::AccountStatement && field == "invoice_number" {
                continue;
            }
            warnings.push(format!("Could not extract {}", field));
        }

        debug!(
            "Extracted {} as {} with {} warnings",
            filename,
            model,
            warnings.len()
        );

        ExtractionResult {
            record,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

impl Default for InvoiceParser {
    fn default() -> Self {
        Self::new()
    }
}
