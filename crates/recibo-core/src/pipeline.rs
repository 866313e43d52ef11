//! Per-document pipeline: PDF collaborator, then the invoice parser.
//!
//! Documents are processed one after another with no shared state. A
//! document the PDF collaborator cannot read becomes a failed row and the
//! batch moves on.

use tracing::{info, warn};

use crate::error::PdfError;
use crate::invoice::{ExtractionResult, InvoiceParser};
use crate::models::config::{PdfConfig, ReciboConfig};
use crate::models::record::DocumentResult;
use crate::pdf::PdfProcessor;

/// Runs documents through extraction.
pub struct DocumentPipeline {
    parser: InvoiceParser,
    pdf: PdfConfig,
}

impl DocumentPipeline {
    /// Create a pipeline with default settings.
    pub fn new() -> Self {
        Self::from_config(&ReciboConfig::default())
    }

    /// Create a pipeline from configuration.
    pub fn from_config(config: &ReciboConfig) -> Self {
        Self {
            parser: InvoiceParser::from_config(config),
            pdf: config.pdf.clone(),
        }
    }

    /// Load, extract and parse one document.
    pub fn run<P: PdfProcessor>(
        &self,
        processor: &mut P,
        filename: &str,
        data: &[u8],
    ) -> Result<ExtractionResult, PdfError> {
        processor.load(data)?;
        let content = processor.extract_content(&self.pdf)?;
        Ok(self.parser.parse_content(filename, &content))
    }

    /// Process one document, turning collaborator failures into a failed row.
    pub fn process<P: PdfProcessor>(
        &self,
        processor: &mut P,
        filename: &str,
        data: &[u8],
    ) -> DocumentResult {
        match self.run(processor, filename, data) {
            Ok(result) => {
                for warning in &result.warnings {
                    warn!("{}: {}", filename, warning);
                }
                DocumentResult::Extracted(result.record)
            }
            Err(e) => {
                warn!("Could not read {}: {}", filename, e);
                DocumentResult::Failed {
                    filename: filename.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Process documents in order with a fresh processor for each.
    pub fn process_batch<'a, P, I, F>(&self, documents: I, mut new_processor: F) -> Vec<DocumentResult>
    where
        P: PdfProcessor,
        I: IntoIterator<Item = (&'a str, &'a [u8])>,
        F: FnMut() -> P,
    {
        let results: Vec<DocumentResult> = documents
            .into_iter()
            .map(|(filename, data)| self.process(&mut new_processor(), filename, data))
            .collect();

        let failed = results.iter().filter(|r| r.error().is_some()).count();
        info!(
            "Processed {} documents ({} failed)",
            results.len(),
            failed
        );
        results
    }
}

impl Default for DocumentPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::LayoutModel;
    use crate::pdf::TextMode;
    use crate::report::{Cell, Column, Report};
    use pretty_assertions::assert_eq;

    /// Treats the bytes as page text; bytes starting with `BAD` fail to load.
    #[derive(Default)]
    struct FakePdf {
        text: Option<String>,
    }

    impl PdfProcessor for FakePdf {
        fn load(&mut self, data: &[u8]) -> crate::pdf::Result<()> {
            if data.starts_with(b"BAD") {
                return Err(PdfError::Parse("invalid file header".to_string()));
            }
            self.text = Some(String::from_utf8_lossy(data).into_owned());
            Ok(())
        }

        fn page_count(&self) -> u32 {
            u32::from(self.text.is_some())
        }

        fn extract_page_text(&self, page: u32, _mode: TextMode) -> crate::pdf::Result<String> {
            self.text.clone().ok_or(PdfError::InvalidPage(page))
        }
    }

    const ELECTRONIC: &str = "\
FACTURA ELECTRONICA DE VENTA No. FE 1001
CUFE: 3b1f0c9e77aa
NOMBRE DEL CLIENTE: MARIA GOMEZ
TOTAL FACTURA A PAGAR $ 125.000
";

    const LEGACY: &str = "\
SEÑOR(A)
JOSE LUIS MARTINEZ
Total a Pagar .......... $ 450.000
";

    #[test]
    fn test_batch_with_unreadable_document() {
        let documents: Vec<(&str, &[u8])> = vec![
            ("a.pdf", ELECTRONIC.as_bytes()),
            ("broken.pdf", &b"BAD bytes"[..]),
            ("c.pdf", LEGACY.as_bytes()),
        ];
        let results = DocumentPipeline::new().process_batch(documents, FakePdf::default);

        assert_eq!(results.len(), 3);
        assert_eq!(
            results[1],
            DocumentResult::Failed {
                filename: "broken.pdf".to_string(),
                error: "failed to parse PDF: invalid file header".to_string(),
            }
        );

        let first = results[0].record().unwrap();
        assert_eq!(first.model, Some(LayoutModel::Electronic));
        assert_eq!(first.total_due, 125000.0);

        let third = results[2].record().unwrap();
        assert_eq!(third.model, Some(LayoutModel::Legacy));
        assert_eq!(third.monthly_amount, 450000.0);

        let report = Report::assemble(Column::DEFAULT_ORDER.to_vec(), &results);
        let broken = &report.rows[1];
        assert_eq!(broken[0], Cell::Text("broken.pdf".to_string()));
        assert!(matches!(broken[Column::DEFAULT_ORDER.len() - 1], Cell::Text(_)));
        assert!(broken[1..Column::DEFAULT_ORDER.len() - 1]
            .iter()
            .all(|cell| *cell == Cell::Null));
    }

    #[test]
    fn test_no_pages_is_a_failed_row() {
        struct Empty;
        impl PdfProcessor for Empty {
            fn load(&mut self, _data: &[u8]) -> crate::pdf::Result<()> {
                Ok(())
            }
            fn page_count(&self) -> u32 {
                0
            }
            fn extract_page_text(&self, page: u32, _mode: TextMode) -> crate::pdf::Result<String> {
                Err(PdfError::InvalidPage(page))
            }
        }

        let result = DocumentPipeline::new().process(&mut Empty, "empty.pdf", b"");
        assert_eq!(result.error(), Some("PDF has no pages"));
    }
}
