//! PDF processing module.

mod extractor;
mod tables;

pub use extractor::PdfExtractor;
pub use tables::{tables_from_text, PageTable};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Text extraction mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMode {
    /// Keep the whitespace that approximates visual column positions.
    #[default]
    Layout,
    /// Collapse runs of whitespace inside each line.
    Plain,
}

/// Extracted content from a PDF.
#[derive(Debug, Clone, Default)]
pub struct PdfContent {
    /// Pages with their content.
    pub pages: Vec<PdfPage>,
}

/// Content from a single PDF page.
#[derive(Debug, Clone, Default)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Extracted text from this page.
    pub text: String,
    /// Tables found on this page.
    pub tables: Vec<PageTable>,
}

impl PdfContent {
    /// Concatenated text of all pages.
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// All tables across pages, in page order.
    pub fn tables(&self) -> Vec<&PageTable> {
        self.pages.iter().flat_map(|p| p.tables.iter()).collect()
    }
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32, mode: TextMode) -> Result<String>;

    /// Extract tables from a specific page.
    fn extract_tables(&self, page: u32) -> Result<Vec<PageTable>> {
        Ok(tables_from_text(&self.extract_page_text(page, TextMode::Layout)?))
    }

    /// Gather text and tables of every page into a [`PdfContent`].
    fn extract_content(&self, options: &PdfConfig) -> Result<PdfContent> {
        let page_count = self.page_count();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        let last = match options.max_pages {
            0 => page_count,
            max => page_count.min(max as u32),
        };

        let mut pages = Vec::with_capacity(last as usize);
        for number in 1..=last {
            let text = self
                .extract_page_text(number, options.text_mode)
                .unwrap_or_else(|e| {
                    warn!("Failed to extract text from page {}: {}", number, e);
                    String::new()
                });

            let tables = if options.extract_tables {
                self.extract_tables(number).unwrap_or_default()
            } else {
                Vec::new()
            };

            pages.push(PdfPage { number, text, tables });
        }

        debug!("Extracted {} of {} pages", pages.len(), page_count);
        Ok(PdfContent { pages })
    }
}

/// Collapse whitespace runs inside each line, keeping line breaks.
pub fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TextPages(Vec<&'static str>);

    impl PdfProcessor for TextPages {
        fn load(&mut self, _data: &[u8]) -> Result<()> {
            Ok(())
        }

        fn page_count(&self) -> u32 {
            self.0.len() as u32
        }

        fn extract_page_text(&self, page: u32, _mode: TextMode) -> Result<String> {
            self.0
                .get(page as usize - 1)
                .map(|t| t.to_string())
                .ok_or(PdfError::InvalidPage(page))
        }
    }

    #[test]
    fn test_extract_content_joins_pages() {
        let pdf = TextPages(vec!["uno", "", "TOTAL A PAGAR      $ 10.000"]);
        let content = pdf.extract_content(&PdfConfig::default()).unwrap();

        assert_eq!(content.pages.len(), 3);
        assert_eq!(content.text(), "uno\nTOTAL A PAGAR      $ 10.000");
        assert_eq!(content.tables().len(), 1);
    }

    #[test]
    fn test_extract_content_respects_max_pages() {
        let pdf = TextPages(vec!["a", "b", "c"]);
        let options = PdfConfig {
            max_pages: 2,
            ..PdfConfig::default()
        };
        assert_eq!(pdf.extract_content(&options).unwrap().pages.len(), 2);
    }

    #[test]
    fn test_no_pages_is_an_error() {
        let pdf = TextPages(vec![]);
        assert!(matches!(
            pdf.extract_content(&PdfConfig::default()),
            Err(PdfError::NoPages)
        ));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a    b\n  c  "), "a b\nc");
    }
}
