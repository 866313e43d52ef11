//! PDF text extraction using lopdf and pdf-extract.

use std::cell::OnceCell;

use lopdf::Document;
use tracing::{debug, trace};

use super::{collapse_whitespace, PdfProcessor, Result, TextMode};
use crate::error::PdfError;

/// PDF text extractor using lopdf, with pdf-extract as a fallback.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    full_text: OnceCell<std::result::Result<String, String>>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            full_text: OnceCell::new(),
        }
    }

    /// Whole-document text from pdf-extract, computed once per loaded document.
    fn full_text(&self) -> Result<&str> {
        self.full_text
            .get_or_init(|| {
                pdf_extract::extract_text_from_mem(&self.raw_data).map_err(|e| e.to_string())
            })
            .as_deref()
            .map_err(|e| PdfError::TextExtraction(e.clone()))
    }

    /// Approximate a page slice of the pdf-extract output by line count.
    fn fallback_page_text(&self, page: u32) -> Result<String> {
        let full_text = self.full_text()?;
        let lines: Vec<&str> = full_text.lines().collect();
        let page_count = self.page_count() as usize;

        if page_count <= 1 {
            return Ok(full_text.to_string());
        }

        let lines_per_page = lines.len().div_ceil(page_count);
        let start = ((page - 1) as usize) * lines_per_page;
        let end = (page as usize) * lines_per_page;

        Ok(lines[start.min(lines.len())..end.min(lines.len())].join("\n"))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        self.full_text = OnceCell::new();
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_page_text(&self, page: u32, mode: TextMode) -> Result<String> {
        let doc = self
            .document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))?;

        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }

        let text = match doc.extract_text(&[page]) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                trace!("lopdf returned no text for page {}, trying pdf-extract", page);
                self.fallback_page_text(page)?
            }
            Err(e) => {
                trace!("lopdf failed on page {}: {}, trying pdf-extract", page, e);
                self.fallback_page_text(page)?
            }
        };

        Ok(match mode {
            TextMode::Layout => text,
            TextMode::Plain => collapse_whitespace(&text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
    }

    #[test]
    fn test_load_rejects_non_pdf_bytes() {
        let mut extractor = PdfExtractor::new();
        assert!(matches!(
            extractor.load(b"definitely not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }

    #[test]
    fn test_page_text_without_document() {
        let extractor = PdfExtractor::new();
        assert!(extractor.extract_page_text(1, TextMode::Layout).is_err());
    }
}
