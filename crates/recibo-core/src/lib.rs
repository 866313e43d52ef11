//! Core library for utility invoice extraction.
//!
//! This crate provides:
//! - PDF processing (per-page text and whitespace-column tables)
//! - Layout classification across the 2001-2025 invoice templates
//! - Per-layout field extraction (invoice number, dates, amounts, policy)
//! - Money and date normalization for Latin-American formats
//! - Report assembly with a fixed column order
//! - An optional language-model reader path with ordered model fallback

pub mod error;
pub mod models;
pub mod pdf;
pub mod invoice;
pub mod pipeline;
pub mod reader;
pub mod report;

pub use error::{ReciboError, Result};
pub use models::record::{DateValue, DocumentResult, InvoiceRecord, LayoutModel};
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor, TextMode};
pub use invoice::{classify, ExtractionResult, InvoiceParser};
pub use pipeline::DocumentPipeline;
pub use reader::{InvoiceReader, Pacer};
pub use report::{Cell, Column, Report, ReportRow};
