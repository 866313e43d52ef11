//! Data models: invoice records and pipeline configuration.

pub mod config;
pub mod record;

pub use config::{
    ClassifierMarkers, ExtractionConfig, LegacyMonthlyPolicy, PdfConfig, ReaderConfig,
    ReciboConfig, ReportConfig,
};
pub use record::{DateValue, DocumentResult, InvoiceRecord, LayoutModel};
