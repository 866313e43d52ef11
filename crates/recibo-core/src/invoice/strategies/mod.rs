//! Per-layout field extraction strategies.
//!
//! Each layout model prints the same billing fields under different labels
//! and in different positions. A strategy knows where its layout puts them
//! and fills an [`InvoiceRecord`] from the document text. Fields it cannot
//! find keep their defaults.

mod electronic;
mod legacy;
mod retro;
mod statement;
mod transitional;

pub use electronic::ElectronicStrategy;
pub use legacy::LegacyStrategy;
pub use retro::RetroStrategy;
pub use statement::StatementStrategy;
pub use transitional::TransitionalStrategy;

use super::rules::{clean_identifier, normalize_amount, same_line, same_line_amount, table_cell};
use crate::models::config::ExtractionConfig;
use crate::models::record::{InvoiceRecord, LayoutModel};
use crate::pdf::PageTable;

/// Document text prepared for label lookups.
pub struct DocumentText<'a> {
    /// Full text, pages joined.
    pub text: &'a str,
    /// Text split into lines.
    pub lines: Vec<&'a str>,
    /// Tables from every page.
    pub tables: Vec<&'a PageTable>,
}

impl<'a> DocumentText<'a> {
    pub fn new(text: &'a str, tables: Vec<&'a PageTable>) -> Self {
        Self {
            text,
            lines: text.lines().collect(),
            tables,
        }
    }

    /// Text after a label on its line, else the matching table cell.
    pub fn line_or_cell(&self, labels: &[&str]) -> Option<String> {
        same_line(&self.lines, labels).or_else(|| table_cell(&self.tables, labels))
    }

    /// Amount after a label on its line, else the matching table cell.
    pub fn amount_line_or_cell(&self, labels: &[&str]) -> Option<f64> {
        same_line_amount(&self.lines, labels).or_else(|| {
            table_cell(&self.tables, labels)
                .map(|cell| normalize_amount(&cell))
                .filter(|v| *v > 0.0)
        })
    }
}

/// Extraction rules for one layout model.
pub trait ModelStrategy {
    /// The model this strategy handles.
    fn model(&self) -> LayoutModel;

    /// Fill the record's fields from the document.
    fn extract(&self, doc: &DocumentText<'_>, record: &mut InvoiceRecord);
}

/// Select the strategy for a classified model.
pub fn strategy_for(model: LayoutModel, config: &ExtractionConfig) -> Box<dyn ModelStrategy> {
    match model {
        LayoutModel::Electronic => Box::new(ElectronicStrategy::new()),
        LayoutModel::Transitional => Box::new(TransitionalStrategy::new()),
        LayoutModel::Legacy => Box::new(LegacyStrategy::new(config.clone())),
        LayoutModel::Retro => Box::new(RetroStrategy::new()),
        LayoutModel::AccountStatement => Box::new(StatementStrategy::new()),
    }
}

/// Trimmed, non-empty text.
fn text_value(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// First identifier-looking token of a raw invoice number.
fn invoice_number(raw: Option<String>) -> Option<String> {
    raw.as_deref().and_then(clean_identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_for_every_model() {
        let config = ExtractionConfig::default();
        for model in LayoutModel::ALL {
            assert_eq!(strategy_for(model, &config).model(), model);
        }
    }

    #[test]
    fn test_amount_falls_back_to_table() {
        let table = PageTable::new(vec![vec![
            Some("TOTAL FACTURA A PAGAR".to_string()),
            Some("$ 98.700".to_string()),
        ]]);
        let doc = DocumentText::new("sin montos", vec![&table]);
        assert_eq!(doc.amount_line_or_cell(&["TOTAL FACTURA A PAGAR"]), Some(98700.0));
    }
}
