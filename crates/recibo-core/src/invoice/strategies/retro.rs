//! Pre-2003 scanned invoices.
//!
//! OCR noise makes line lookups unreliable here, so every field comes from a
//! pattern over the whole document. The total is the largest currency amount
//! found, which can also pick up a reference number printed with separators.

use super::{DocumentText, ModelStrategy};
use crate::invoice::rules::{
    largest_currency_amount, FieldExtractor, MonthYearExtractor, RETRO_INVOICE_NUMBER,
};
use crate::models::record::{DateValue, InvoiceRecord, LayoutModel};

/// Whole-document patterns for noisy scans.
pub struct RetroStrategy {
    periods: MonthYearExtractor,
}

impl RetroStrategy {
    pub fn new() -> Self {
        Self {
            periods: MonthYearExtractor::new(),
        }
    }
}

impl Default for RetroStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelStrategy for RetroStrategy {
    fn model(&self) -> LayoutModel {
        LayoutModel::Retro
    }

    fn extract(&self, doc: &DocumentText<'_>, record: &mut InvoiceRecord) {
        record.invoice_number = RETRO_INVOICE_NUMBER
            .captures(doc.text)
            .map(|caps| caps[1].to_string());
        record.billing_period = self.periods.extract(doc.text).map(DateValue::Date);

        let largest = largest_currency_amount(doc.text);
        record.monthly_amount = largest;
        record.total_due = largest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extracts_retro_fields() {
        let text = "\
EMPRESA MUNICIPAL  FACTURA N0 12 REF. 884512
PERIODO OCT-2001   VENCE NOV-2001
CONSUMO  $ 18.4OO
TOTAL    $ 2S.300
";
        let doc = DocumentText::new(text, vec![]);
        let mut record = InvoiceRecord::new("r.pdf");
        RetroStrategy::new().extract(&doc, &mut record);

        assert_eq!(record.invoice_number.as_deref(), Some("884512"));
        assert_eq!(record.billing_period.unwrap().to_string(), "2001-10-01");
        assert_eq!(record.total_due, 25300.0);
        assert_eq!(record.monthly_amount, 25300.0);
        assert_eq!(record.due_date, None);
        assert_eq!(record.customer_name, None);
        assert_eq!(record.lighting_tax, 0.0);
    }
}
