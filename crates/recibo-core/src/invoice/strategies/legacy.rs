//! 2017-2020 plain-text invoices.
//!
//! Header values sit in a row under their labels, and the total line is
//! padded with dots and stray tokens, so amounts are found by scanning the
//! line from the right.

use regex::Regex;

use super::{invoice_number, text_value, DocumentText, ModelStrategy};
use crate::invoice::rules::{
    below_label, horizontal_amount, next_line, normalize_amount, normalize_date_opt,
    LATE_INTEREST, LIGHTING_TAX,
};
use crate::models::config::{ExtractionConfig, LegacyMonthlyPolicy};
use crate::models::record::{InvoiceRecord, LayoutModel};

const INVOICE_NUMBER: &[&str] = &["FACTURA DE SERVICIOS NO."];
const BILLED_PERIOD: &[&str] = &["PERIODO FACTURADO"];
const PAY_BY: &[&str] = &["PAGUE HASTA"];
const ADDRESSEE: &[&str] = &["SEÑOR(A)"];
const TOTAL_DUE: &[&str] = &["TOTAL A PAGAR"];
const CURRENT_PERIOD: &[&str] = &["TOTAL SERVICIOS DEL PERIODO", "VALOR DEL PERIODO"];

/// Below-label headers and a right-to-left total scan.
pub struct LegacyStrategy {
    config: ExtractionConfig,
}

impl LegacyStrategy {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }
}

impl Default for LegacyStrategy {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

fn global_amount(pattern: &Regex, text: &str) -> f64 {
    pattern
        .captures(text)
        .map(|caps| normalize_amount(&caps[1]))
        .unwrap_or(0.0)
}

impl ModelStrategy for LegacyStrategy {
    fn model(&self) -> LayoutModel {
        LayoutModel::Legacy
    }

    fn extract(&self, doc: &DocumentText<'_>, record: &mut InvoiceRecord) {
        let lines = &doc.lines;
        let min = self.config.legacy_min_amount;

        record.invoice_number = invoice_number(below_label(lines, INVOICE_NUMBER));
        record.billing_period = normalize_date_opt(below_label(lines, BILLED_PERIOD));
        record.due_date = normalize_date_opt(below_label(lines, PAY_BY));
        record.customer_name = text_value(next_line(lines, ADDRESSEE));

        record.total_due = horizontal_amount(lines, TOTAL_DUE, min).unwrap_or(0.0);
        record.monthly_amount = match self.config.legacy_monthly {
            LegacyMonthlyPolicy::SameAsTotal => record.total_due,
            LegacyMonthlyPolicy::CurrentPeriod => {
                horizontal_amount(lines, CURRENT_PERIOD, min).unwrap_or(0.0)
            }
        };

        record.lighting_tax = global_amount(&LIGHTING_TAX, doc.text);
        record.late_interest = global_amount(&LATE_INTEREST, doc.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
EMPRESA DE SERVICIOS PUBLICOS
FACTURA DE SERVICIOS No.        PERIODO FACTURADO      PAGUE HASTA
4455102                         MARZO 2019             15/04/2019
SEÑOR(A)
JOSE LUIS MARTINEZ
VALOR DEL PERIODO ......... $ 310.000
IMPUESTO ALUMBRADO PUBLICO BQ ........ $ 12.500
INTERESES DE MORA .... $ 2.150
Total a Pagar .......... $ 450.000
";

    fn extract(config: ExtractionConfig) -> InvoiceRecord {
        let doc = DocumentText::new(SAMPLE, vec![]);
        let mut record = InvoiceRecord::new("l.pdf");
        LegacyStrategy::new(config).extract(&doc, &mut record);
        record
    }

    #[test]
    fn test_extracts_legacy_fields() {
        let record = extract(ExtractionConfig::default());

        assert_eq!(record.invoice_number.as_deref(), Some("4455102"));
        assert_eq!(record.billing_period.unwrap().to_string(), "2019-03-01");
        assert_eq!(record.due_date.unwrap().to_string(), "2019-04-15");
        assert_eq!(record.customer_name.as_deref(), Some("JOSE LUIS MARTINEZ"));
        assert_eq!(record.total_due, 450000.0);
        assert_eq!(record.monthly_amount, 450000.0);
        assert_eq!(record.lighting_tax, 12500.0);
        assert_eq!(record.late_interest, 2150.0);
    }

    #[test]
    fn test_current_period_policy() {
        let record = extract(ExtractionConfig {
            legacy_monthly: LegacyMonthlyPolicy::CurrentPeriod,
            ..ExtractionConfig::default()
        });

        assert_eq!(record.monthly_amount, 310000.0);
        assert_eq!(record.total_due, 450000.0);
    }

    #[test]
    fn test_current_period_policy_without_line() {
        let doc = DocumentText::new("Total a Pagar .......... $ 450.000", vec![]);
        let mut record = InvoiceRecord::new("l.pdf");
        let config = ExtractionConfig {
            legacy_monthly: LegacyMonthlyPolicy::CurrentPeriod,
            ..ExtractionConfig::default()
        };
        LegacyStrategy::new(config).extract(&doc, &mut record);

        assert_eq!(record.monthly_amount, 0.0);
        assert_eq!(record.total_due, 450000.0);
    }
}
