//! Account statements: accumulated balance rather than a single period.

use super::{text_value, DocumentText, ModelStrategy};
use crate::invoice::rules::{next_line, normalize_date_opt, same_line, same_line_amount};
use crate::models::record::{InvoiceRecord, LayoutModel};

const TOTAL_DUE: &[&str] = &["SALDO TOTAL", "TOTAL A PAGAR"];
const PERIOD_VALUE: &[&str] = &["VALOR DEL PERIODO"];
const CUT_OFF_DATE: &[&str] = &["FECHA DE CORTE"];
const PAY_BY: &[&str] = &["PAGUE HASTA"];
const NAME: &[&str] = &["NOMBRE:"];
const ADDRESSEE: &[&str] = &["SEÑOR(A)"];
const LATE_INTEREST: &[&str] = &["INTERESES DE MORA"];

/// Balance summary documents. They carry no invoice number.
pub struct StatementStrategy;

impl StatementStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StatementStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelStrategy for StatementStrategy {
    fn model(&self) -> LayoutModel {
        LayoutModel::AccountStatement
    }

    fn extract(&self, doc: &DocumentText<'_>, record: &mut InvoiceRecord) {
        let lines = &doc.lines;

        record.billing_period = normalize_date_opt(same_line(lines, CUT_OFF_DATE));
        record.due_date = normalize_date_opt(same_line(lines, PAY_BY));
        record.customer_name =
            text_value(same_line(lines, NAME).or_else(|| next_line(lines, ADDRESSEE)));

        record.monthly_amount = same_line_amount(lines, PERIOD_VALUE).unwrap_or(0.0);
        record.total_due = same_line_amount(lines, TOTAL_DUE).unwrap_or(0.0);
        record.late_interest = same_line_amount(lines, LATE_INTEREST).unwrap_or(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extracts_statement_fields() {
        let text = "\
ESTADO DE CUENTA
NOMBRE: ANA LUCIA TORRES        POLIZA 5566778
FECHA DE CORTE: 30/06/2022
PAGUE HASTA: 15-Jul-22
VALOR DEL PERIODO $ 75.000
INTERESES DE MORA $ 3.420
SALDO TOTAL $ 1.250.300
";
        let doc = DocumentText::new(text, vec![]);
        let mut record = InvoiceRecord::new("s.pdf");
        StatementStrategy::new().extract(&doc, &mut record);

        assert_eq!(record.invoice_number, None);
        assert_eq!(record.customer_name.as_deref(), Some("ANA LUCIA TORRES"));
        assert_eq!(record.billing_period.unwrap().to_string(), "2022-06-30");
        assert_eq!(record.due_date.unwrap().to_string(), "2022-07-15");
        assert_eq!(record.monthly_amount, 75000.0);
        assert_eq!(record.late_interest, 3420.0);
        assert_eq!(record.total_due, 1250300.0);
    }

    #[test]
    fn test_customer_from_addressee_line() {
        let doc = DocumentText::new("ESTADO DE CUENTA\nSEÑOR(A)\nPEDRO DIAZ", vec![]);
        let mut record = InvoiceRecord::new("s.pdf");
        StatementStrategy::new().extract(&doc, &mut record);

        assert_eq!(record.customer_name.as_deref(), Some("PEDRO DIAZ"));
    }
}
