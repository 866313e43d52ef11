//! 2023 invoices with hybrid labeling.

use super::{invoice_number, text_value, DocumentText, ModelStrategy};
use crate::invoice::rules::{next_line, normalize_date_opt, same_line, same_line_amount};
use crate::models::record::{InvoiceRecord, LayoutModel};

const INVOICE_NUMBER: &[&str] = &["FACTURA DE SERVICIOS NO."];
const BILLED_PERIOD: &[&str] = &["PERIODO FACTURADO"];
const PAY_BY: &[&str] = &["PAGUE HASTA"];
const ADDRESSEE: &[&str] = &["SEÑOR(A)"];
const PERIOD_TOTAL: &[&str] = &["TOTAL FACTURA SERVICIOS DEL PERIODO"];
const TOTAL_DUE: &[&str] = &["TOTAL A PAGAR"];
const LIGHTING_TAX: &[&str] = &["IMPUESTO DE ALUMBRADO PUBLICO", "ALUMBRADO PUBLICO"];
const LATE_INTEREST: &[&str] = &["INTERESES DE MORA", "INTERESES MORA"];

/// Same-line labels, with the customer printed under the addressee line.
pub struct TransitionalStrategy;

impl TransitionalStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TransitionalStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelStrategy for TransitionalStrategy {
    fn model(&self) -> LayoutModel {
        LayoutModel::Transitional
    }

    fn extract(&self, doc: &DocumentText<'_>, record: &mut InvoiceRecord) {
        let lines = &doc.lines;

        record.invoice_number = invoice_number(same_line(lines, INVOICE_NUMBER));
        record.billing_period = normalize_date_opt(same_line(lines, BILLED_PERIOD));
        record.due_date = normalize_date_opt(same_line(lines, PAY_BY));
        record.customer_name = text_value(next_line(lines, ADDRESSEE));

        record.monthly_amount = same_line_amount(lines, PERIOD_TOTAL).unwrap_or(0.0);
        record.total_due = same_line_amount(lines, TOTAL_DUE).unwrap_or(0.0);
        record.lighting_tax = same_line_amount(lines, LIGHTING_TAX).unwrap_or(0.0);
        record.late_interest = same_line_amount(lines, LATE_INTEREST).unwrap_or(0.0);
    }
}
