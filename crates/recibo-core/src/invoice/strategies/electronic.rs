//! 2024-2025 electronic invoices.

use super::{invoice_number, text_value, DocumentText, ModelStrategy};
use crate::invoice::rules::normalize_date_opt;
use crate::models::record::{InvoiceRecord, LayoutModel};

const INVOICE_NUMBER: &[&str] = &["FACTURA ELECTRONICA DE VENTA", "FACTURA NO."];
const ISSUE_DATE: &[&str] = &["FECHA DE EXPEDICION"];
const PAY_BY: &[&str] = &["PAGUE HASTA"];
const CLIENT_NAME: &[&str] = &["NOMBRE DEL CLIENTE:"];
const PERIOD_TOTAL: &[&str] = &["TOTAL FACTURA SERVICIOS DEL PERIODO"];
const TOTAL_DUE: &[&str] = &["TOTAL FACTURA A PAGAR"];
const LIGHTING_TAX: &[&str] = &["IMPUESTO DE ALUMBRADO PUBLICO"];
const LATE_INTEREST: &[&str] = &["INTERESES DE MORA"];

/// Grid-layout invoices carrying an authentication code.
pub struct ElectronicStrategy;

impl ElectronicStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ElectronicStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelStrategy for ElectronicStrategy {
    fn model(&self) -> LayoutModel {
        LayoutModel::Electronic
    }

    fn extract(&self, doc: &DocumentText<'_>, record: &mut InvoiceRecord) {
        record.invoice_number = invoice_number(doc.line_or_cell(INVOICE_NUMBER));
        record.billing_period = normalize_date_opt(doc.line_or_cell(ISSUE_DATE));
        record.due_date = normalize_date_opt(doc.line_or_cell(PAY_BY));
        record.customer_name = text_value(doc.line_or_cell(CLIENT_NAME));

        record.monthly_amount = doc.amount_line_or_cell(PERIOD_TOTAL).unwrap_or(0.0);
        record.total_due = doc.amount_line_or_cell(TOTAL_DUE).unwrap_or(0.0);
        record.lighting_tax = doc.amount_line_or_cell(LIGHTING_TAX).unwrap_or(0.0);
        record.late_interest = doc.amount_line_or_cell(LATE_INTEREST).unwrap_or(0.0);
    }
}
