//! Common regex patterns for utility invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Retro-era period marker: "OCT-2001"
    pub static ref MONTH_YEAR_TOKEN: Regex = Regex::new(
        r"(?i)\b(ENE|FEB|MAR|ABR|MAY|JUN|JUL|AGO|SEP|SET|OCT|NOV|DIC)-(\d{4})\b"
    ).unwrap();

    // "24-Abr-23", "24 de abril de 2023", "24/ABR/2023"
    pub static ref DATE_DAY_MONTH_NAME: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\s*(?:[-/.]|\s)\s*(?:de\s+)?([a-zá-ú]{3,10})\.?\s*(?:[-/.]|\s)\s*(?:de\s+)?(\d{4}|\d{2})\b"
    ).unwrap();

    // "24/04/2023", "24-04-2023", "24.04.2023"
    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,2})\s*[-/.]\s*(\d{1,2})\s*[-/.]\s*(\d{4})\b"
    ).unwrap();

    // "OCT-2001", "ABRIL 2023", "abril de 2023"
    pub static ref DATE_MONTH_NAME_YEAR: Regex = Regex::new(
        r"(?i)\b([a-zá-ú]{3,10})\.?\s*[-/ ]\s*(?:de\s+)?(\d{4})\b"
    ).unwrap();

    // Maximal digit/separator run containing at least one digit
    pub static ref AMOUNT_RUN: Regex = Regex::new(
        r"[\d.,]*\d[\d.,]*"
    ).unwrap();

    // Currency-prefixed token, tolerating OCR letters inside the number
    pub static ref CURRENCY_TOKEN: Regex = Regex::new(
        r"\$\s*([0-9SOBsob][0-9SOBsob.,]*)"
    ).unwrap();

    // Policy (contract) number, printed on every layout
    pub static ref POLICY_NUMBER: Regex = Regex::new(
        r"(?i)\bP[OÓ]LIZA\b\D{0,20}?(\d[\d-]{2,}\d)"
    ).unwrap();

    // Retro invoice number: 4+ digit run shortly after "FACTURA"/"REF"
    pub static ref RETRO_INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)\b(?:FACTURA|REF(?:ERENCIA)?)\b\D{0,20}?(\d{4,})"
    ).unwrap();

    // Legacy surcharge lines
    pub static ref LIGHTING_TAX: Regex = Regex::new(
        r"(?i)IMPUESTO\s+(?:DE\s+)?ALUMBRADO\s+P[UÚ]BLICO[^\d\n]*?([\d.,]*\d[\d.,]*)"
    ).unwrap();

    pub static ref LATE_INTEREST: Regex = Regex::new(
        r"(?i)INTERESES\s+(?:DE\s+)?MORA[^\d\n]*?([\d.,]*\d[\d.,]*)"
    ).unwrap();

    // Identifier-looking token: optional letter prefix, then digits
    pub static ref IDENTIFIER: Regex = Regex::new(
        r"(?i)\b([A-Z]{1,4}[\s-]?\d{3,}|\d{3,}(?:-\d+)?)\b"
    ).unwrap();

    // "No.", "Nro", "N°", "#" in front of a number
    pub static ref NUMBER_PREFIX: Regex = Regex::new(
        r"(?i)^(?:N[O°º]\.?|NRO\.?|NUM(?:ERO)?\.?|#)\s*:?\s*"
    ).unwrap();

    // Column gap in layout-preserving text
    pub static ref COLUMN_GAP: Regex = Regex::new(
        r"\s{2,}"
    ).unwrap();
}
