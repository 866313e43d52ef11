//! Invoice record data model.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ExtractionError;

/// Invoice template era/format a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutModel {
    /// 2024-2025 electronic invoice with authentication code and QR.
    Electronic,
    /// 2023 hybrid labeling.
    Transitional,
    /// 2017-2020 plain text, values printed below their labels.
    Legacy,
    /// Pre-2003 scanned invoice with `MMM-YYYY` date markers.
    Retro,
    /// Summary-of-balance document rather than a single invoice.
    AccountStatement,
}

impl LayoutModel {
    /// All models in classification priority order.
    pub const ALL: [LayoutModel; 5] = [
        LayoutModel::AccountStatement,
        LayoutModel::Electronic,
        LayoutModel::Transitional,
        LayoutModel::Retro,
        LayoutModel::Legacy,
    ];

    /// Report label for this model.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electronic => "ELECTRONIC",
            Self::Transitional => "TRANSITIONAL",
            Self::Legacy => "LEGACY",
            Self::Retro => "RETRO",
            Self::AccountStatement => "ACCOUNT_STATEMENT",
        }
    }
}

impl fmt::Display for LayoutModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutModel {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| ExtractionError::Parse {
                field: "model".to_string(),
                value: s.to_string(),
            })
    }
}

/// A date field: normalized when a known pattern matched, raw text otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValue {
    /// Normalized calendar date.
    Date(NaiveDate),
    /// Unrecognized text, kept as low-confidence data.
    Raw(String),
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Raw(s) => f.write_str(s),
        }
    }
}

impl Serialize for DateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            Ok(d) => Self::Date(d),
            Err(_) => Self::Raw(s),
        })
    }
}

/// Billing fields extracted from one source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Source file name.
    pub filename: String,

    /// Detected layout model. `None` for rows produced by the reader path.
    pub model: Option<LayoutModel>,

    /// Month the consumption charges cover.
    pub billing_period: Option<DateValue>,

    /// Payment due date.
    pub due_date: Option<DateValue>,

    /// Invoice number.
    pub invoice_number: Option<String>,

    /// Customer name.
    pub customer_name: Option<String>,

    /// Policy (account/contract) number, digits only.
    pub policy_number: Option<String>,

    /// Monthly service amount.
    #[serde(default)]
    pub monthly_amount: f64,

    /// Total amount due.
    #[serde(default)]
    pub total_due: f64,

    /// Public-lighting tax.
    #[serde(default)]
    pub lighting_tax: f64,

    /// Late-payment interest.
    #[serde(default)]
    pub late_interest: f64,
}

impl InvoiceRecord {
    /// Create an empty record for a file with every field at its default.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            model: None,
            billing_period: None,
            due_date: None,
            invoice_number: None,
            customer_name: None,
            policy_number: None,
            monthly_amount: 0.0,
            total_due: 0.0,
            lighting_tax: 0.0,
            late_interest: 0.0,
        }
    }

    /// Names of text fields that are still empty, for warnings.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.invoice_number.is_none() {
            missing.push("invoice_number");
        }
        if self.billing_period.is_none() {
            missing.push("billing_period");
        }
        if self.due_date.is_none() {
            missing.push("due_date");
        }
        if self.customer_name.is_none() {
            missing.push("customer_name");
        }
        if self.policy_number.is_none() {
            missing.push("policy_number");
        }
        if self.total_due == 0.0 {
            missing.push("total_due");
        }
        missing
    }
}

/// Outcome of processing one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentResult {
    /// Fields were extracted (possibly all defaults).
    Extracted(InvoiceRecord),
    /// The document could not be read; only the file name and error survive.
    Failed { filename: String, error: String },
}

impl DocumentResult {
    /// Source file name.
    pub fn filename(&self) -> &str {
        match self {
            Self::Extracted(record) => &record.filename,
            Self::Failed { filename, .. } => filename,
        }
    }

    /// The extracted record, if any.
    pub fn record(&self) -> Option<&InvoiceRecord> {
        match self {
            Self::Extracted(record) => Some(record),
            Self::Failed { .. } => None,
        }
    }

    /// The error message, if processing failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Extracted(_) => None,
            Self::Failed { error, .. } => Some(error),
        }
    }
}
