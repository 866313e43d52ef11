//! Report assembly with a caller-specified column order.
//!
//! Rows are structural: every row has exactly the report's columns, in
//! order, with `null` wherever the source has no value. Rows are neither
//! sorted, deduplicated nor aggregated.

use std::fmt;
use std::str::FromStr;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ExtractionError;
use crate::models::record::DocumentResult;

/// A report column. Headers are the literal field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Filename,
    Model,
    BillingPeriod,
    DueDate,
    InvoiceNumber,
    CustomerName,
    PolicyNumber,
    MonthlyAmount,
    TotalDue,
    LightingTax,
    LateInterest,
    Error,
}

impl Column {
    /// Record fields in report order, then the error marker.
    pub const DEFAULT_ORDER: [Column; 12] = [
        Column::Filename,
        Column::Model,
        Column::BillingPeriod,
        Column::DueDate,
        Column::InvoiceNumber,
        Column::CustomerName,
        Column::PolicyNumber,
        Column::MonthlyAmount,
        Column::TotalDue,
        Column::LightingTax,
        Column::LateInterest,
        Column::Error,
    ];

    /// Literal header text.
    pub fn header(&self) -> &'static str {
        match self {
            Self::Filename => "filename",
            Self::Model => "model",
            Self::BillingPeriod => "billing_period",
            Self::DueDate => "due_date",
            Self::InvoiceNumber => "invoice_number",
            Self::CustomerName => "customer_name",
            Self::PolicyNumber => "policy_number",
            Self::MonthlyAmount => "monthly_amount",
            Self::TotalDue => "total_due",
            Self::LightingTax => "lighting_tax",
            Self::LateInterest => "late_interest",
            Self::Error => "error",
        }
    }

    /// Parse a comma-separated column list.
    pub fn parse_list(s: &str) -> Result<Vec<Column>, ExtractionError> {
        s.split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Column {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::DEFAULT_ORDER
            .into_iter()
            .find(|c| c.header() == wanted)
            .ok_or_else(|| ExtractionError::Parse {
                field: "column".to_string(),
                value: s.to_string(),
            })
    }
}

/// One report cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Number(f64),
}

impl Cell {
    /// CSV rendering: empty for null.
    pub fn to_field(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map(Cell::Text).unwrap_or(Cell::Null)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(n) => serializer.serialize_f64(*n),
        }
    }
}

/// A source of report cells.
pub trait ReportRow {
    /// The cells this row has values for. Columns left out become null.
    fn cells(&self) -> Vec<(Column, Cell)>;
}

impl ReportRow for DocumentResult {
    fn cells(&self) -> Vec<(Column, Cell)> {
        match self {
            DocumentResult::Failed { filename, error } => vec![
                (Column::Filename, Cell::Text(filename.clone())),
                (Column::Error, Cell::Text(error.clone())),
            ],
            DocumentResult::Extracted(r) => vec![
                (Column::Filename, Cell::Text(r.filename.clone())),
                (Column::Model, r.model.map(|m| m.to_string()).into()),
                (Column::BillingPeriod, r.billing_period.as_ref().map(|d| d.to_string()).into()),
                (Column::DueDate, r.due_date.as_ref().map(|d| d.to_string()).into()),
                (Column::InvoiceNumber, r.invoice_number.clone().into()),
                (Column::CustomerName, r.customer_name.clone().into()),
                (Column::PolicyNumber, r.policy_number.clone().into()),
                (Column::MonthlyAmount, Cell::Number(r.monthly_amount)),
                (Column::TotalDue, Cell::Number(r.total_due)),
                (Column::LightingTax, Cell::Number(r.lighting_tax)),
                (Column::LateInterest, Cell::Number(r.late_interest)),
            ],
        }
    }
}

/// An assembled table.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl Report {
    /// Lay rows out in the given column order, in input order.
    pub fn assemble<'a, R, I>(columns: Vec<Column>, rows: I) -> Self
    where
        R: ReportRow + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                let cells = row.cells();
                columns
                    .iter()
                    .map(|col| {
                        cells
                            .iter()
                            .find(|(c, _)| c == col)
                            .map(|(_, cell)| cell.clone())
                            .unwrap_or(Cell::Null)
                    })
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Header line.
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(Column::header).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

struct RowObject<'a> {
    columns: &'a [Column],
    cells: &'a [Cell],
}

impl Serialize for RowObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, cell) in self.columns.iter().zip(self.cells) {
            map.serialize_entry(column.header(), cell)?;
        }
        map.end()
    }
}

/// Serializes as an array of objects, keys in column order.
impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for cells in &self.rows {
            seq.serialize_element(&RowObject {
                columns: &self.columns,
                cells,
            })?;
        }
        seq.end()
    }
}
