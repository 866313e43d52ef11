//! Table reconstruction from layout-preserving page text.
//!
//! Modern invoice templates print fields as grid cells. With layout text,
//! a grid row becomes one line whose cells are separated by wide gaps, so a
//! run of such lines is read back as a table.

use serde::{Deserialize, Serialize};

use crate::invoice::rules::COLUMN_GAP;

/// A table as ordered rows of optional cell strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTable {
    rows: Vec<Vec<Option<String>>>,
}

impl PageTable {
    /// Create a table from rows.
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    /// All rows in order.
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Split one layout line into cells. An indented line gets an empty first cell.
fn split_cells(line: &str) -> Vec<Option<String>> {
    let line = line.trim_end();
    let mut cells = Vec::new();

    if line.starts_with("  ") {
        cells.push(None);
    }

    cells.extend(
        COLUMN_GAP
            .split(line.trim_start())
            .filter(|cell| !cell.is_empty())
            .map(|cell| Some(cell.to_string())),
    );
    cells
}

/// Group consecutive multi-cell lines into tables.
pub fn tables_from_text(text: &str) -> Vec<PageTable> {
    let mut tables = Vec::new();
    let mut current: Vec<Vec<Option<String>>> = Vec::new();

    for line in text.lines() {
        let cells = split_cells(line);
        let filled = cells.iter().flatten().count();

        if filled >= 2 {
            current.push(cells);
        } else if !current.is_empty() {
            tables.push(PageTable::new(std::mem::take(&mut current)));
        }
    }

    if !current.is_empty() {
        tables.push(PageTable::new(current));
    }

    tables
}
