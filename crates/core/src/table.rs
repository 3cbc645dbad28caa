//! Tabular snapshot of the order sheet.
//!
//! A [`Table`] is fetched fresh for every inbound message and dropped once
//! the reply is rendered. Row 0 is the header; every following row is data.
//! Rows may be shorter than the header (trailing empty cells are omitted by
//! the spreadsheet API), so all cell access goes through [`HeaderIndex`],
//! which turns a missing position into an empty cell.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Exact header labels of the order form.
pub mod columns {
    pub const NAME: &str = "Nama";
    pub const DEPARTMENT: &str = "Departemen";
    pub const DESIGN_NEEDED: &str = "Kebutuhan desain (PPT, Poster, Infografis, dll)";
    pub const DEADLINE: &str = "Deadline yang diajukan";
    pub const ORDER_ID: &str = "ORDER ID";
    pub const STATUS: &str = "Status";

    pub const ALL: [&str; 6] = [NAME, DEPARTMENT, DESIGN_NEEDED, DEADLINE, ORDER_ID, STATUS];
}

/// An ordered sequence of rows of cell strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Build a table from borrowed string rows.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// The header row, or an empty slice for an empty table.
    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Data rows in sheet order (everything after the header).
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Total row count, header included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve the header row into column positions.
    pub fn header_index(&self) -> HeaderIndex {
        HeaderIndex::from_header(self.header())
    }
}

/// Column name → zero-based position, built once per fetched table.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    /// Never fails. Duplicate labels resolve to their first occurrence.
    pub fn from_header(header: &[String]) -> Self {
        let mut positions = HashMap::with_capacity(header.len());
        for (idx, label) in header.iter().enumerate() {
            positions.entry(label.clone()).or_insert(idx);
        }
        Self { positions }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Cell of `row` under column `name`; empty when the column is absent
    /// or the row is too short.
    pub fn cell<'a>(&self, row: &'a [String], name: &str) -> &'a str {
        self.position(name)
            .and_then(|idx| row.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }
}
