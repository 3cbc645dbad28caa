//! Order records derived from sheet rows.

use serde::{Deserialize, Serialize};

use crate::table::{HeaderIndex, columns};

/// Status shown when the sheet has no status column or the cell is blank.
pub const DEFAULT_STATUS: &str = "Waiting";

/// One design order, resolved from a single data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub name: String,
    pub department: String,
    pub design_needed: String,
    pub deadline: String,
    pub order_id: String,
    pub status: String,
}

impl OrderRecord {
    /// Map a data row through the header index. Missing cells become empty.
    pub fn from_row(index: &HeaderIndex, row: &[String]) -> Self {
        let status = index.cell(row, columns::STATUS);
        Self {
            name: index.cell(row, columns::NAME).to_string(),
            department: index.cell(row, columns::DEPARTMENT).to_string(),
            design_needed: index.cell(row, columns::DESIGN_NEEDED).to_string(),
            deadline: index.cell(row, columns::DEADLINE).to_string(),
            order_id: index.cell(row, columns::ORDER_ID).to_string(),
            status: if status.is_empty() {
                DEFAULT_STATUS.to_string()
            } else {
                status.to_string()
            },
        }
    }

    /// One-line listing form: `<orderId> - <designNeeded> | <deadline>`.
    pub fn summary_line(&self) -> String {
        format!("{} - {} | {}", self.order_id, self.design_needed, self.deadline)
    }
}
