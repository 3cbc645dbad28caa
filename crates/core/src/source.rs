//! RowSource trait: the abstraction over the tabular order store.
//!
//! The store is read-only from Orderbot's point of view. Every call returns
//! a complete, fresh snapshot; implementations must not cache between calls.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::table::Table;

#[async_trait]
pub trait RowSource: Send + Sync {
    /// Human-readable source name (e.g., "google_sheets", "static").
    fn name(&self) -> &str;

    /// Fetch the header row and every data row.
    async fn fetch_table(&self) -> Result<Table, SourceError>;
}
