//! In-memory row source.
//!
//! Serves a fixed table, or a fixed failure. Used by the `ask --table`
//! offline mode and by tests that need a deterministic sheet.

use async_trait::async_trait;
use orderbot_core::error::SourceError;
use orderbot_core::source::RowSource;
use orderbot_core::table::Table;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A row source that always answers with the same table (or error).
#[derive(Debug)]
pub struct StaticSource {
    outcome: Result<Table, SourceError>,
    fetches: AtomicUsize,
}

impl StaticSource {
    pub fn new(table: Table) -> Self {
        Self {
            outcome: Ok(table),
            fetches: AtomicUsize::new(0),
        }
    }

    /// A source whose every fetch fails with `error`.
    pub fn failing(error: SourceError) -> Self {
        Self {
            outcome: Err(error),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Load a tab-separated export of the sheet (first line = header).
    pub fn from_tsv_file(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SourceError::NotConfigured(format!("cannot read {}: {e}", path.display()))
        })?;
        Ok(Self::new(parse_tsv(&content)))
    }

    /// Number of `fetch_table` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

/// Parse tab-separated text into a table. Blank lines are skipped; trailing
/// empty cells are dropped the way the Sheets API drops them.
pub fn parse_tsv(content: &str) -> Table {
    Table::new(
        content
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let mut cells: Vec<String> = line.split('\t').map(str::to_string).collect();
                while cells.last().is_some_and(|c| c.is_empty()) {
                    cells.pop();
                }
                cells
            })
            .collect(),
    )
}

#[async_trait]
impl RowSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_table(&self) -> Result<Table, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_table_and_counts_fetches() {
        let source = StaticSource::new(Table::from_rows([vec!["Nama"], vec!["Alice"]]));
        assert_eq!(source.fetch_count(), 0);
        let table = source.fetch_table().await.unwrap();
        assert_eq!(table.len(), 2);
        source.fetch_table().await.unwrap();
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn failing_source_fails_every_time() {
        let source = StaticSource::failing(SourceError::Http("connection refused".into()));
        assert!(source.fetch_table().await.is_err());
        assert!(source.fetch_table().await.is_err());
    }

    #[test]
    fn tsv_drops_trailing_empty_cells_and_blank_lines() {
        let table = parse_tsv("Nama\tORDER ID\tStatus\r\nAlice\tBDMP1\t\n\nBob\t\t\n");
        assert_eq!(table.len(), 3);
        assert_eq!(table.data_rows()[0], vec!["Alice", "BDMP1"]);
        assert_eq!(table.data_rows()[1], vec!["Bob"]);
    }

    #[test]
    fn tsv_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.tsv");
        std::fs::write(&path, "Nama\tORDER ID\nAlice\tBDMP1\n").unwrap();
        let source = StaticSource::from_tsv_file(&path).unwrap();
        assert_eq!(source.fetch_count(), 0);
    }

    #[test]
    fn missing_tsv_file_errors() {
        assert!(StaticSource::from_tsv_file(Path::new("/nonexistent/orders.tsv")).is_err());
    }
}
