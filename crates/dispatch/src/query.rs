//! Order query engine.
//!
//! [`OrderBook`] scans one fetched [`Table`] synchronously and never
//! mutates it. [`OrderQueryEngine`] wraps a [`RowSource`] and fetches a
//! fresh table for every query, so the only suspension point is the fetch.

use std::sync::Arc;

use orderbot_core::error::SourceError;
use orderbot_core::{HeaderIndex, Intent, OrderRecord, RowSource, Table, columns};
use tracing::{debug, warn};

/// Read-only view of one table snapshot.
pub struct OrderBook<'a> {
    table: &'a Table,
    index: HeaderIndex,
}

impl<'a> OrderBook<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self {
            table,
            index: table.header_index(),
        }
    }

    fn order_id<'r>(&self, row: &'r [String]) -> &'r str {
        self.index.cell(row, columns::ORDER_ID)
    }

    /// The bottom-most data row that has an order ID.
    pub fn latest(&self) -> Option<OrderRecord> {
        self.table
            .data_rows()
            .iter()
            .rev()
            .find(|row| !self.order_id(row).is_empty())
            .map(|row| OrderRecord::from_row(&self.index, row))
    }

    /// The top-most data row whose order ID equals `id` exactly.
    pub fn by_id(&self, id: &str) -> Option<OrderRecord> {
        self.table
            .data_rows()
            .iter()
            .find(|row| self.order_id(row) == id)
            .map(|row| OrderRecord::from_row(&self.index, row))
    }

    /// Every order of `dept` (compared uppercased) that has an order ID,
    /// top to bottom. `None` when there are none.
    pub fn department_orders(&self, dept: &str) -> Option<Vec<OrderRecord>> {
        let orders: Vec<OrderRecord> = self
            .table
            .data_rows()
            .iter()
            .filter(|row| !self.order_id(row).is_empty())
            .filter(|row| self.index.cell(row, columns::DEPARTMENT).to_uppercase() == dept)
            .map(|row| OrderRecord::from_row(&self.index, row))
            .collect();

        (!orders.is_empty()).then_some(orders)
    }

    /// [`department_orders`](Self::department_orders) as summary lines.
    pub fn by_department(&self, dept: &str) -> Option<Vec<String>> {
        self.department_orders(dept)
            .map(|orders| orders.iter().map(OrderRecord::summary_line).collect())
    }
}

/// What a query produced, with fetch failures kept apart from misses.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The intent needs no data (help, unrecognized input).
    NotApplicable,
    Record(OrderRecord),
    Summaries { department: String, lines: Vec<String> },
    NoMatch,
    FetchFailed(SourceError),
}

/// Runs order queries against a freshly fetched table.
#[derive(Clone)]
pub struct OrderQueryEngine {
    source: Arc<dyn RowSource>,
}

impl OrderQueryEngine {
    pub fn new(source: Arc<dyn RowSource>) -> Self {
        Self { source }
    }

    async fn fetch(&self) -> Result<Table, SourceError> {
        let table = self.source.fetch_table().await?;
        debug!(source = self.source.name(), rows = table.len(), "Table snapshot ready");
        Ok(table)
    }

    pub async fn latest(&self) -> Result<Option<OrderRecord>, SourceError> {
        let table = self.fetch().await?;
        Ok(OrderBook::new(&table).latest())
    }

    pub async fn by_id(&self, id: &str) -> Result<Option<OrderRecord>, SourceError> {
        let table = self.fetch().await?;
        Ok(OrderBook::new(&table).by_id(id))
    }

    pub async fn by_department(&self, dept: &str) -> Result<Option<Vec<String>>, SourceError> {
        let table = self.fetch().await?;
        Ok(OrderBook::new(&table).by_department(dept))
    }

    /// Run the query `intent` asks for. Never fails: errors become
    /// [`Resolution::FetchFailed`].
    pub async fn resolve(&self, intent: &Intent) -> Resolution {
        if !intent.needs_table() {
            return Resolution::NotApplicable;
        }

        let outcome = match intent {
            Intent::OrderBareKeyword => self.latest().await.map(|r| r.map(Resolution::Record)),
            Intent::OrderById(id) => self.by_id(id).await.map(|r| r.map(Resolution::Record)),
            Intent::OrderByDepartment(dept) => self.by_department(dept).await.map(|lines| {
                lines.map(|lines| Resolution::Summaries {
                    department: dept.clone(),
                    lines,
                })
            }),
            Intent::Help | Intent::Unrecognized => Ok(None),
        };

        match outcome {
            Ok(Some(resolution)) => resolution,
            Ok(None) => {
                debug!(intent = %intent, "No matching order");
                Resolution::NoMatch
            }
            Err(e) => {
                warn!(intent = %intent, source = self.source.name(), error = %e, "Order table fetch failed");
                Resolution::FetchFailed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderbot_sheets::StaticSource;

    const HEADER: [&str; 6] = [
        columns::NAME,
        columns::DEPARTMENT,
        columns::DESIGN_NEEDED,
        columns::DEADLINE,
        columns::ORDER_ID,
        columns::STATUS,
    ];

    fn table(rows: &[[&str; 6]]) -> Table {
        Table::from_rows(std::iter::once(HEADER).chain(rows.iter().copied()))
    }

    fn sample() -> Table {
        table(&[
            ["Alice", "bdmp", "Poster", "1 Mei", "BDMP1", "Done"],
            ["Bob", "ACAF", "PPT", "2 Mei", "ACAF1", ""],
            ["Cici", "BDMP", "Infografis", "3 Mei", "BDMP2", "Waiting"],
            ["Dedi", "BDMP", "Poster", "4 Mei", "", ""],
        ])
    }

    #[test]
    fn latest_skips_rows_without_id() {
        let t = table(&[
            ["A", "X", "", "", "", ""],
            ["B", "X", "", "", "X1", ""],
        ]);
        assert_eq!(OrderBook::new(&t).latest().unwrap().name, "B");

        let t = table(&[
            ["B", "X", "", "", "X1", ""],
            ["A", "X", "", "", "", ""],
        ]);
        assert_eq!(OrderBook::new(&t).latest().unwrap().order_id, "X1");
    }

    #[test]
    fn latest_picks_bottom_most() {
        assert_eq!(OrderBook::new(&sample()).latest().unwrap().order_id, "BDMP2");
    }

    #[test]
    fn by_id_exact_first_occurrence() {
        let t = table(&[
            ["First", "BDMP", "", "", "BDMP1", ""],
            ["Second", "BDMP", "", "", "BDMP1", ""],
        ]);
        assert_eq!(OrderBook::new(&t).by_id("BDMP1").unwrap().name, "First");
    }

    #[test]
    fn by_id_is_case_sensitive() {
        let t = table(&[["Lower", "BDMP", "", "", "bdmp1", ""]]);
        assert!(OrderBook::new(&t).by_id("BDMP1").is_none());
    }

    #[test]
    fn by_id_miss() {
        assert!(OrderBook::new(&sample()).by_id("ZZZ9").is_none());
    }

    #[test]
    fn by_department_ignores_cell_case_and_keeps_order() {
        let t = table(&[
            ["A", "bdmp", "Poster", "1 Mei", "BDMP1", ""],
            ["B", "BDMP", "PPT", "2 Mei", "BDMP2", ""],
            ["C", "ACAF", "PPT", "3 Mei", "ACAF1", ""],
        ]);
        assert_eq!(
            OrderBook::new(&t).by_department("BDMP").unwrap(),
            vec!["BDMP1 - Poster | 1 Mei", "BDMP2 - PPT | 2 Mei"]
        );
    }

    #[test]
    fn by_department_requires_order_id() {
        let orders = OrderBook::new(&sample()).department_orders("BDMP").unwrap();
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|o| !o.order_id.is_empty()));
    }

    #[test]
    fn by_department_miss_is_none() {
        assert!(OrderBook::new(&sample()).by_department("HRD").is_none());
    }

    #[test]
    fn header_only_and_empty_tables_yield_none() {
        for t in [Table::from_rows([HEADER]), Table::default()] {
            let book = OrderBook::new(&t);
            assert!(book.latest().is_none());
            assert!(book.by_id("BDMP1").is_none());
            assert!(book.by_department("BDMP").is_none());
        }
    }

    #[test]
    fn short_rows_and_missing_columns_degrade() {
        let t = Table::from_rows([
            vec![columns::NAME, columns::ORDER_ID],
            vec!["Alice", "BDMP1"],
            vec!["Bob"],
        ]);
        let record = OrderBook::new(&t).latest().unwrap();
        assert_eq!(record.name, "Alice");
        assert_eq!(record.deadline, "");
        assert_eq!(record.status, "Waiting");
    }

    #[test]
    fn scanning_does_not_mutate_table() {
        let t = sample();
        let before = t.clone();
        let book = OrderBook::new(&t);
        book.latest();
        book.by_id("BDMP1");
        book.by_department("BDMP");
        assert_eq!(t, before);
    }

    #[tokio::test]
    async fn engine_fetches_per_query() {
        let source = Arc::new(StaticSource::new(sample()));
        let engine = OrderQueryEngine::new(source.clone());
        assert!(engine.latest().await.unwrap().is_some());
        assert!(engine.by_id("ACAF1").await.unwrap().is_some());
        assert_eq!(engine.by_department("BDMP").await.unwrap().unwrap().len(), 2);
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn resolve_maps_outcomes() {
        let engine = OrderQueryEngine::new(Arc::new(StaticSource::new(sample())));

        assert!(matches!(
            engine.resolve(&Intent::OrderById("BDMP1".into())).await,
            Resolution::Record(r) if r.name == "Alice"
        ));
        assert!(matches!(
            engine.resolve(&Intent::OrderById("NOPE1".into())).await,
            Resolution::NoMatch
        ));
        assert!(matches!(
            engine.resolve(&Intent::OrderByDepartment("BDMP".into())).await,
            Resolution::Summaries { department, lines } if department == "BDMP" && lines.len() == 2
        ));
        assert!(matches!(
            engine.resolve(&Intent::Help).await,
            Resolution::NotApplicable
        ));
    }

    #[tokio::test]
    async fn resolve_keeps_fetch_failure_distinct() {
        let source = Arc::new(StaticSource::failing(SourceError::Http("timeout".into())));
        let engine = OrderQueryEngine::new(source);
        assert!(matches!(
            engine.resolve(&Intent::OrderBareKeyword).await,
            Resolution::FetchFailed(SourceError::Http(_))
        ));
    }

    #[tokio::test]
    async fn help_and_unrecognized_skip_fetch() {
        let source = Arc::new(StaticSource::new(sample()));
        let engine = OrderQueryEngine::new(source.clone());
        engine.resolve(&Intent::Help).await;
        engine.resolve(&Intent::Unrecognized).await;
        assert_eq!(source.fetch_count(), 0);
    }
}
