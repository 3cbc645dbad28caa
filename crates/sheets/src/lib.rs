//! Order table sources for Orderbot.
//!
//! Each source implements [`RowSource`](orderbot_core::RowSource) and returns
//! a fresh [`Table`](orderbot_core::Table) per call.
//!
//! Available sources:
//! - **Google Sheets**: `spreadsheets.values.get` over HTTPS, authenticated
//!   by API key, fixed bearer token or service account
//! - **Static**: a fixed in-memory table (offline mode, tests)

pub mod google;
pub mod service_account;
pub mod static_source;

pub use google::GoogleSheetsSource;
pub use service_account::{SHEETS_READONLY_SCOPE, ServiceAccountAuth, ServiceAccountKey};
pub use static_source::{StaticSource, parse_tsv};
