//! # Orderbot Core
//!
//! Domain types, traits, and error definitions for the Orderbot order-lookup
//! chatbot. This crate has **no framework dependencies**; it defines the
//! domain model that all other crates implement against.
//!
//! The two external collaborators are traits here: [`RowSource`] (where the
//! order table comes from) and [`Messenger`] (where replies go). Everything
//! between them is synchronous and lives in `orderbot-dispatch`.

pub mod error;
pub mod intent;
pub mod messenger;
pub mod order;
pub mod reply;
pub mod source;
pub mod table;

// Re-export key types at crate root for ergonomics
pub use error::{ChannelError, Error, Result, SourceError};
pub use intent::Intent;
pub use messenger::{InboundMessage, Messenger};
pub use order::{DEFAULT_STATUS, OrderRecord};
pub use reply::{Card, CardField, Reply};
pub use source::RowSource;
pub use table::{HeaderIndex, Table, columns};
