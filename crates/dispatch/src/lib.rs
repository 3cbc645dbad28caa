//! Command dispatch for Orderbot.
//!
//! Everything between an inbound message body and the outbound reply:
//!
//! - [`CommandParser`]: text → [`Intent`](orderbot_core::Intent)
//! - [`OrderQueryEngine`] / [`OrderBook`]: intent → matching rows
//! - [`ReplyFormatter`]: rows → text or card reply (or silence)
//! - [`Dispatcher`]: the three wired together

mod dispatcher;
mod format;
mod parser;
mod query;

pub use dispatcher::Dispatcher;
pub use format::{NOT_FOUND_TEXT, ReplyFormatter};
pub use parser::{CommandParser, normalize};
pub use query::{OrderBook, OrderQueryEngine, Resolution};

/// Errors from building the dispatch pipeline.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid command pattern '{pattern}': {reason}")]
    Grammar { pattern: String, reason: String },
}

impl From<DispatchError> for orderbot_core::Error {
    fn from(e: DispatchError) -> Self {
        Self::Config {
            message: e.to_string(),
        }
    }
}
