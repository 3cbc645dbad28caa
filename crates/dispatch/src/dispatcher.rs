//! Dispatcher: one inbound text in, at most one reply out.
//!
//! ```text
//! text ──▶ CommandParser ──▶ Intent ──▶ OrderQueryEngine ──▶ Resolution
//!                                                               │
//!                           Option<Reply> ◀── ReplyFormatter ◀──┘
//! ```

use std::sync::Arc;

use orderbot_config::AppConfig;
use orderbot_core::{Intent, Reply, RowSource};
use tracing::{debug, info};

use crate::DispatchError;
use crate::format::ReplyFormatter;
use crate::parser::CommandParser;
use crate::query::{OrderQueryEngine, Resolution};

/// Stateless request handler; safe to share across concurrent requests.
#[derive(Clone)]
pub struct Dispatcher {
    parser: CommandParser,
    engine: OrderQueryEngine,
    formatter: ReplyFormatter,
}

impl Dispatcher {
    pub fn new(config: &AppConfig, source: Arc<dyn RowSource>) -> Result<Self, DispatchError> {
        Ok(Self {
            parser: CommandParser::new(&config.commands)?,
            engine: OrderQueryEngine::new(source),
            formatter: ReplyFormatter::new(&config.commands, &config.reply),
        })
    }

    pub fn parse(&self, text: &str) -> Intent {
        self.parser.parse(text)
    }

    pub async fn resolve(&self, intent: &Intent) -> Resolution {
        self.engine.resolve(intent).await
    }

    pub fn render(&self, intent: &Intent, resolution: &Resolution) -> Option<Reply> {
        self.formatter.render(intent, resolution)
    }

    /// Handle one message body. `None` means stay silent.
    pub async fn dispatch(&self, text: &str) -> Option<Reply> {
        let intent = self.parse(text);
        if intent == Intent::Unrecognized {
            debug!(text_len = text.len(), "Ignoring unrecognized message");
            return None;
        }

        let resolution = self.resolve(&intent).await;
        let outcome = match &resolution {
            Resolution::Record(_) => "record",
            Resolution::Summaries { .. } => "listing",
            Resolution::NoMatch => "no_match",
            Resolution::FetchFailed(_) => "fetch_failed",
            Resolution::NotApplicable => "static",
        };
        info!(intent = %intent, outcome, "Command dispatched");

        self.render(&intent, &resolution)
    }
}
