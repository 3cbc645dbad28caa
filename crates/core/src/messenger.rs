//! Messenger trait: the abstraction over the chat platform's reply API.
//!
//! Inbound events arrive through the gateway; the messenger only sends the
//! rendered reply back, keyed by the platform's opaque reply token.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChannelError;
use crate::reply::Reply;

/// A text message received from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Raw message body as typed by the sender.
    pub text: String,

    /// Opaque token used to answer this message. Passed through unmodified.
    pub reply_token: String,

    /// Platform-specific sender identifier (if available)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
}

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Platform name (e.g., "line").
    fn name(&self) -> &str;

    /// Send one reply for the message identified by `reply_token`.
    async fn reply(&self, reply_token: &str, reply: &Reply) -> Result<(), ChannelError>;

    /// Health check: is the messenger configured and usable?
    async fn health_check(&self) -> Result<bool, ChannelError> {
        Ok(true)
    }
}
