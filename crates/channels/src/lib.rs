//! Chat platform adapters for Orderbot.
//!
//! Each adapter implements [`Messenger`](orderbot_core::Messenger) for
//! outbound replies and exposes the inbound webhook types the gateway
//! needs to authenticate and decode events.
//!
//! Available channels:
//! - **LINE**: Messaging API webhooks + Reply API (text and Flex messages)

pub mod line;
pub mod line_event;

pub use line::{LineMessenger, SIGNATURE_HEADER, SignatureVerifier, to_line_message};
pub use line_event::{WebhookEvent, WebhookPayload};
