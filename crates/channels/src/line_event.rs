//! LINE webhook payloads.
//!
//! Only the fields Orderbot reads are modelled; everything else LINE sends
//! is ignored by serde.

use orderbot_core::error::ChannelError;
use orderbot_core::messenger::InboundMessage;
use serde::Deserialize;

/// Body of a LINE webhook POST.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,

    /// May be empty (LINE's "verify" button sends no events).
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(rename = "replyToken", default)]
    pub reply_token: Option<String>,

    #[serde(default)]
    pub message: Option<EventMessage>,

    #[serde(default)]
    pub source: Option<EventSource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventSource {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

impl WebhookPayload {
    pub fn parse(body: &[u8]) -> Result<Self, ChannelError> {
        serde_json::from_slice(body).map_err(|e| ChannelError::InvalidPayload(e.to_string()))
    }

    /// Text message events that can be answered, in delivery order.
    pub fn text_messages(&self) -> Vec<InboundMessage> {
        self.events.iter().filter_map(WebhookEvent::to_inbound).collect()
    }
}

impl WebhookEvent {
    /// `Some` only for `message` events carrying text and a reply token.
    pub fn to_inbound(&self) -> Option<InboundMessage> {
        if self.kind != "message" {
            return None;
        }
        let message = self.message.as_ref().filter(|m| m.kind == "text")?;
        Some(InboundMessage {
            text: message.text.clone()?,
            reply_token: self.reply_token.clone()?,
            sender_id: self.source.as_ref().and_then(|s| s.user_id.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "destination": "Uxxxxxxxx",
        "events": [
            {
                "type": "message",
                "replyToken": "token-1",
                "source": {"type": "user", "userId": "U123"},
                "message": {"type": "text", "id": "1", "text": "!ORDER"}
            },
            {
                "type": "follow",
                "replyToken": "token-2",
                "source": {"type": "user", "userId": "U456"}
            },
            {
                "type": "message",
                "replyToken": "token-3",
                "message": {"type": "sticker", "id": "2", "packageId": "1", "stickerId": "1"}
            },
            {
                "type": "message",
                "replyToken": "token-4",
                "source": {"type": "group", "groupId": "G1"},
                "message": {"type": "text", "id": "3", "text": "!help"}
            }
        ]
    }"#;

    #[test]
    fn extracts_text_messages_in_order() {
        let payload = WebhookPayload::parse(PAYLOAD.as_bytes()).unwrap();
        assert_eq!(payload.events.len(), 4);

        let messages = payload.text_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "!ORDER");
        assert_eq!(messages[0].reply_token, "token-1");
        assert_eq!(messages[0].sender_id.as_deref(), Some("U123"));
        assert_eq!(messages[1].reply_token, "token-4");
        assert_eq!(messages[1].sender_id, None);
    }

    #[test]
    fn verification_payload_has_no_events() {
        let payload = WebhookPayload::parse(br#"{"destination":"U1","events":[]}"#).unwrap();
        assert!(payload.text_messages().is_empty());
    }

    #[test]
    fn missing_reply_token_is_skipped() {
        let payload = WebhookPayload::parse(
            br#"{"events":[{"type":"message","message":{"type":"text","text":"ORDER"}}]}"#,
        )
        .unwrap();
        assert!(payload.text_messages().is_empty());
    }

    #[test]
    fn garbage_is_invalid_payload() {
        assert!(matches!(
            WebhookPayload::parse(b"not json"),
            Err(ChannelError::InvalidPayload(_))
        ));
    }
}
