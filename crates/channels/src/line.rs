//! LINE Messaging API adapter.
//!
//! Inbound: webhook bodies are authenticated with `x-line-signature`, the
//! base64 HMAC-SHA256 of the raw body keyed by the channel secret.
//! Outbound: replies go to the Reply API with the event's reply token.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use orderbot_config::LineConfig;
use orderbot_core::error::ChannelError;
use orderbot_core::messenger::Messenger;
use orderbot_core::reply::{Card, Reply};
use serde_json::{Value, json};
use sha2::Sha256;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Header LINE puts the body signature in.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// LINE rejects text messages longer than this.
const MAX_TEXT_CHARS: usize = 5000;
/// ...and Flex alt texts longer than this.
const MAX_ALT_TEXT_CHARS: usize = 400;

/// Verifies webhook bodies against the channel secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Option<String>,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl SignatureVerifier {
    /// An empty secret disables verification.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Uses constant-time comparison via `verify_slice`.
    pub fn verify(&self, body: &[u8], signature: Option<&str>) -> Result<(), ChannelError> {
        let Some(secret) = &self.secret else {
            return Ok(());
        };
        let provided = signature
            .and_then(|sig| BASE64.decode(sig.trim()).ok())
            .ok_or(ChannelError::InvalidSignature)?;

        let mut mac =
            HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| ChannelError::InvalidSignature)?;
        mac.update(body);
        mac.verify_slice(&provided)
            .map_err(|_| ChannelError::InvalidSignature)
    }

    /// Compute the signature LINE would send for `body`.
    pub fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => return String::new(),
        };
        mac.update(body);
        BASE64.encode(mac.finalize().into_bytes())
    }
}

/// Sends replies through the LINE Reply API.
pub struct LineMessenger {
    access_token: Option<String>,
    reply_url: String,
    client: reqwest::Client,
}

impl LineMessenger {
    pub fn from_config(config: &LineConfig) -> Result<Self, ChannelError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| ChannelError::NotConfigured(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            access_token: config
                .channel_access_token
                .clone()
                .filter(|t| !t.is_empty()),
            reply_url: format!(
                "{}/v2/bot/message/reply",
                config.api_base.trim_end_matches('/')
            ),
            client,
        })
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Flex text components must not be empty.
fn non_empty(text: &str) -> &str {
    if text.trim().is_empty() { "-" } else { text }
}

/// Map a reply onto a LINE message object.
pub fn to_line_message(reply: &Reply) -> Value {
    match reply {
        Reply::Text { text } => json!({
            "type": "text",
            "text": truncate(text, MAX_TEXT_CHARS),
        }),
        Reply::Card(card) => json!({
            "type": "flex",
            "altText": truncate(non_empty(&card.alt_text), MAX_ALT_TEXT_CHARS),
            "contents": flex_bubble(card),
        }),
    }
}

/// A Flex bubble: bold title header, label/value rows, small footer.
pub fn flex_bubble(card: &Card) -> Value {
    let rows: Vec<Value> = card
        .fields
        .iter()
        .map(|field| {
            json!({
                "type": "box",
                "layout": "baseline",
                "spacing": "sm",
                "contents": [
                    {
                        "type": "text",
                        "text": non_empty(&field.label),
                        "color": "#aaaaaa",
                        "size": "sm",
                        "flex": 2,
                        "wrap": true
                    },
                    {
                        "type": "text",
                        "text": non_empty(&field.value),
                        "color": "#666666",
                        "size": "sm",
                        "flex": 4,
                        "wrap": true
                    }
                ]
            })
        })
        .collect();

    let mut bubble = json!({
        "type": "bubble",
        "header": {
            "type": "box",
            "layout": "vertical",
            "contents": [{
                "type": "text",
                "text": non_empty(&card.title),
                "weight": "bold",
                "size": "lg",
                "wrap": true
            }]
        },
        "body": {
            "type": "box",
            "layout": "vertical",
            "spacing": "sm",
            "contents": rows
        }
    });

    if !card.footer.is_empty() {
        let lines: Vec<Value> = card
            .footer
            .iter()
            .map(|line| json!({"type": "text", "text": non_empty(line), "size": "xs", "color": "#888888", "wrap": true}))
            .collect();
        bubble["footer"] = json!({
            "type": "box",
            "layout": "vertical",
            "contents": lines
        });
    }

    bubble
}

#[async_trait]
impl Messenger for LineMessenger {
    fn name(&self) -> &str {
        "line"
    }

    async fn reply(&self, reply_token: &str, reply: &Reply) -> Result<(), ChannelError> {
        let token = self.access_token.as_deref().ok_or_else(|| {
            ChannelError::NotConfigured("line.channel_access_token is not set".into())
        })?;

        let body = json!({
            "replyToken": reply_token,
            "messages": [to_line_message(reply)],
        });

        debug!(reply_token_len = reply_token.len(), "Sending LINE reply");

        let response = self
            .client
            .post(&self.reply_url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::DeliveryFailed {
                channel: "line".into(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %error_body, "LINE reply rejected");
            return Err(ChannelError::DeliveryFailed {
                channel: "line".into(),
                reason: format!("HTTP {}: {error_body}", status.as_u16()),
            });
        }

        Ok(())
    }

    async fn health_check(&self) -> Result<bool, ChannelError> {
        Ok(self.access_token.is_some())
    }
}
