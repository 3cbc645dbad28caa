//! Outbound reply payloads.
//!
//! Replies are platform-agnostic here. Each [`Messenger`](crate::Messenger)
//! maps them onto its own wire format (LINE text or Flex messages).

use serde::{Deserialize, Serialize};

/// A single outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    Text { text: String },
    Card(Card),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Plain-text rendition, used for logs and terminal output.
    pub fn to_plain_text(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Card(card) => card.to_plain_text(),
        }
    }
}

/// Structured card: a title, labelled fields and a footer block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Fallback text for clients that cannot render cards.
    pub alt_text: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<CardField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub footer: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardField {
    pub label: String,
    pub value: String,
}

impl CardField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

impl Card {
    pub fn to_plain_text(&self) -> String {
        let mut lines = vec![self.title.clone()];
        lines.extend(
            self.fields
                .iter()
                .map(|field| format!("{}: {}", field.label, field.value)),
        );
        if !self.footer.is_empty() {
            lines.push(String::new());
            lines.extend(self.footer.iter().cloned());
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_reply_plain_text() {
        assert_eq!(Reply::text("hi").to_plain_text(), "hi");
    }

    #[test]
    fn card_plain_text_lists_fields_and_footer() {
        let card = Card {
            alt_text: "Order BDMP1".into(),
            title: "Halo Alice!".into(),
            fields: vec![CardField::new("Order ID", "BDMP1")],
            footer: vec!["ASSA".into()],
        };
        assert_eq!(
            Reply::Card(card).to_plain_text(),
            "Halo Alice!\nOrder ID: BDMP1\n\nASSA"
        );
    }

    #[test]
    fn reply_serialization_is_tagged() {
        let json = serde_json::to_value(Reply::text("x")).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"], "x");
    }
}
