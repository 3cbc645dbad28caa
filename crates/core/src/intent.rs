//! Classified meaning of an inbound chat message.

use serde::{Deserialize, Serialize};

/// What the sender asked for. Derived purely from the message text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Intent {
    /// The command reference.
    Help,
    /// The order keyword alone: show the most recent order.
    OrderBareKeyword,
    /// The order keyword plus a department code (uppercased).
    OrderByDepartment(String),
    /// An order ID such as `BDMP1`, marker stripped and uppercased.
    OrderById(String),
    /// Anything else. Answered with silence.
    Unrecognized,
}

impl Intent {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::OrderBareKeyword => "order_latest",
            Self::OrderByDepartment(_) => "order_by_department",
            Self::OrderById(_) => "order_by_id",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Whether answering this intent needs a table fetch.
    pub fn needs_table(&self) -> bool {
        matches!(
            self,
            Self::OrderBareKeyword | Self::OrderByDepartment(_) | Self::OrderById(_)
        )
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrderByDepartment(dept) => write!(f, "{}({dept})", self.label()),
            Self::OrderById(id) => write!(f, "{}({id})", self.label()),
            _ => f.write_str(self.label()),
        }
    }
}
