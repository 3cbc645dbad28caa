//! Command parser.
//!
//! Turns a raw chat message into an [`Intent`]. Input is trimmed and
//! uppercased first, then tried against each form in order; the first
//! match wins:
//!
//! ```text
//! help       = MARKER? HELP_KEYWORD
//! bare       = MARKER? KEYWORD
//! department = MARKER? KEYWORD WS+ LETTERS
//! order_id   = MARKER? LETTERS DIGITS
//! ```
//!
//! `LETTERS` is ASCII `A-Z`, `DIGITS` is ASCII `0-9` and `WS` is ASCII
//! whitespace (space, tab, newline). Non-ASCII letters and spaces such as
//! U+00A0 never match.
//!
//! `MARKER?` becomes mandatory or disappears depending on
//! [`MarkerPolicy`]. Individual forms can be switched off; a disabled form
//! simply never matches.

use orderbot_config::{CommandsConfig, MarkerPolicy};
use orderbot_core::Intent;
use regex_lite::Regex;

use crate::DispatchError;

/// Compiled command grammar.
#[derive(Debug, Clone)]
pub struct CommandParser {
    help: Option<Regex>,
    bare: Regex,
    department: Option<Regex>,
    order_id: Option<Regex>,
}

impl CommandParser {
    /// Compile the grammar described by the `[commands]` section.
    pub fn new(commands: &CommandsConfig) -> Result<Self, DispatchError> {
        let marker = regex_lite::escape(&commands.marker_char().to_string());
        let prefix = match commands.marker_policy {
            MarkerPolicy::Optional => format!("(?:{marker})?"),
            MarkerPolicy::Required => marker,
            MarkerPolicy::Forbidden => String::new(),
        };
        let keyword = regex_lite::escape(&commands.keyword.to_uppercase());
        let help_keyword = regex_lite::escape(&commands.help_keyword.to_uppercase());

        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| DispatchError::Grammar {
                pattern,
                reason: e.to_string(),
            })
        };

        Ok(Self {
            help: commands
                .help
                .then(|| compile(format!("^{prefix}{help_keyword}$")))
                .transpose()?,
            bare: compile(format!("^{prefix}{keyword}$"))?,
            department: commands
                .department
                .then(|| compile(format!(r"^{prefix}{keyword}\s+([A-Z]+)$")))
                .transpose()?,
            order_id: commands
                .order_id
                .then(|| compile(format!("^{prefix}([A-Z]+[0-9]+)$")))
                .transpose()?,
        })
    }

    /// Classify `input`. Pure; never fails.
    pub fn parse(&self, input: &str) -> Intent {
        let text = normalize(input);

        if self.help.as_ref().is_some_and(|re| re.is_match(&text)) {
            return Intent::Help;
        }

        if self.bare.is_match(&text) {
            return Intent::OrderBareKeyword;
        }

        if let Some(dept) = capture(self.department.as_ref(), &text) {
            return Intent::OrderByDepartment(dept);
        }

        if let Some(id) = capture(self.order_id.as_ref(), &text) {
            return Intent::OrderById(id);
        }

        Intent::Unrecognized
    }
}

/// Trim surrounding whitespace and uppercase.
pub fn normalize(input: &str) -> String {
    input.trim().to_uppercase()
}

fn capture(re: Option<&Regex>, text: &str) -> Option<String> {
    re?.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
