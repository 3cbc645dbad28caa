//! Reply formatter.
//!
//! Renders an [`Intent`] and its [`Resolution`] into at most one outbound
//! [`Reply`]. Unrecognized input renders to `None`; a miss and a failed
//! fetch render to the same "not found" text.

use orderbot_config::{CommandsConfig, ReplyConfig, ReplyMode};
use orderbot_core::{Card, CardField, Intent, OrderRecord, Reply};

use crate::query::Resolution;

pub const NOT_FOUND_TEXT: &str = "Data pesanan tidak ditemukan.";

const SEPARATOR: &str = "_______________";

/// Renders replies in the configured mode and command syntax.
#[derive(Debug, Clone)]
pub struct ReplyFormatter {
    mode: ReplyMode,
    prefix: String,
    keyword: String,
    help_keyword: String,
    help_enabled: bool,
    department_enabled: bool,
    order_id_enabled: bool,
    signature: Vec<String>,
}

impl ReplyFormatter {
    pub fn new(commands: &CommandsConfig, reply: &ReplyConfig) -> Self {
        Self {
            mode: reply.mode,
            prefix: commands.display_prefix(),
            keyword: commands.keyword.to_uppercase(),
            help_keyword: commands.help_keyword.to_uppercase(),
            help_enabled: commands.help,
            department_enabled: commands.department,
            order_id_enabled: commands.order_id,
            signature: vec![
                reply.organization.clone(),
                format!("Line : {}", reply.line_handle),
                format!("Instagram : {}", reply.instagram_handle),
            ],
        }
    }

    /// Render exactly one outcome: a reply, or deliberate silence.
    pub fn render(&self, intent: &Intent, resolution: &Resolution) -> Option<Reply> {
        match intent {
            Intent::Unrecognized => None,
            Intent::Help => Some(Reply::text(self.help_text())),
            Intent::OrderBareKeyword | Intent::OrderById(_) | Intent::OrderByDepartment(_) => {
                Some(match resolution {
                    Resolution::Record(record) => self.record(record),
                    Resolution::Summaries { department, lines } => {
                        Reply::text(self.department_text(department, lines))
                    }
                    Resolution::NoMatch
                    | Resolution::FetchFailed(_)
                    | Resolution::NotApplicable => Reply::text(NOT_FOUND_TEXT),
                })
            }
        }
    }

    /// The command reference, listing only enabled commands.
    pub fn help_text(&self) -> String {
        let p = &self.prefix;
        let kw = &self.keyword;
        let mut lines = vec!["Daftar perintah:".to_string()];
        lines.push(format!("{p}{kw} - Lihat pesanan terbaru"));
        if self.department_enabled {
            lines.push(format!(
                "{p}{kw} <DEPARTEMEN> - Lihat semua pesanan satu departemen"
            ));
        }
        if self.order_id_enabled {
            lines.push(format!(
                "{p}<ORDER ID> - Lihat detail pesanan, contoh: {p}BDMP1"
            ));
        }
        if self.help_enabled {
            lines.push(format!("{p}{} - Tampilkan daftar perintah ini", self.help_keyword));
        }
        lines.join("\n")
    }

    fn record(&self, record: &OrderRecord) -> Reply {
        match self.mode {
            ReplyMode::Text => Reply::text(self.record_text(record)),
            ReplyMode::Card => Reply::Card(self.record_card(record)),
        }
    }

    pub fn record_text(&self, record: &OrderRecord) -> String {
        format!(
            "Halo {}!\n\nOrder ID: {}\nPesanan untuk desain: {}\nDeadline: {}\nStatus: {}\n{SEPARATOR}\n{}",
            record.name,
            record.order_id,
            record.design_needed,
            record.deadline,
            record.status,
            self.signature.join("\n"),
        )
    }

    pub fn record_card(&self, record: &OrderRecord) -> Card {
        Card {
            alt_text: format!("Order {}: {}", record.order_id, record.status),
            title: format!("Halo {}!", record.name),
            fields: vec![
                CardField::new("Order ID", &record.order_id),
                CardField::new("Departemen", &record.department),
                CardField::new("Pesanan untuk desain", &record.design_needed),
                CardField::new("Deadline", &record.deadline),
                CardField::new("Status", &record.status),
            ],
            footer: self.signature.clone(),
        }
    }

    pub fn department_text(&self, department: &str, lines: &[String]) -> String {
        let mut text = format!("Daftar pesanan {department}:\n{}", lines.join("\n"));
        if self.order_id_enabled {
            let p = &self.prefix;
            text.push_str(&format!(
                "\n\nKetik {p}<ORDER ID> untuk melihat detail pesanan, contoh: {p}{department}1"
            ));
        }
        text
    }
}
