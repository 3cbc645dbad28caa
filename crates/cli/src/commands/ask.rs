//! `orderbot ask`: run one message through the dispatcher and print the
//! reply, without LINE in the loop.

use std::path::PathBuf;
use std::sync::Arc;

use orderbot_config::AppConfig;
use orderbot_core::RowSource;
use orderbot_dispatch::Dispatcher;
use orderbot_sheets::{GoogleSheetsSource, StaticSource};

pub async fn run(
    text: String,
    config_path: Option<PathBuf>,
    table: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_with(config_path.as_deref())
        .map_err(|e| format!("Failed to load config: {e}"))?;

    let source: Arc<dyn RowSource> = match table {
        Some(path) => Arc::new(StaticSource::from_tsv_file(&path)?),
        None => Arc::new(GoogleSheetsSource::from_config(&config.sheet)?),
    };

    let dispatcher = Dispatcher::new(&config, source)?;
    match dispatcher.dispatch(&text).await {
        Some(reply) => println!("{}", reply.to_plain_text()),
        None => eprintln!("(no reply: message is not a command)"),
    }

    Ok(())
}
