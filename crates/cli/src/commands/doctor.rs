//! `orderbot doctor`: diagnose configuration and connectivity.

use std::path::PathBuf;
use std::sync::Arc;

use orderbot_channels::{LineMessenger, SignatureVerifier};
use orderbot_config::AppConfig;
use orderbot_core::{Messenger, RowSource, columns};
use orderbot_dispatch::CommandParser;
use orderbot_sheets::GoogleSheetsSource;

pub async fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Orderbot Doctor");
    println!("===============\n");

    let mut issues = 0;

    let path = config_path.unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));
    if path.exists() {
        println!("  [ok]   Config file found at {}", path.display());
    } else {
        println!("  [info] No config file at {}, using defaults", path.display());
    }

    let config = match AppConfig::load_with(Some(&path)) {
        Ok(config) => {
            println!("  [ok]   Config valid");
            config
        }
        Err(e) => {
            println!("  [fail] Config invalid: {e}");
            println!("\n  1 issue(s) found. Fix the config and run again.");
            return Ok(());
        }
    };

    match CommandParser::new(&config.commands) {
        Ok(_) => println!(
            "  [ok]   Command grammar compiled (e.g. {}{})",
            config.commands.display_prefix(),
            config.commands.keyword.to_uppercase()
        ),
        Err(e) => {
            println!("  [fail] Command grammar: {e}");
            issues += 1;
        }
    }

    if SignatureVerifier::new(config.line.channel_secret.clone()).is_enabled() {
        println!("  [ok]   LINE channel secret set, signatures verified");
    } else {
        println!("  [warn] LINE channel secret not set, webhook signatures are NOT verified");
        issues += 1;
    }

    match LineMessenger::from_config(&config.line) {
        Ok(messenger) => match messenger.health_check().await {
            Ok(true) => println!("  [ok]   LINE channel access token set"),
            _ => {
                println!("  [fail] LINE channel access token not set, replies will fail");
                issues += 1;
            }
        },
        Err(e) => {
            println!("  [fail] LINE client: {e}");
            issues += 1;
        }
    }

    match GoogleSheetsSource::from_config(&config.sheet) {
        Ok(source) => {
            let source: Arc<dyn RowSource> = Arc::new(source);
            match source.fetch_table().await {
                Ok(table) => {
                    println!(
                        "  [ok]   Sheet reachable: {} data row(s)",
                        table.data_rows().len()
                    );
                    let index = table.header_index();
                    let missing: Vec<&str> = columns::ALL
                        .iter()
                        .copied()
                        .filter(|name| index.position(name).is_none())
                        .collect();
                    if missing.is_empty() {
                        println!("  [ok]   All expected columns present");
                    } else {
                        println!("  [warn] Missing columns: {}", missing.join(", "));
                        issues += 1;
                    }
                }
                Err(e) => {
                    println!("  [fail] Sheet fetch failed: {e}");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  [fail] Sheet source: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
