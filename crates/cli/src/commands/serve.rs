//! `orderbot serve`: start the LINE webhook server.

use std::path::PathBuf;

use orderbot_config::AppConfig;
use tracing::info;

pub async fn run(
    port_override: Option<u16>,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load(port_override, config_path)?;

    info!(
        host = %config.gateway.host,
        port = config.gateway.port,
        webhook = %config.gateway.webhook_path,
        reply_mode = ?config.reply.mode,
        "Orderbot gateway configured"
    );

    orderbot_gateway::start(config).await?;

    Ok(())
}

/// Load the config and apply `--port`, re-validating afterwards so the
/// override obeys the same rules as the file.
fn load(
    port_override: Option<u16>,
    config_path: Option<PathBuf>,
) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = AppConfig::load_with(config_path.as_deref())
        .map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
        config
            .validate()
            .map_err(|e| format!("Invalid --port: {e}"))?;
    }

    Ok(config)
}
