//! `orderbot init`: write a default config file to edit.

use std::path::PathBuf;

use orderbot_config::AppConfig;

pub async fn run(
    config_path: Option<PathBuf>,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = write_default(config_path, force)?;

    println!("Wrote default config to {}", path.display());
    println!();
    println!("  Next steps:");
    println!("    1. Set sheet.spreadsheet_id and sheet.credentials_path");
    println!("       (or SPREADSHEET_ID and GOOGLE_CREDENTIALS)");
    println!("    2. Set line.channel_access_token and line.channel_secret");
    println!("    3. Run `orderbot doctor`, then `orderbot serve`");

    Ok(())
}

/// Write `AppConfig::default_toml()` to `config_path` (or the default path).
/// An existing file is kept unless `force` is set.
fn write_default(
    config_path: Option<PathBuf>,
    force: bool,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = config_path.unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));

    if path.exists() && !force {
        return Err(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        )
        .into());
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&path, AppConfig::default_toml()?)?;

    Ok(path)
}
