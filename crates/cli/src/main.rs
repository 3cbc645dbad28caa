//! Orderbot CLI, the main entry point.
//!
//! Commands:
//! - `init`    Write a default config file
//! - `serve`   Start the LINE webhook server
//! - `ask`     Dispatch one message locally and print the reply
//! - `doctor`  Diagnose configuration and connectivity

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "orderbot",
    about = "Orderbot: LINE chatbot for design order lookups",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Where to write (defaults to ~/.orderbot/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Start the webhook server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Config file (defaults to ~/.orderbot/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Dispatch a single message and print the reply
    Ask {
        /// Message text, as a user would type it in chat
        text: String,

        /// Config file (defaults to ~/.orderbot/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Read orders from a tab-separated file instead of Google Sheets
        #[arg(short, long)]
        table: Option<PathBuf>,
    },

    /// Diagnose configuration and connectivity
    Doctor {
        /// Config file (defaults to ~/.orderbot/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { config, force } => commands::init::run(config, force).await?,
        Commands::Serve { port, config } => commands::serve::run(port, config).await?,
        Commands::Ask {
            text,
            config,
            table,
        } => commands::ask::run(text, config, table).await?,
        Commands::Doctor { config } => commands::doctor::run(config).await?,
    }

    Ok(())
}
