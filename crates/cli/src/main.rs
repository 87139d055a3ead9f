//! Storefront back-office console

mod commands;
mod config;
mod logging;
mod storage;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::{Commands, Context};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, debug, error};

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Storefront back-office console")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "info")]
    log_level: LogLevel,

    /// Data directory for the session file, config and logs
    #[arg(short = 'd', long, global = true, env = "STOREFRONT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Configuration file (TOML); defaults to <data-dir>/config.toml when present
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Backend API base URL, overrides the configuration file
    #[arg(long, global = true, env = "STOREFRONT_API_URL")]
    api_url: Option<String>,

    /// Timeout for the whole command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "30")]
    timeout: u64,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(config::default_data_dir);
    logging::init_logging(cli.log_level.into(), &data_dir, cli.no_file_log)?;

    let settings = config::load_config(cli.config.as_deref(), &data_dir, cli.api_url)?;
    debug!(api = %settings.api_base_url, "Loaded configuration");
    let context = Context::new(&settings, &data_dir)?;

    let outcome = if cli.timeout == 0 {
        cli.command.execute(context).await
    } else {
        let timeout_duration = Duration::from_secs(cli.timeout);
        match tokio::time::timeout(timeout_duration, cli.command.execute(context)).await {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!(
                "Command timed out after {} seconds",
                cli.timeout
            )),
        }
    };

    if let Err(e) = outcome {
        error!("Command failed: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
