//! depcap CLI -- dependency capability analysis from the command line.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;

use depcap_core::config::{DepcapConfig, GeneralConfig};

use cli::{Cli, Commands};
use commands::config::ConfigSource;
use error::CliError;
use output::OutputWriter;

/// Configuration file looked up in the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "depcap.toml";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let source = config_source(cli.config.as_deref());
    let writer = OutputWriter::new(cli.output);
    let level_override = cli.log_level.as_deref();

    match cli.command {
        Commands::Analyze(args) => {
            let config = prepare(&source, level_override).await?;
            commands::analyze::execute(args, &config, &writer).await
        }
        Commands::Services(args) => {
            let config = prepare(&source, level_override).await?;
            commands::services::execute(args, &config, &writer).await
        }
        // `config validate` reports load errors itself
        Commands::Config(args) => {
            init_logging(&GeneralConfig::default(), level_override)?;
            commands::config::execute(args, &source, &writer).await
        }
    }
}

/// Load the effective configuration and initialize logging and metric descriptions.
async fn prepare(
    source: &ConfigSource,
    level_override: Option<&str>,
) -> Result<DepcapConfig, CliError> {
    let config = commands::config::load(source).await?;
    init_logging(&config.general, level_override)?;
    depcap_core::metrics::describe_all();

    tracing::debug!(source = %source.describe(), "configuration loaded");
    Ok(config)
}

fn config_source(explicit: Option<&Path>) -> ConfigSource {
    match explicit {
        Some(path) => ConfigSource::File(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                ConfigSource::File(default)
            } else {
                ConfigSource::Defaults
            }
        }
    }
}

fn init_logging(general: &GeneralConfig, level_override: Option<&str>) -> Result<(), CliError> {
    logging::init_tracing(general, level_override).map_err(|e| CliError::Config(format!("{e:#}")))
}
