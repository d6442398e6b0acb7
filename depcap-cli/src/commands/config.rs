//! `depcap config` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use depcap_core::config::DepcapConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Section names accepted by `config show --section`.
pub const SECTIONS: [&str; 3] = ["general", "cache", "analyzer"];

/// Where the effective configuration came from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Loaded from a file (explicit `--config` or `depcap.toml` in the working directory).
    File(std::path::PathBuf),
    /// No file; built-in defaults plus environment overrides.
    Defaults,
}

impl ConfigSource {
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Defaults => "(defaults)".to_owned(),
        }
    }
}

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    source: &ConfigSource,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(source, writer).await,
        ConfigAction::Show { section } => execute_show(source, section, writer).await,
    }
}

/// Load the effective configuration: file (if any), env overrides, validation.
pub async fn load(source: &ConfigSource) -> Result<DepcapConfig, CliError> {
    match source {
        ConfigSource::File(path) => Ok(DepcapConfig::load(path).await?),
        ConfigSource::Defaults => {
            let mut config = DepcapConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Execute the config validate subcommand.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails (parse errors, invalid values, unknown scanners).
async fn execute_validate(source: &ConfigSource, writer: &OutputWriter) -> Result<(), CliError> {
    info!(source = %source.describe(), "validating configuration");

    let report = match load(source).await {
        Ok(_) => ConfigValidationReport {
            source: source.describe(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: source.describe(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Execute the config show subcommand.
///
/// Displays the effective configuration (file + env overrides + defaults),
/// optionally restricted to one section.
async fn execute_show(
    source: &ConfigSource,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load(source).await?;
    let report = build_config_report(&config, source.describe(), section.as_deref())?;
    writer.render(&report)?;
    Ok(())
}

/// Serialize the whole configuration or one section of it.
pub fn build_config_report(
    config: &DepcapConfig,
    source: String,
    section: Option<&str>,
) -> Result<ConfigReport, CliError> {
    let serialized = match section {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("cache") => toml::to_string_pretty(&config.cache),
        Some("analyzer") => toml::to_string_pretty(&config.analyzer),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    };

    Ok(ConfigReport {
        source,
        section: section.map(str::to_owned),
        config_toml: serialized.unwrap_or_else(|e| format!("(serialization error: {})", e)),
    })
}

/// Configuration display report.
///
/// The `config_toml` field is only used for text rendering.
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration source
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    /// Header lines are TOML comments so the output can be saved as a config file.
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        match self.section {
            Some(ref section) => writeln!(w, "# depcap configuration [{}]", section)?,
            None => writeln!(w, "# depcap configuration")?,
        }
        writeln!(w, "# source: {}", self.source)?;
        writeln!(w)?;
        write!(w, "{}", self.config_toml)
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.valid {
            writeln!(w, "{} {}", "VALID".green().bold(), self.source)
        } else {
            writeln!(w, "{} {}", "INVALID".red().bold(), self.source)?;
            self.errors
                .iter()
                .try_for_each(|err| writeln!(w, "  - {}", err))
        }
    }
}
