//! Logging initialization for the depcap CLI.
//!
//! Logs are written to stderr so stdout carries only the rendered report.
//! Filter precedence: `RUST_LOG`, then `--log-level`, then `general.log_level`.

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use depcap_core::config::GeneralConfig;

/// Log line format selected by `general.log_format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => bail!("unknown log format '{other}', expected 'json' or 'pretty'"),
        }
    }
}

/// Build the level filter, with `RUST_LOG` taking precedence when set.
pub fn build_filter(config: &GeneralConfig, level_override: Option<&str>) -> EnvFilter {
    let level = level_override.unwrap_or(&config.log_level);
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global tracing subscriber. Call once, before any tracing macro.
pub fn init_tracing(config: &GeneralConfig, level_override: Option<&str>) -> Result<()> {
    let format = LogFormat::parse(&config.log_format)?;
    let filter = build_filter(config, level_override);

    let json = (format == LogFormat::Json)
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    let pretty = (format == LogFormat::Pretty)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()
        .context("failed to initialize tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json").expect("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty").expect("pretty"), LogFormat::Pretty);

        let err = LogFormat::parse("xml").expect_err("xml is not a log format");
        assert!(err.to_string().contains("'xml'"));
    }

    #[test]
    fn test_init_tracing_rejects_unknown_format() {
        let config = GeneralConfig {
            log_level: "info".to_owned(),
            log_format: "compact".to_owned(),
        };
        assert!(init_tracing(&config, None).is_err());
    }
}
