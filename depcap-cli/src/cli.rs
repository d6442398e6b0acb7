//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// depcap -- report what each resolved dependency artifact provides.
///
/// Use `depcap <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "depcap", version, about, long_about = None)]
pub struct Cli {
    /// Path to the depcap.toml configuration file.
    ///
    /// When omitted, `depcap.toml` in the current directory is used if present,
    /// otherwise built-in defaults.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve and scan every artifact of an exported dependency graph.
    Analyze(AnalyzeArgs),

    /// List service-provider declarations in archives.
    Services(ServicesArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- analyze ----

/// Analyze a dependency graph export (JSON).
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to the graph export JSON file.
    pub graph: PathBuf,
}

// ---- services ----

/// Run only the service-provider scanner on the given archives.
#[derive(Args, Debug)]
pub struct ServicesArgs {
    /// Archive files (jar/aar) to inspect.
    #[arg(required = true)]
    pub archives: Vec<PathBuf>,
}

// ---- config ----

/// Manage depcap configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, cache, analyzer).
        #[arg(long)]
        section: Option<String>,
    },
}
