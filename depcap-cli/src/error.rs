//! CLI-specific error types and exit code mapping

use depcap_analyzer::AnalyzerError;
use depcap_core::error::DepcapError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// A dependency reference could not be resolved to coordinates.
    #[error("resolve error: {0}")]
    Resolve(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from depcap-core.
    #[error("{0}")]
    Core(#[from] DepcapError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                        |
    /// |------|--------------------------------|
    /// | 0    | Success                        |
    /// | 1    | General / command error        |
    /// | 2    | Configuration error            |
    /// | 3    | Unsupported dependency reference |
    /// | 10   | IO error                       |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(DepcapError::Config(_)) => 2,
            Self::Resolve(_) | Self::Core(DepcapError::Resolve(_)) => 3,
            Self::Io(_) | Self::Core(DepcapError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<AnalyzerError> for CliError {
    fn from(e: AnalyzerError) -> Self {
        match e {
            AnalyzerError::Resolve(inner) => Self::Resolve(inner.to_string()),
            AnalyzerError::Config { .. } => Self::Config(e.to_string()),
            other => Self::Command(other.to_string()),
        }
    }
}
