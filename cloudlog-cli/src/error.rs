//! CLI-specific error types and exit code mapping

use cloudlog_analyzer::AnalyzerError;
use cloudlog_core::error::CloudlogError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed (bad flag value, unknown section).
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from cloudlog-core.
    #[error("{0}")]
    Core(#[from] CloudlogError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                          |
    /// |------|----------------------------------|
    /// | 0    | Success                          |
    /// | 1    | General / command error          |
    /// | 2    | Configuration error              |
    /// | 4    | Collector failed (no fallback)   |
    /// | 5    | Storage read or write failed     |
    /// | 10   | IO error                         |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) => 1,
            Self::Core(inner) => match inner {
                CloudlogError::Config(_) => 2,
                CloudlogError::Collector(_) => 4,
                CloudlogError::Storage(_) => 5,
                CloudlogError::Io(_) => 10,
            },
        }
    }
}

impl From<AnalyzerError> for CliError {
    fn from(e: AnalyzerError) -> Self {
        Self::Core(e.into())
    }
}
