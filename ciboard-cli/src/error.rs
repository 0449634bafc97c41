//! Error types for the ciboard CLI.

use std::fmt;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug)]
pub enum CliError {
    /// IO error (payload files, prompts)
    Io(std::io::Error),

    /// Configuration could not be loaded or is invalid
    Config(String),

    /// A job or action command failed
    Jobs(ciboard_jobs::JobsError),

    /// A client could not be built
    Client(String),

    /// Invalid argument
    InvalidArgument(String),

    /// The user declined a confirmation prompt
    Aborted,

    /// Some submissions of a batch failed; each was already reported
    Partial { failed: usize, total: usize },
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgument(_) => 2,
            CliError::Config(_) => 3,
            CliError::Aborted => 130,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Jobs(e) => write!(f, "{}", e),
            CliError::Client(msg) => write!(f, "Client error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Aborted => write!(f, "Aborted"),
            CliError::Partial { failed, total } => {
                write!(f, "{} of {} requests failed", failed, total)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            CliError::Jobs(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<ciboard_config::ConfigError> for CliError {
    fn from(e: ciboard_config::ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ciboard_jobs::JobsError> for CliError {
    fn from(e: ciboard_jobs::JobsError) -> Self {
        CliError::Jobs(e)
    }
}

impl From<ciboard_http::HttpClientError> for CliError {
    fn from(e: ciboard_http::HttpClientError) -> Self {
        CliError::Client(e.to_string())
    }
}

impl From<ciboard_taskcluster::TaskclusterError> for CliError {
    fn from(e: ciboard_taskcluster::TaskclusterError) -> Self {
        CliError::Client(e.to_string())
    }
}

impl From<ciboard_perf::PerfError> for CliError {
    fn from(e: ciboard_perf::PerfError) -> Self {
        match e {
            ciboard_perf::PerfError::InvalidQuery(msg) => CliError::InvalidArgument(msg),
            other => CliError::Client(other.to_string()),
        }
    }
}
