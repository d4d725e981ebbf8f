use thiserror::Error;

use crate::{actions::CliActionError, exit_codes::KitdmExitCode};

/// Error types that can occur during CLI command execution
#[derive(Debug, Error)]
pub enum CliError {
    /// Error when an unsupported or undefined subcommand is encountered
    #[error("Undefined or unsupported subcommand {0}")]
    UnsupportedSubcommand(String),
    /// Error related to configuration loading or management
    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] crate::configuration::ConfigurationError),

    #[error("{0}")]
    ActionError(#[from] CliActionError),
}

impl CliError {
    /// Get the appropriate exit code for this error
    ///
    /// Action errors carry their own classification, everything else maps to
    /// usage or configuration errors.
    pub fn exit_code(&self) -> KitdmExitCode {
        match self {
            CliError::UnsupportedSubcommand(_) => KitdmExitCode::UsageError,
            CliError::ConfigurationError(_) => KitdmExitCode::ConfigError,
            CliError::ActionError(e) => e.exit_code(),
        }
    }
}
