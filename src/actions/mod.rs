use thiserror::Error;

use crate::access::ApiError;
use crate::documents::DocumentError;
use crate::exit_codes::KitdmExitCode;
use crate::services::ServiceError;
use std::path::PathBuf;

pub mod base_repo;
pub mod config;
pub mod metastore;
pub mod pid;
pub mod utils;

#[derive(Debug, Error)]
pub enum CliActionError {
    #[error("{0}")]
    ServiceError(#[from] ServiceError),

    #[error("{0}")]
    ConfigurationError(#[from] crate::configuration::ConfigurationError),

    #[error("{0}")]
    FormattingError(#[from] crate::format::FormattingError),

    #[error("{0}")]
    TransportError(#[from] crate::http_utils::TransportError),

    #[error("{0}")]
    AuthError(#[from] crate::session::AuthError),

    #[error("failed to write {path:?}: {source}")]
    OutputError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Missing required argument: {0}")]
    MissingRequiredArgument(String),

    #[error("{failed} of {total} operations failed")]
    PartialFailure { failed: usize, total: usize },

    #[error("Undefined or unsupported subcommand {0}")]
    UnsupportedSubcommand(String),
}

fn api_exit_code(error: &ApiError) -> KitdmExitCode {
    match error {
        ApiError::Transport(_) => KitdmExitCode::NetworkError,
        ApiError::UnexpectedStatus { .. } => KitdmExitCode::ApiError,
        ApiError::Authentication(_) => KitdmExitCode::AuthError,
        ApiError::Json(_) | ApiError::InvalidHeader { .. } => KitdmExitCode::DataError,
        ApiError::Unsupported(_) => KitdmExitCode::UsageError,
    }
}

impl CliActionError {
    pub fn exit_code(&self) -> KitdmExitCode {
        match self {
            CliActionError::ServiceError(ServiceError::Document(DocumentError::NotFound { .. })) => {
                KitdmExitCode::NoInput
            }
            CliActionError::ServiceError(ServiceError::Document(_)) => KitdmExitCode::DataError,
            CliActionError::ServiceError(ServiceError::InvalidArgument(_)) => KitdmExitCode::UsageError,
            CliActionError::ServiceError(ServiceError::Api(e)) => api_exit_code(e),
            CliActionError::ConfigurationError(_) => KitdmExitCode::ConfigError,
            CliActionError::FormattingError(_) => KitdmExitCode::DataError,
            CliActionError::TransportError(_) => KitdmExitCode::NetworkError,
            CliActionError::AuthError(_) => KitdmExitCode::AuthError,
            CliActionError::OutputError { .. } => KitdmExitCode::CantCreate,
            CliActionError::IoError(_) => KitdmExitCode::SoftwareError,
            CliActionError::MissingRequiredArgument(_) => KitdmExitCode::UsageError,
            CliActionError::PartialFailure { .. } => KitdmExitCode::PartialFailure,
            CliActionError::UnsupportedSubcommand(_) => KitdmExitCode::UsageError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::{Method, StatusCode};

    #[test]
    fn test_missing_input_file() {
        let error = CliActionError::from(ServiceError::Document(DocumentError::NotFound {
            path: PathBuf::from("resource.json"),
        }));
        assert_eq!(error.exit_code(), KitdmExitCode::NoInput);
    }

    #[test]
    fn test_remote_failures() {
        let status = CliActionError::from(ServiceError::Api(ApiError::UnexpectedStatus {
            method: Method::PUT,
            url: "http://repo.example.org/api/v1/dataresources/1".into(),
            status: StatusCode::PRECONDITION_FAILED,
            body: String::new(),
        }));
        assert_eq!(status.exit_code(), KitdmExitCode::ApiError);

        let auth = CliActionError::from(ServiceError::Api(ApiError::Authentication(
            crate::session::AuthError::NotConfigured,
        )));
        assert_eq!(auth.exit_code(), KitdmExitCode::AuthError);

        let unsupported = CliActionError::from(ServiceError::Api(ApiError::Unsupported("patch".into())));
        assert_eq!(unsupported.exit_code(), KitdmExitCode::UsageError);
    }
}
