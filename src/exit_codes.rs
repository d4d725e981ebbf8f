//! Custom exit codes for the kitdm application
//!
//! This module defines specific exit codes for different error conditions
//! to make scripting and automation easier.

/// Custom exit codes for kitdm
///
/// These codes follow the BSD sysexits.h conventions where possible:
/// - 0: Success
/// - 64-78: Standard exit codes from sysexits.h
/// - 100+: Custom application-specific codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum KitdmExitCode {
    /// Success (0) - Command completed successfully
    Success = exitcode::OK,

    /// Command line usage error (64) - User input error
    UsageError = exitcode::USAGE,

    /// Data format error (65) - Input data was incorrect
    DataError = exitcode::DATAERR,

    /// Cannot open input file (66) - Metadata or payload file not found
    NoInput = exitcode::NOINPUT,

    /// Internal software error (70) - Unexpected application error
    SoftwareError = exitcode::SOFTWARE,

    /// Cannot create output file (73) - Output file could not be written
    CantCreate = exitcode::CANTCREAT,

    /// Configuration error (78) - Missing or malformed properties
    ConfigError = exitcode::CONFIG,

    /// Authentication error (100) - Login or token issues
    AuthError = 100,

    /// Network error (101) - Connection or communication issues
    NetworkError = 101,

    /// API error (102) - Remote service returned an unexpected status
    ApiError = 102,

    /// Partial failure (103) - Some identifiers of a batch could not be processed
    PartialFailure = 103,
}

impl KitdmExitCode {
    /// Convert to numeric exit code
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Get descriptive message for the exit code
    pub fn message(&self) -> &'static str {
        match self {
            KitdmExitCode::Success => "Success",
            KitdmExitCode::UsageError => "Command line usage error",
            KitdmExitCode::DataError => "Data format error",
            KitdmExitCode::NoInput => "Cannot open input file",
            KitdmExitCode::SoftwareError => "Internal software error",
            KitdmExitCode::CantCreate => "Cannot create output file",
            KitdmExitCode::ConfigError => "Configuration error",
            KitdmExitCode::AuthError => "Authentication error",
            KitdmExitCode::NetworkError => "Network communication error",
            KitdmExitCode::ApiError => "Remote API error",
            KitdmExitCode::PartialFailure => "Some items could not be processed",
        }
    }
}

impl From<KitdmExitCode> for i32 {
    fn from(code: KitdmExitCode) -> Self {
        code.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysexits_values() {
        assert_eq!(KitdmExitCode::Success.code(), 0);
        assert_eq!(KitdmExitCode::UsageError.code(), 64);
        assert_eq!(KitdmExitCode::ConfigError.code(), 78);
        assert_eq!(i32::from(KitdmExitCode::ApiError), 102);
    }
}
