//! Error handling utilities for the kitdm application.
//!
//! This module provides consistent error reporting so that every command reports
//! problems the same way. Diagnostics always go to stderr; stdout is reserved for
//! results.

use tracing::error;

/// Report an error consistently with user-facing output.
pub fn report_error<E: std::fmt::Display>(error: &E) {
    eprintln!("ERROR: {}", error);
}

/// Report an error with a custom user message for better clarity.
///
/// The technical details are logged, the user only sees the message.
pub fn report_error_with_message<E: std::fmt::Display>(error: &E, user_message: &str) {
    error!("{} (original error: {})", user_message, error);
    eprintln!("ERROR: {}", user_message);
}

/// Report a warning consistently with both logging and user-facing output.
pub fn report_warning<E: std::fmt::Display>(warning: &E) {
    tracing::warn!("{}", warning);
    eprintln!("WARNING: {}", warning);
}

/// A hint for errors users can usually fix themselves, based on the error text.
pub fn hint_for<E: std::fmt::Display>(error: &E) -> Option<&'static str> {
    let text = error.to_string().to_lowercase();

    if text.contains("http 401") || text.contains("http 403") {
        Some("The service rejected the request. Try again with --auth or check your permissions.")
    } else if text.contains("http 412") {
        Some("The element was modified concurrently. Fetch it again and retry.")
    } else if text.contains("http 404") {
        Some("The element does not exist. Check the identifier and relative path.")
    } else if text.contains("properties not found") {
        Some("Create a properties.json in the working directory or point KITDM_PROPERTIES to one.")
    } else {
        None
    }
}
