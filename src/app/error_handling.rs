//! Error handling utilities
//!
//! Centralized reporting of errors that end the process.

use crate::error::PacemakerError;
use tracing::error;

/// Exit code for anything that is not a `PacemakerError`
const GENERAL_ERROR: i32 = 1;

/// Exit code a fatal error maps to
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<PacemakerError>()
        .map_or(GENERAL_ERROR, PacemakerError::exit_code)
}

/// Report a fatal error and exit with its status code
///
/// `PacemakerError`s print their user message; with `verbose >= 1` the full
/// error chain follows.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);

    match error.downcast_ref::<PacemakerError>() {
        Some(pacemaker_err) => eprintln!("{}", pacemaker_err.user_message()),
        None => eprintln!("Error: {error}"),
    }

    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    std::process::exit(exit_code_for(&error))
}
