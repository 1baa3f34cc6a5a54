// Error types for fixture builds
//
// This module defines the error types a build can report, each carrying a
// numeric code for structured reporting.

mod build;

pub use build::{log_build_error, BuildError, BuildErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
