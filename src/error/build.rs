// Build error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Build error code constants
///
/// Error code range: 3001
pub struct BuildErrorCodes {}

impl BuildErrorCodes {
    /// The root passed to a build is not a shared handle
    pub const ROOT_NOT_SHARED: i32 = 3001;
}

/// Log a build error with structured context
///
/// Logs the numeric code, the failing component and the message. The
/// logging is non-blocking and will not panic on failure.
pub fn log_build_error(err: &BuildError, context: &str) {
    error!(
        "Build error in {}: code={}, component=FixtureBuilder, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Fixture build errors
///
/// Builds report these through the test context's fatal path rather than
/// returning them.
///
/// Error code range: 3001
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The root must be a `Shared<T>` so populated fields stay visible to
    /// the caller
    RootNotShared { type_name: &'static str },
}

impl ErrorCode for BuildError {
    fn code(&self) -> i32 {
        match self {
            BuildError::RootNotShared { .. } => BuildErrorCodes::ROOT_NOT_SHARED,
        }
    }

    fn message(&self) -> String {
        match self {
            BuildError::RootNotShared { type_name } => format!(
                "fixture root must be a shared handle (Shared<T>). Actual type: {}",
                type_name
            ),
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuildError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for BuildError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_code() {
        let err = BuildError::RootNotShared { type_name: "Root" };
        assert_eq!(err.code(), BuildErrorCodes::ROOT_NOT_SHARED);
    }

    #[test]
    fn test_build_error_display() {
        let err = BuildError::RootNotShared {
            type_name: "my_tests::Root",
        };
        let display = format!("{}", err);
        assert!(display.contains("3001"));
        assert!(display.contains("my_tests::Root"));
        assert!(err.message().contains("shared handle"));
    }
}
