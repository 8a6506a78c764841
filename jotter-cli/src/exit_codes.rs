//! Exit code constants for CLI commands
//!
//! These constants define the standard exit codes used throughout the
//! application:
//! - 0: Success
//! - 1: Nothing matched or warnings found
//! - 2: Errors

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// No matches or warnings found
pub const EXIT_WARNING: i32 = 1;

/// Errors or critical failures
pub const EXIT_ERROR: i32 = 2;
