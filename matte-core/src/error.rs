//! Error types for the matte-core library.
//!
//! All fallible core operations return [`CoreResult`]. External process
//! failures carry the exit code and captured stderr so callers can surface
//! the real ffmpeg diagnostics instead of a generic message.

use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by the core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required external tool (ffmpeg, ffprobe) is not installed or not
    /// executable. Raised by the startup dependency check; fatal.
    #[error("External dependency not found: {0}")]
    DependencyNotFound(String),

    /// The external command exists but could not be spawned.
    #[error("Failed to start command '{command}': {message}")]
    CommandStart { command: String, message: String },

    /// The external command ran but exited with a non-zero status.
    #[error("Command '{command}' failed (exit code {exit_code:?}): {stderr}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a [`CoreError::CommandFailed`] from an exit status and stderr text.
pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        command: command.into(),
        exit_code: status.code(),
        stderr: stderr.into(),
    }
}

/// Builds a [`CoreError::CommandStart`] for a spawn failure.
pub fn command_start_error(command: impl Into<String>, message: impl ToString) -> CoreError {
    CoreError::CommandStart {
        command: command.into(),
        message: message.to_string(),
    }
}
