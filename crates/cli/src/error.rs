//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Event input could not be opened
    #[error("Failed to open event input {path}: {source}")]
    InputOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A line of the event input is not a valid event
    #[error("Invalid event on line {line}: {message}")]
    InvalidEvent { line: u64, message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_event(line: u64, message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            line,
            message: message.into(),
        }
    }
}
