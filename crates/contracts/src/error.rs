//! Layered error definitions
//!
//! Categorized by source: config / encode / transport

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Dialect Errors =====
    /// Event could not be encoded into a payload
    #[error("{dialect} encode error: {message}")]
    Encode { dialect: String, message: String },

    // ===== Transport Errors =====
    /// Backend rejected or failed a delivery
    #[error("backend '{backend}' send error: {message}")]
    TransportSend { backend: String, message: String },

    /// Backend could not be reached or set up
    #[error("backend '{backend}' connection error: {message}")]
    TransportConnection { backend: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create encode error
    pub fn encode(dialect: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encode {
            dialect: dialect.into(),
            message: message.into(),
        }
    }

    /// Create transport send error
    pub fn transport_send(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportSend {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create transport connection error
    pub fn transport_connection(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportConnection {
            backend: backend.into(),
            message: message.into(),
        }
    }
}
