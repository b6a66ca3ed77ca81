//! Error types for SAO Chat
//!
//! This module defines the crate-level error type used by configuration
//! loading, command handlers and the session store, using `thiserror` for
//! ergonomic error handling. Backend failures have their own taxonomy in
//! [`crate::backend::BackendError`].

use thiserror::Error;

use crate::backend::BackendError;

/// Main error type for SAO Chat operations
#[derive(Error, Debug)]
pub enum SaoChatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A chat message was empty after trimming
    #[error("Message cannot be empty")]
    EmptyMessage,

    /// The referenced session is not in the local list
    #[error("Unknown session: {0}")]
    UnknownSession(String),

    /// A request to the chatbot backend failed
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for SAO Chat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
