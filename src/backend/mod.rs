//! Chatbot backend abstraction
//!
//! The backend is the system of record for sessions and messages. This module
//! defines the [`SessionBackend`] trait the rest of the crate talks to, the
//! [`BackendError`] taxonomy, and two implementations:
//!
//! - [`HttpBackend`]: the real HTTP/JSON client
//! - [`FakeBackend`]: an in-memory stand-in for tests and demos

use async_trait::async_trait;
use thiserror::Error;

pub mod fake;
pub mod http;
pub mod types;

pub use fake::FakeBackend;
pub use http::HttpBackend;
pub use types::{
    parse_timestamp, ApiResponse, HistoryData, Message, QueryAnswer, QueryRequest, Role, Session,
    SessionUpdate,
};

/// Message shown when a request never produced a response.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error or server unreachable";

/// Errors that can occur while talking to the backend.
///
/// The variants follow the three failure shapes the backend produces:
/// connectivity failures, `success: false` envelopes, and non-2xx statuses
/// with or without a parseable body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The request never reached the server or no response arrived.
    #[error("Network error or server unreachable: {0}")]
    Network(String),

    /// The backend answered 2xx but reported `success: false`.
    #[error("Backend rejected request: {}", .message.as_deref().unwrap_or("no reason given"))]
    Rejected {
        /// Message from the response envelope
        message: Option<String>,
    },

    /// The backend answered with a non-2xx status.
    #[error("Request failed with status {}{}", .status, .message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Status {
        /// HTTP status code
        status: u16,
        /// `message` field of the error body, when present
        message: Option<String>,
    },

    /// A 2xx body could not be decoded.
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// The user id cannot be sent as an integer.
    #[error("User id must be numeric, got {0:?}")]
    InvalidUserId(String),

    /// The configured base URL cannot carry endpoint paths.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl BackendError {
    /// Text suitable for a user-facing alert.
    ///
    /// The backend's own message is used verbatim when it supplied one.
    ///
    /// # Examples
    ///
    /// ```
    /// use sao_chat::backend::BackendError;
    ///
    /// let err = BackendError::Status { status: 404, message: Some("Session not found".into()) };
    /// assert_eq!(err.user_message(), "Session not found");
    ///
    /// let err = BackendError::Status { status: 502, message: None };
    /// assert_eq!(err.user_message(), "Request failed with status 502");
    /// ```
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            Self::Rejected { message: Some(m) } | Self::Status { message: Some(m), .. } => {
                m.clone()
            }
            Self::Rejected { message: None } => "Request was rejected by the server".to_string(),
            Self::Status {
                status,
                message: None,
            } => format!("Request failed with status {}", status),
            Self::Decode(_) => "Unexpected response from server".to_string(),
            Self::InvalidUserId(id) => format!("Invalid user id: {}", id),
            Self::InvalidUrl(_) => "Invalid backend URL".to_string(),
        }
    }
}

/// Converts the string user id held by the client to the integer the query
/// endpoint expects.
pub fn numeric_user_id(user_id: &str) -> Result<i64, BackendError> {
    user_id
        .trim()
        .parse::<i64>()
        .map_err(|_| BackendError::InvalidUserId(user_id.to_string()))
}

/// Operations the client delegates to the chatbot backend.
///
/// Implementations must not retry; every call is a single attempt.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Lists all sessions of a user, in backend order.
    async fn list_sessions(&self, user_id: &str) -> Result<Vec<Session>, BackendError>;

    /// Fetches the messages of a session.
    ///
    /// Never fails: any error is reported as an empty history.
    async fn get_history(&self, user_id: &str, session_id: &str) -> Vec<Message>;

    /// Sends a user message. Creates the session if the id is new.
    async fn send_message(
        &self,
        user_id: &str,
        session_id: &str,
        query: &str,
    ) -> Result<QueryAnswer, BackendError>;

    /// Deletes a session.
    async fn delete_session(&self, user_id: &str, session_id: &str) -> Result<(), BackendError>;

    /// Applies a partial update (title and/or pinned flag) to a session.
    async fn update_session(
        &self,
        user_id: &str,
        session_id: &str,
        update: &SessionUpdate,
    ) -> Result<(), BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_backend_text() {
        let err = BackendError::Rejected {
            message: Some("Session is locked".to_string()),
        };
        assert_eq!(err.user_message(), "Session is locked");
    }

    #[test]
    fn test_user_message_generic_fallbacks() {
        assert_eq!(
            BackendError::Network("connection refused".to_string()).user_message(),
            NETWORK_ERROR_MESSAGE
        );
        assert_eq!(
            BackendError::Status {
                status: 500,
                message: None
            }
            .user_message(),
            "Request failed with status 500"
        );
    }

    #[test]
    fn test_status_display_includes_message() {
        let err = BackendError::Status {
            status: 404,
            message: Some("not found".to_string()),
        };
        assert_eq!(err.to_string(), "Request failed with status 404: not found");

        let err = BackendError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "Request failed with status 500");
    }

    #[test]
    fn test_numeric_user_id() {
        assert_eq!(numeric_user_id("1").unwrap(), 1);
        assert_eq!(numeric_user_id(" 42 ").unwrap(), 42);
        assert_eq!(
            numeric_user_id("abc"),
            Err(BackendError::InvalidUserId("abc".to_string()))
        );
    }

    #[test]
    fn test_backend_trait_is_object_safe() {
        let _boxed: Box<dyn SessionBackend> = Box::new(FakeBackend::new());
    }
}
