//! HTTP/JSON client for the chatbot backend.
//!
//! All endpoints share a single configured base URL. Session and history
//! endpoints live under the chatbot scope (`/chatbot` by default); the query
//! endpoint sits directly under the base.
//!
//! # Example
//!
//! ```rust,no_run
//! use sao_chat::backend::{HttpBackend, SessionBackend};
//! use sao_chat::config::BackendConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = HttpBackend::new(&BackendConfig::default())?;
//!     let sessions = backend.list_sessions("1").await?;
//!     println!("{} sessions", sessions.len());
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use super::types::{ApiResponse, HistoryData, Message, QueryAnswer, QueryRequest, Session, SessionUpdate};
use super::{numeric_user_id, BackendError, SessionBackend};
use crate::config::BackendConfig;

/// Chatbot backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    chatbot_scope: Vec<String>,
}

impl HttpBackend {
    /// Creates a client from the backend configuration.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidUrl` if the base URL does not parse or
    /// cannot carry a path, and `BackendError::Network` if the HTTP client
    /// cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            chatbot_scope: scope_segments(&config.chatbot_scope),
        })
    }

    /// Base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint<'a, I>(&self, segments: I) -> Url
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn scoped<'a>(&'a self, segments: &[&'a str]) -> Url {
        self.endpoint(
            self.chatbot_scope
                .iter()
                .map(String::as_str)
                .chain(segments.iter().copied()),
        )
    }

    fn sessions_url(&self, user_id: &str) -> Url {
        self.scoped(&["sessions", user_id])
    }

    fn session_url(&self, user_id: &str, session_id: &str) -> Url {
        self.scoped(&["sessions", user_id, session_id])
    }

    fn history_url(&self, user_id: &str, session_id: &str) -> Url {
        self.scoped(&["history", user_id, session_id])
    }

    fn build_request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        debug!(method = %method, url = %url, "Backend request");
        self.client
            .request(method, url)
            .header("Content-Type", "application/json")
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, BackendError> {
        request
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))
    }
}

/// Splits the chatbot scope into path segments; blank means no scope.
fn scope_segments(scope: &str) -> Vec<String> {
    scope
        .trim()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pulls the optional `message` field out of an error body.
fn error_body_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .filter(|m| !m.is_empty())
}

/// Reads a `{success, message, data}` envelope, mapping non-2xx statuses and
/// undecodable bodies to [`BackendError`].
async fn read_envelope<T: DeserializeOwned>(
    response: Response,
) -> Result<ApiResponse<T>, BackendError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BackendError::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(BackendError::Status {
            status: status.as_u16(),
            message: error_body_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Like [`read_envelope`] but also turns `success: false` into an error.
async fn read_success<T: DeserializeOwned>(
    response: Response,
) -> Result<Option<T>, BackendError> {
    let envelope = read_envelope::<T>(response).await?;
    if envelope.success {
        Ok(envelope.data)
    } else {
        Err(BackendError::Rejected {
            message: envelope.message,
        })
    }
}

#[async_trait]
impl SessionBackend for HttpBackend {
    async fn list_sessions(&self, user_id: &str) -> Result<Vec<Session>, BackendError> {
        let response = self
            .send(self.build_request(Method::GET, self.sessions_url(user_id)))
            .await?;
        let sessions = read_success::<Vec<Session>>(response)
            .await?
            .unwrap_or_default();
        debug!(user_id = %user_id, count = sessions.len(), "Listed sessions");
        Ok(sessions)
    }

    async fn get_history(&self, user_id: &str, session_id: &str) -> Vec<Message> {
        let request = self.build_request(Method::GET, self.history_url(user_id, session_id));
        let response = match self.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "History unavailable, showing empty conversation");
                return Vec::new();
            }
        };

        match read_envelope::<HistoryData>(response).await {
            Ok(envelope) => envelope.data.unwrap_or_default().messages,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "History unavailable, showing empty conversation");
                Vec::new()
            }
        }
    }

    async fn send_message(
        &self,
        user_id: &str,
        session_id: &str,
        query: &str,
    ) -> Result<QueryAnswer, BackendError> {
        let body = QueryRequest {
            user_id: numeric_user_id(user_id)?,
            session_id: session_id.to_string(),
            query: query.to_string(),
        };

        let response = self
            .send(self.build_request(Method::POST, self.endpoint(["query"])).json(&body))
            .await?;
        let answer = read_success::<QueryAnswer>(response)
            .await?
            .ok_or_else(|| BackendError::Decode("response has no data".to_string()))?;

        info!(session_id = %session_id, "Received answer");
        Ok(answer)
    }

    async fn delete_session(&self, user_id: &str, session_id: &str) -> Result<(), BackendError> {
        let response = self
            .send(self.build_request(Method::DELETE, self.session_url(user_id, session_id)))
            .await?;
        read_success::<serde_json::Value>(response).await?;
        info!(session_id = %session_id, "Deleted session");
        Ok(())
    }

    async fn update_session(
        &self,
        user_id: &str,
        session_id: &str,
        update: &SessionUpdate,
    ) -> Result<(), BackendError> {
        let response = self
            .send(
                self.build_request(Method::PATCH, self.session_url(user_id, session_id))
                    .json(update),
            )
            .await?;
        read_success::<serde_json::Value>(response).await?;
        debug!(session_id = %session_id, ?update, "Updated session");
        Ok(())
    }
}
