//! In-memory fake backend for unit and integration tests
//!
//! [`FakeBackend`] implements [`SessionBackend`] over a mutex-guarded session
//! list, records every call it receives, and can be told to fail specific
//! operations. It behaves like the real backend where the client can observe
//! it: sending to an unknown session id creates the session, updating or
//! deleting an unknown id is a 404.
//!
//! # Example
//!
//! ```
//! use sao_chat::backend::fake::{BackendOp, FakeBackend};
//! use sao_chat::backend::{BackendError, Session, SessionBackend};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let backend = FakeBackend::with_sessions(vec![Session::new("a", "Budget", "2025-01-01")]);
//! backend.fail(BackendOp::Delete, BackendError::Status { status: 500, message: None });
//!
//! assert!(backend.delete_session("1", "a").await.is_err());
//! assert_eq!(backend.call_count(BackendOp::Delete), 1);
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::types::{Message, QueryAnswer, Session, SessionUpdate};
use super::{numeric_user_id, BackendError, SessionBackend};

/// Backend operations, used to inject failures and count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    /// `list_sessions`
    List,
    /// `get_history`
    History,
    /// `send_message`
    Send,
    /// `delete_session`
    Delete,
    /// `update_session`
    Update,
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Which operation was invoked
    pub op: BackendOp,
    /// User id argument
    pub user_id: String,
    /// Session id argument, when the operation takes one
    pub session_id: Option<String>,
    /// Query text or update body, when the operation carries one
    pub payload: Option<String>,
}

#[derive(Debug, Default)]
struct FakeState {
    sessions: Vec<Session>,
    messages: HashMap<String, Vec<Message>>,
    failures: HashMap<BackendOp, BackendError>,
    calls: Vec<RecordedCall>,
}

/// In-process fake of the chatbot backend.
#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with sessions, listed in the given order.
    pub fn with_sessions(sessions: Vec<Session>) -> Self {
        let backend = Self::new();
        backend.lock().sessions = sessions;
        backend
    }

    /// Seeds the message history of a session.
    pub fn set_history(&self, session_id: &str, messages: Vec<Message>) {
        self.lock()
            .messages
            .insert(session_id.to_string(), messages);
    }

    /// Makes every subsequent call of `op` fail with `error`.
    pub fn fail(&self, op: BackendOp, error: BackendError) {
        self.lock().failures.insert(op, error);
    }

    /// Stops failing `op`.
    pub fn recover(&self, op: BackendOp) {
        self.lock().failures.remove(&op);
    }

    /// Snapshot of the backend's session list.
    pub fn sessions(&self) -> Vec<Session> {
        self.lock().sessions.clone()
    }

    /// All calls received so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Number of calls received for `op`.
    pub fn call_count(&self, op: BackendOp) -> usize {
        self.lock().calls.iter().filter(|c| c.op == op).count()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(
        &self,
        op: BackendOp,
        user_id: &str,
        session_id: Option<&str>,
        payload: Option<String>,
    ) -> MutexGuard<'_, FakeState> {
        let mut state = self.lock();
        state.calls.push(RecordedCall {
            op,
            user_id: user_id.to_string(),
            session_id: session_id.map(str::to_string),
            payload,
        });
        state
    }
}

fn not_found() -> BackendError {
    BackendError::Status {
        status: 404,
        message: Some("Session not found".to_string()),
    }
}

#[async_trait]
impl SessionBackend for FakeBackend {
    async fn list_sessions(&self, user_id: &str) -> Result<Vec<Session>, BackendError> {
        let state = self.record(BackendOp::List, user_id, None, None);
        if let Some(err) = state.failures.get(&BackendOp::List) {
            return Err(err.clone());
        }
        Ok(state.sessions.clone())
    }

    async fn get_history(&self, user_id: &str, session_id: &str) -> Vec<Message> {
        let state = self.record(BackendOp::History, user_id, Some(session_id), None);
        if state.failures.contains_key(&BackendOp::History) {
            return Vec::new();
        }
        state.messages.get(session_id).cloned().unwrap_or_default()
    }

    async fn send_message(
        &self,
        user_id: &str,
        session_id: &str,
        query: &str,
    ) -> Result<QueryAnswer, BackendError> {
        let mut state = self.record(
            BackendOp::Send,
            user_id,
            Some(session_id),
            Some(query.to_string()),
        );
        if let Some(err) = state.failures.get(&BackendOp::Send) {
            return Err(err.clone());
        }
        numeric_user_id(user_id)?;

        if !state.sessions.iter().any(|s| s.session_id == session_id) {
            let title: String = query.chars().take(40).collect();
            state.sessions.insert(
                0,
                Session::new(session_id, title, Utc::now().to_rfc3339()),
            );
        }

        let answer = format!("Echo: {}", query);
        let history = state.messages.entry(session_id.to_string()).or_default();
        history.push(Message::user(query));
        history.push(Message::assistant(answer.clone()));

        Ok(QueryAnswer {
            answer,
            extra: serde_json::Map::new(),
        })
    }

    async fn delete_session(&self, user_id: &str, session_id: &str) -> Result<(), BackendError> {
        let mut state = self.record(BackendOp::Delete, user_id, Some(session_id), None);
        if let Some(err) = state.failures.get(&BackendOp::Delete) {
            return Err(err.clone());
        }
        let before = state.sessions.len();
        state.sessions.retain(|s| s.session_id != session_id);
        if state.sessions.len() == before {
            return Err(not_found());
        }
        state.messages.remove(session_id);
        Ok(())
    }

    async fn update_session(
        &self,
        user_id: &str,
        session_id: &str,
        update: &SessionUpdate,
    ) -> Result<(), BackendError> {
        let payload = serde_json::to_string(update).ok();
        let mut state = self.record(BackendOp::Update, user_id, Some(session_id), payload);
        if let Some(err) = state.failures.get(&BackendOp::Update) {
            return Err(err.clone());
        }
        let session = state
            .sessions
            .iter_mut()
            .find(|s| s.session_id == session_id)
            .ok_or_else(not_found)?;
        if let Some(title) = &update.title {
            session.title = title.clone();
        }
        if let Some(pinned) = update.is_pinned {
            session.is_pinned = pinned;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_to_new_id_creates_session() {
        let backend = FakeBackend::new();
        let answer = backend.send_message("1", "fresh", "hello").await.unwrap();
        assert_eq!(answer.answer, "Echo: hello");

        let sessions = backend.list_sessions("1").await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].session_id, "fresh");
        assert_eq!(backend.get_history("1", "fresh").await.len(), 2);
    }

    #[tokio::test]
    async fn test_send_rejects_non_numeric_user() {
        let backend = FakeBackend::new();
        let err = backend.send_message("alice", "s", "hi").await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidUserId(_)));
        assert!(backend.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_session_is_not_found() {
        let backend = FakeBackend::new();
        let err = backend
            .update_session("1", "missing", &SessionUpdate::pinned(true))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Session not found");
    }

    #[tokio::test]
    async fn test_failure_injection_and_recovery() {
        let backend = FakeBackend::with_sessions(vec![Session::new("a", "A", "2025-01-01")]);
        backend.fail(BackendOp::List, BackendError::Network("down".to_string()));
        assert!(backend.list_sessions("1").await.is_err());

        backend.recover(BackendOp::List);
        assert_eq!(backend.list_sessions("1").await.unwrap().len(), 1);
        assert_eq!(backend.call_count(BackendOp::List), 2);
    }

    #[tokio::test]
    async fn test_history_failure_is_empty() {
        let backend = FakeBackend::new();
        backend.set_history("s", vec![Message::user("hi")]);
        backend.fail(
            BackendOp::History,
            BackendError::Status {
                status: 500,
                message: None,
            },
        );
        assert!(backend.get_history("1", "s").await.is_empty());
    }

    #[tokio::test]
    async fn test_update_records_payload() {
        let backend = FakeBackend::with_sessions(vec![Session::new("a", "A", "2025-01-01")]);
        backend
            .update_session("1", "a", &SessionUpdate::title("Renamed"))
            .await
            .unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].payload.as_deref(), Some(r#"{"title":"Renamed"}"#));
        assert_eq!(backend.sessions()[0].title, "Renamed");
    }
}
