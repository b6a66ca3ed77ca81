//! Chat window for the session on screen
//!
//! Holds the message list of one session and the in-flight flag of the
//! current send. History comes from the backend when the window opens; new
//! turns are appended locally as they happen.
//!
//! A send is split in two halves so a host that renders while the request is
//! in flight can observe [`ChatWindow::is_loading`]:
//!
//! ```
//! use std::sync::Arc;
//! use sao_chat::backend::{FakeBackend, SessionBackend};
//! use sao_chat::conversation::ChatWindow;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let backend = Arc::new(FakeBackend::new());
//! let mut window = ChatWindow::open(backend, "1", "s-1").await;
//!
//! let query = window.submit("hello").unwrap();
//! assert!(window.is_loading());
//! let result = window.backend().send_message("1", "s-1", &query).await;
//! window.receive(result);
//! assert!(!window.is_loading());
//! assert_eq!(window.messages().len(), 2);
//! # }
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use crate::backend::{BackendError, Message, QueryAnswer, SessionBackend};

/// Assistant line shown when a message could not be delivered.
pub const CONNECTION_ERROR_REPLY: &str = "❌ Error connecting to server.";

/// Result of [`ChatWindow::send`].
#[derive(Debug)]
pub enum SendOutcome {
    /// Blank input, or a send was already in flight; nothing happened
    Ignored,
    /// The answer was appended
    Answered,
    /// The error line was appended
    Failed(BackendError),
}

/// Messages of the displayed session.
pub struct ChatWindow<B: SessionBackend + ?Sized> {
    backend: Arc<B>,
    user_id: String,
    session_id: String,
    messages: Vec<Message>,
    loading: bool,
}

impl<B: SessionBackend + ?Sized> ChatWindow<B> {
    /// Opens `session_id`, fetching its history. A history failure shows an
    /// empty conversation.
    pub async fn open(
        backend: Arc<B>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        let user_id = user_id.into();
        let session_id = session_id.into();
        let messages = backend.get_history(&user_id, &session_id).await;
        debug!(session_id = %session_id, count = messages.len(), "Opened conversation");

        Self {
            backend,
            user_id,
            session_id,
            messages,
            loading: false,
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether a send is waiting for its answer.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// First half of a send: appends the user message and marks the window
    /// loading. Returns the text to send, or `None` when the input is blank
    /// or another send is in flight.
    pub fn submit(&mut self, text: &str) -> Option<String> {
        if self.loading || text.trim().is_empty() {
            return None;
        }
        self.messages.push(Message::user(text));
        self.loading = true;
        Some(text.to_string())
    }

    /// Second half of a send: appends the answer, or the connection error
    /// line, and clears the loading flag.
    pub fn receive(&mut self, result: Result<QueryAnswer, BackendError>) -> SendOutcome {
        self.loading = false;
        match result {
            Ok(answer) => {
                self.messages.push(Message::assistant(answer.answer));
                SendOutcome::Answered
            }
            Err(e) => {
                warn!(session_id = %self.session_id, error = %e, "Message not delivered");
                self.messages.push(Message::assistant(CONNECTION_ERROR_REPLY));
                SendOutcome::Failed(e)
            }
        }
    }

    /// Sends `text` and waits for the answer.
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        let Some(query) = self.submit(text) else {
            return SendOutcome::Ignored;
        };
        let result = self
            .backend
            .send_message(&self.user_id, &self.session_id, &query)
            .await;
        self.receive(result)
    }
}
