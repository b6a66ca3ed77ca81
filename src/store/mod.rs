//! Session store and backend synchronization
//!
//! [`SessionStore`] holds the client's view of one user's chat sessions and
//! keeps it consistent with the backend, which remains the system of record:
//!
//! - `load` replaces the whole list with the backend's list
//! - `create` generates the session id locally and sends the first message
//! - `rename` and `set_pinned` patch the local list first, then call the
//!   backend; failures are logged and leave the patch in place
//! - `delete` asks for confirmation, then removes the entry only once the
//!   backend confirms
//!
//! A rename or pin whose backend call failed leaves the session marked
//! [`SyncState::Unsynced`]; [`SessionStore::reconcile`] reloads from the
//! backend and clears those marks.
//!
//! The store is mutated through `&mut self` only. Each optimistic patch is
//! applied before its request is awaited, so when several mutations are
//! issued back to back the last applied patch wins. The async mutations are
//! built from a local half (`apply_rename`, `apply_pinned`) and a settling
//! half (`settle`, `settle_delete`); a host that must keep drawing the list
//! while a request is in flight calls the halves itself around the backend
//! call.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::backend::{BackendError, QueryAnswer, Session, SessionBackend, SessionUpdate};
use crate::error::SaoChatError;

pub mod editor;
pub mod menu;
pub mod ordering;
pub mod sidebar;

pub use editor::RenameEditor;
pub use menu::{MenuAction, MenuRegion, MenuState};
pub use sidebar::{ActionOutcome, SessionSidebar};

/// Prompt shown before a session is deleted.
pub const DELETE_PROMPT: &str = "Do you want to delete this chat?";

/// Blocking yes/no prompt shown before destructive operations.
#[cfg_attr(test, mockall::automock)]
pub trait Confirmation {
    /// Returns true if the user agreed.
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Confirmation that always agrees, for non-interactive use (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirmation for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Whether the local copy of a session is known to match the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SyncState {
    /// No failed mutation since the last load
    #[default]
    Synced,
    /// A rename or pin was applied locally but the backend call failed
    Unsynced {
        /// User-facing reason of the last failure
        reason: String,
    },
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synced => write!(f, "synced"),
            Self::Unsynced { reason } => write!(f, "unsynced ({})", reason),
        }
    }
}

/// Result of an optimistic rename or pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Input was rejected locally; nothing changed and no request was sent
    Ignored,
    /// Applied locally and confirmed by the backend
    Synced,
    /// Applied locally; the backend call failed and the session is now unsynced
    Unsynced(BackendError),
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user declined; nothing was sent
    Declined,
    /// Removed locally after the backend confirmed
    Deleted {
        /// The deleted session was the one on screen; go back to the root view
        navigate_to_root: bool,
    },
    /// The backend refused or could not be reached; the list is unchanged
    Failed {
        /// Text to show the user
        reason: String,
    },
}

/// A session started by [`SessionStore::create`].
#[derive(Debug, Clone)]
pub struct CreatedSession {
    /// Client-generated id; navigate here
    pub session_id: String,
    /// The backend's answer to the first message
    pub answer: QueryAnswer,
}

/// Generates a fresh session id.
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Client-side view of one user's sessions.
pub struct SessionStore<B: SessionBackend + ?Sized> {
    backend: Arc<B>,
    user_id: String,
    sessions: Vec<Session>,
    current: Option<String>,
    sync: HashMap<String, SyncState>,
    normalize_on_load: bool,
}

impl<B: SessionBackend + ?Sized> SessionStore<B> {
    /// Creates an empty store for `user_id`.
    pub fn new(backend: Arc<B>, user_id: impl Into<String>) -> Self {
        Self {
            backend,
            user_id: user_id.into(),
            sessions: Vec::new(),
            current: None,
            sync: HashMap::new(),
            normalize_on_load: false,
        }
    }

    /// Re-applies the list ordering after every load instead of trusting the
    /// backend's order.
    pub fn with_normalize_on_load(mut self, normalize: bool) -> Self {
        self.normalize_on_load = normalize;
        self
    }

    /// The backend this store talks to.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Owner of the sessions.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Sessions in display order.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Looks up a session by id.
    pub fn get(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.session_id == session_id)
    }

    /// Id of the session currently on screen.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Records which session is on screen (`None` for the root view).
    pub fn set_current(&mut self, session_id: Option<String>) {
        self.current = session_id;
    }

    /// Sync state of a session. Unknown ids are reported as synced.
    pub fn sync_state(&self, session_id: &str) -> SyncState {
        self.sync.get(session_id).cloned().unwrap_or_default()
    }

    /// Sessions whose local copy diverged from the backend, with the reason.
    pub fn unsynced(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = self
            .sessions
            .iter()
            .filter_map(|s| match self.sync.get(&s.session_id) {
                Some(SyncState::Unsynced { reason }) => {
                    Some((s.session_id.as_str(), reason.as_str()))
                }
                _ => None,
            })
            .collect();
        out.sort_unstable();
        out
    }

    /// Replaces the whole list with the backend's list.
    ///
    /// The backend's order is kept unless normalization was enabled. On
    /// failure the local list is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the backend error; it has already been logged.
    pub async fn load(&mut self) -> Result<&[Session], BackendError> {
        match self.backend.list_sessions(&self.user_id).await {
            Ok(mut sessions) => {
                if self.normalize_on_load {
                    ordering::sort_sessions(&mut sessions);
                }
                debug!(user_id = %self.user_id, count = sessions.len(), "Loaded sessions");
                self.sessions = sessions;
                self.sync.clear();
                Ok(&self.sessions)
            }
            Err(e) => {
                error!(user_id = %self.user_id, error = %e, "Failed to load sessions");
                Err(e)
            }
        }
    }

    /// Reconciliation hook: reloads from the backend, discarding every local
    /// divergence.
    ///
    /// # Errors
    ///
    /// Returns the backend error; unsynced marks are kept in that case.
    pub async fn reconcile(&mut self) -> Result<(), BackendError> {
        let pending = self.sync.len();
        self.load().await?;
        if pending > 0 {
            info!(discarded = pending, "Reconciled session list with backend");
        }
        Ok(())
    }

    /// Starts a new session with its first message.
    ///
    /// The id is generated before the backend is contacted and returned once
    /// the backend answered, so the caller can navigate to it. No list entry
    /// is added; the session appears on the next load.
    ///
    /// # Errors
    ///
    /// Returns `SaoChatError::EmptyMessage` for blank input (nothing is sent)
    /// and `SaoChatError::Backend` when the message could not be delivered.
    pub async fn create(&mut self, message: &str) -> Result<CreatedSession, SaoChatError> {
        if message.trim().is_empty() {
            return Err(SaoChatError::EmptyMessage);
        }

        let mut session_id = new_session_id();
        while self.get(&session_id).is_some() {
            session_id = new_session_id();
        }

        match self
            .backend
            .send_message(&self.user_id, &session_id, message)
            .await
        {
            Ok(answer) => {
                info!(session_id = %session_id, "Started new session");
                self.current = Some(session_id.clone());
                Ok(CreatedSession { session_id, answer })
            }
            Err(e) => {
                warn!(error = %e, "Failed to start chat");
                Err(e.into())
            }
        }
    }

    /// Renames a session.
    ///
    /// Blank titles are ignored. Otherwise the local title changes at once
    /// and is kept even if the backend call fails. Ordering is unaffected.
    pub async fn rename(&mut self, session_id: &str, new_title: &str) -> MutationOutcome {
        let Some(update) = self.apply_rename(session_id, new_title) else {
            return MutationOutcome::Ignored;
        };
        let result = self.send_update(session_id, &update).await;
        self.settle(session_id, result)
    }

    /// Pins or unpins a session and re-sorts the list immediately.
    ///
    /// Setting the value a session already has is harmless: the list ends up
    /// in the same state.
    pub async fn set_pinned(&mut self, session_id: &str, pinned: bool) -> MutationOutcome {
        let update = self.apply_pinned(session_id, pinned);
        let result = self.send_update(session_id, &update).await;
        self.settle(session_id, result)
    }

    /// Flips the pinned flag of a session.
    pub async fn toggle_pin(&mut self, session_id: &str) -> MutationOutcome {
        let pinned = self.get(session_id).map(|s| s.is_pinned).unwrap_or(false);
        self.set_pinned(session_id, !pinned).await
    }

    /// Local half of a rename: patches the title and returns the update to
    /// send, or `None` for a blank title.
    ///
    /// Hosts that keep rendering while the request is in flight send the
    /// update themselves and hand the result to [`settle`](Self::settle).
    pub fn apply_rename(&mut self, session_id: &str, new_title: &str) -> Option<SessionUpdate> {
        let title = new_title.trim();
        if title.is_empty() {
            return None;
        }

        if let Some(session) = self.session_mut(session_id) {
            session.title = title.to_string();
        }
        Some(SessionUpdate::title(title))
    }

    /// Local half of a pin change: sets the flag, re-sorts, and returns the
    /// update to send.
    pub fn apply_pinned(&mut self, session_id: &str, pinned: bool) -> SessionUpdate {
        if let Some(session) = self.session_mut(session_id) {
            session.is_pinned = pinned;
        }
        ordering::sort_sessions(&mut self.sessions);
        SessionUpdate::pinned(pinned)
    }

    /// Records the backend's answer to an applied rename or pin.
    ///
    /// A failure keeps the local change and marks the session unsynced.
    pub fn settle(
        &mut self,
        session_id: &str,
        result: Result<(), BackendError>,
    ) -> MutationOutcome {
        match result {
            Ok(()) => {
                debug!(session_id = %session_id, "Session update confirmed");
                MutationOutcome::Synced
            }
            Err(e) => {
                warn!(
                    session_id = %session_id,
                    error = %e,
                    "Session update failed; keeping local change"
                );
                self.sync.insert(
                    session_id.to_string(),
                    SyncState::Unsynced {
                        reason: e.user_message(),
                    },
                );
                MutationOutcome::Unsynced(e)
            }
        }
    }

    /// Deletes a session after explicit confirmation.
    ///
    /// The entry is removed only after the backend confirms. If it was the
    /// session on screen, the outcome tells the caller to go back to the root
    /// view.
    pub async fn delete<C>(&mut self, session_id: &str, confirmation: &C) -> DeleteOutcome
    where
        C: Confirmation + ?Sized,
    {
        if !confirmation.confirm(DELETE_PROMPT) {
            debug!(session_id = %session_id, "Delete declined");
            return DeleteOutcome::Declined;
        }

        let result = self
            .backend
            .delete_session(&self.user_id, session_id)
            .await;
        self.settle_delete(session_id, result)
    }

    /// Records the backend's answer to a confirmed delete.
    ///
    /// The list is untouched until this is called, so it can be rendered
    /// while the request is in flight.
    pub fn settle_delete(
        &mut self,
        session_id: &str,
        result: Result<(), BackendError>,
    ) -> DeleteOutcome {
        match result {
            Ok(()) => {
                self.sessions.retain(|s| s.session_id != session_id);
                self.sync.remove(session_id);
                let navigate_to_root = self.current.as_deref() == Some(session_id);
                if navigate_to_root {
                    self.current = None;
                }
                info!(session_id = %session_id, "Deleted session");
                DeleteOutcome::Deleted { navigate_to_root }
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Delete failed");
                DeleteOutcome::Failed {
                    reason: e.user_message(),
                }
            }
        }
    }

    fn session_mut(&mut self, session_id: &str) -> Option<&mut Session> {
        self.sessions
            .iter_mut()
            .find(|s| s.session_id == session_id)
    }

    async fn send_update(
        &self,
        session_id: &str,
        update: &SessionUpdate,
    ) -> Result<(), BackendError> {
        self.backend
            .update_session(&self.user_id, session_id, update)
            .await
    }
}
