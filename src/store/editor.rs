//! Inline title editor.
//!
//! Only one session can be edited at a time. The draft starts as the current
//! title; Enter or blur commits, Escape cancels. Either way the editor goes
//! back to idle.

use std::mem;

use super::{MutationOutcome, SessionStore};
use crate::backend::{Session, SessionBackend};

/// Rename editor state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RenameEditor {
    /// Not editing
    #[default]
    Idle,
    /// Editing the title of `id`
    Editing {
        /// Session being renamed
        id: String,
        /// Current input
        draft: String,
    },
}

impl RenameEditor {
    /// Creates an idle editor.
    pub fn new() -> Self {
        Self::Idle
    }

    /// Starts editing `session`, seeding the draft with its title. Replaces
    /// any edit in progress.
    pub fn start(&mut self, session: &Session) {
        *self = Self::Editing {
            id: session.session_id.clone(),
            draft: session.title.clone(),
        };
    }

    /// Replaces the draft. Does nothing when idle.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let Self::Editing { draft, .. } = self {
            *draft = text.into();
        }
    }

    /// Abandons the edit.
    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }

    /// Commits the draft through the store and returns to idle.
    ///
    /// A blank draft leaves the title unchanged. Committing while idle is
    /// ignored.
    pub async fn commit<B>(&mut self, store: &mut SessionStore<B>) -> MutationOutcome
    where
        B: SessionBackend + ?Sized,
    {
        match mem::take(self) {
            Self::Editing { id, draft } => store.rename(&id, &draft).await,
            Self::Idle => MutationOutcome::Ignored,
        }
    }

    /// Id of the session being edited.
    pub fn editing_id(&self) -> Option<&str> {
        match self {
            Self::Editing { id, .. } => Some(id),
            Self::Idle => None,
        }
    }

    /// Current draft text.
    pub fn draft(&self) -> Option<&str> {
        match self {
            Self::Editing { draft, .. } => Some(draft),
            Self::Idle => None,
        }
    }

    /// Whether an edit is in progress.
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }
}
