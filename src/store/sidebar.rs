//! Session sidebar view state.
//!
//! [`SessionSidebar`] owns everything the session list view needs while it
//! is shown: the store, the action menu, the rename editor and the
//! collapsed/expanded flag. It is created when the view mounts and dropped
//! with it; nothing here is global.

use super::editor::RenameEditor;
use super::menu::{MenuAction, MenuRegion, MenuState};
use super::{Confirmation, DeleteOutcome, MutationOutcome, SessionStore};
use crate::backend::SessionBackend;

/// What a menu action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Delete ran; see the inner outcome
    Delete(DeleteOutcome),
    /// The rename editor is now open for the session
    RenameStarted,
    /// Pin was toggled; see the inner outcome
    Pin(MutationOutcome),
    /// The session is not in the list
    UnknownSession,
}

/// Sidebar state for one user's session list.
pub struct SessionSidebar<B: SessionBackend + ?Sized> {
    store: SessionStore<B>,
    menu: MenuState,
    editor: RenameEditor,
    open: bool,
}

impl<B: SessionBackend + ?Sized> SessionSidebar<B> {
    /// Wraps a store. The sidebar starts expanded with no menu open.
    pub fn new(store: SessionStore<B>) -> Self {
        Self {
            store,
            menu: MenuState::new(),
            editor: RenameEditor::new(),
            open: true,
        }
    }

    pub fn store(&self) -> &SessionStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStore<B> {
        &mut self.store
    }

    pub fn menu(&self) -> &MenuState {
        &self.menu
    }

    pub fn editor(&self) -> &RenameEditor {
        &self.editor
    }

    /// Whether the sidebar is expanded.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Collapses or expands the sidebar. Returns the new state.
    pub fn toggle_sidebar(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Menu trigger pressed for `session_id`.
    pub fn toggle_menu(&mut self, session_id: &str) {
        self.menu.toggle(session_id);
    }

    /// Reports an interaction to the menu; see [`MenuState::outside_interaction`].
    pub fn interaction(&mut self, target: MenuRegion<'_>) -> bool {
        self.menu.outside_interaction(target)
    }

    /// Runs a menu action for `session_id`.
    ///
    /// The menu is closed before the action runs, whatever the outcome.
    pub async fn select_action<C>(
        &mut self,
        session_id: &str,
        action: MenuAction,
        confirmation: &C,
    ) -> ActionOutcome
    where
        C: Confirmation + ?Sized,
    {
        self.menu.action_selected();

        match action {
            MenuAction::Delete => {
                let outcome = self.store.delete(session_id, confirmation).await;
                if matches!(outcome, DeleteOutcome::Deleted { .. })
                    && self.editor.editing_id() == Some(session_id)
                {
                    self.editor.cancel();
                }
                ActionOutcome::Delete(outcome)
            }
            MenuAction::Rename => match self.store.get(session_id) {
                Some(session) => {
                    self.editor.start(session);
                    ActionOutcome::RenameStarted
                }
                None => ActionOutcome::UnknownSession,
            },
            MenuAction::Pin => ActionOutcome::Pin(self.store.toggle_pin(session_id).await),
        }
    }

    /// Updates the rename draft.
    pub fn edit_draft(&mut self, text: impl Into<String>) {
        self.editor.set_draft(text);
    }

    /// Enter or blur in the rename field.
    pub async fn commit_rename(&mut self) -> MutationOutcome {
        self.editor.commit(&mut self.store).await
    }

    /// Escape in the rename field.
    pub fn cancel_rename(&mut self) {
        self.editor.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backend::fake::{BackendOp, FakeBackend};
    use crate::backend::BackendError;
    use crate::store::{AssumeYes, MockConfirmation};
    use crate::test_utils::sample_sessions;

    async fn sidebar() -> (SessionSidebar<FakeBackend>, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend::with_sessions(sample_sessions()));
        let mut store = SessionStore::new(Arc::clone(&backend), "1");
        store.load().await.unwrap();
        (SessionSidebar::new(store), backend)
    }

    fn ids<B: SessionBackend + ?Sized>(sidebar: &SessionSidebar<B>) -> Vec<String> {
        sidebar
            .store()
            .sessions()
            .iter()
            .map(|s| s.session_id.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_toggle_sidebar() {
        let (mut sidebar, _) = sidebar().await;
        assert!(sidebar.is_open());
        assert!(!sidebar.toggle_sidebar());
        assert!(sidebar.toggle_sidebar());
    }

    #[tokio::test]
    async fn test_pin_action_closes_menu_and_resorts() {
        let (mut sidebar, _) = sidebar().await;
        sidebar.toggle_menu("1");

        let outcome = sidebar
            .select_action("1", MenuAction::Pin, &AssumeYes)
            .await;
        assert_eq!(outcome, ActionOutcome::Pin(MutationOutcome::Synced));
        assert_eq!(sidebar.menu(), &MenuState::Closed);
        assert_eq!(ids(&sidebar), vec!["1", "2"]);
        assert!(sidebar.store().get("1").unwrap().is_pinned);
    }

    #[tokio::test]
    async fn test_menu_closes_even_when_action_fails() {
        let (mut sidebar, backend) = sidebar().await;
        backend.fail(
            BackendOp::Delete,
            BackendError::Rejected {
                message: Some("Cannot delete".to_string()),
            },
        );
        sidebar.toggle_menu("2");

        let outcome = sidebar
            .select_action("2", MenuAction::Delete, &AssumeYes)
            .await;
        assert_eq!(
            outcome,
            ActionOutcome::Delete(DeleteOutcome::Failed {
                reason: "Cannot delete".to_string()
            })
        );
        assert_eq!(sidebar.menu(), &MenuState::Closed);
    }

    #[tokio::test]
    async fn test_declined_delete_closes_menu_only() {
        let (mut sidebar, backend) = sidebar().await;
        sidebar.toggle_menu("2");

        let mut confirm = MockConfirmation::new();
        confirm.expect_confirm().times(1).return_const(false);

        let outcome = sidebar
            .select_action("2", MenuAction::Delete, &confirm)
            .await;
        assert_eq!(outcome, ActionOutcome::Delete(DeleteOutcome::Declined));
        assert_eq!(sidebar.menu(), &MenuState::Closed);
        assert_eq!(ids(&sidebar), vec!["1", "2"]);
        assert_eq!(backend.call_count(BackendOp::Delete), 0);
    }

    #[tokio::test]
    async fn test_rename_flow() {
        let (mut sidebar, _) = sidebar().await;
        sidebar.toggle_menu("2");

        let outcome = sidebar
            .select_action("2", MenuAction::Rename, &AssumeYes)
            .await;
        assert_eq!(outcome, ActionOutcome::RenameStarted);
        assert_eq!(sidebar.editor().draft(), Some("Finance"));

        sidebar.edit_draft("Taxes");
        assert_eq!(sidebar.commit_rename().await, MutationOutcome::Synced);
        assert_eq!(sidebar.store().get("2").unwrap().title, "Taxes");
        assert!(!sidebar.editor().is_editing());
    }

    #[tokio::test]
    async fn test_rename_unknown_session() {
        let (mut sidebar, _) = sidebar().await;
        let outcome = sidebar
            .select_action("nope", MenuAction::Rename, &AssumeYes)
            .await;
        assert_eq!(outcome, ActionOutcome::UnknownSession);
        assert!(!sidebar.editor().is_editing());
    }

    #[tokio::test]
    async fn test_deleting_edited_session_cancels_edit() {
        let (mut sidebar, _) = sidebar().await;
        sidebar
            .select_action("1", MenuAction::Rename, &AssumeYes)
            .await;
        sidebar
            .select_action("1", MenuAction::Delete, &AssumeYes)
            .await;
        assert!(!sidebar.editor().is_editing());
        assert_eq!(ids(&sidebar), vec!["2"]);
    }

    #[tokio::test]
    async fn test_interaction_elsewhere_closes_menu() {
        let (mut sidebar, _) = sidebar().await;
        sidebar.toggle_menu("1");
        sidebar.toggle_menu("2");
        assert!(sidebar.menu().is_open_for("2"));

        assert!(sidebar.interaction(MenuRegion::Elsewhere));
        assert_eq!(sidebar.menu(), &MenuState::Closed);
    }
}
