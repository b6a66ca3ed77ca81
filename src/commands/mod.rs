/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes the top-level command modules:

- `chat`    : Interactive chat mode with the session sidebar
- `sessions`: List, rename, pin and delete sessions
- `history` : Print the messages of a session
- `send`    : One-shot message

These handlers are intentionally small and use the library components:
the backend client, the session store and the chat window.
*/

use crate::store::Confirmation;
use rustyline::DefaultEditor;

// Special commands parser for interactive chat
pub mod special_commands;

// Session management commands
pub mod sessions;

// Session history command
pub mod history;

/// Returns true for an affirmative answer (`y` or `yes`, any case).
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Yes/no prompt on the terminal. Anything but an explicit yes declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirmation;

impl Confirmation for TerminalConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::warn!("Cannot open prompt for confirmation: {}", e);
                return false;
            }
        };
        match rl.readline(&format!("{} [y/N] ", prompt)) {
            Ok(answer) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Loads the session list, optionally opens a session, and runs a
    //! readline-based loop. Plain text is sent to the chatbot: into the open
    //! session, or as the first message of a new one when at the root view.
    //! Slash commands drive the session sidebar.

    use super::history::{format_message, print_messages};
    use super::sessions::{print_sessions, refresh_for_display};
    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::TerminalConfirmation;
    use crate::backend::{HttpBackend, SessionBackend};
    use crate::config::Config;
    use crate::conversation::{ChatWindow, SendOutcome};
    use crate::error::Result;
    use crate::store::{
        ActionOutcome, AssumeYes, Confirmation, DeleteOutcome, MenuAction, MenuRegion,
        MutationOutcome, SessionSidebar, SessionStore,
    };
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::sync::Arc;

    /// Whether the loop keeps reading input
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Flow {
        Continue,
        Exit,
    }

    /// State of one interactive chat: the sidebar and, when a session is
    /// open, its chat window. No window means the root view.
    pub struct ChatSession<B: SessionBackend + ?Sized> {
        sidebar: SessionSidebar<B>,
        window: Option<ChatWindow<B>>,
        confirm_deletes: bool,
    }

    impl<B: SessionBackend + ?Sized> ChatSession<B> {
        /// Loads the session list and opens `session` if given.
        ///
        /// A failed load is only logged and leaves the list empty; chatting
        /// still works.
        pub async fn start(
            backend: Arc<B>,
            user_id: &str,
            normalize_on_load: bool,
            confirm_deletes: bool,
            session: Option<String>,
        ) -> Self {
            let mut store = SessionStore::new(Arc::clone(&backend), user_id)
                .with_normalize_on_load(normalize_on_load);
            refresh_for_display(&mut store).await;

            let mut chat = Self {
                sidebar: SessionSidebar::new(store),
                window: None,
                confirm_deletes,
            };
            if let Some(id) = session {
                chat.open(id).await;
            }
            chat
        }

        pub fn sidebar(&self) -> &SessionSidebar<B> {
            &self.sidebar
        }

        pub fn window(&self) -> Option<&ChatWindow<B>> {
            self.window.as_ref()
        }

        /// Prompt showing where the next message goes.
        pub fn prompt(&self) -> String {
            let store = self.sidebar.store();
            let place = match store.current() {
                Some(id) => store
                    .get(id)
                    .map(|s| s.title.clone())
                    .unwrap_or_else(|| id.to_string()),
                None => "new chat".to_string(),
            };
            match self.sidebar.menu().open_id() {
                Some(menu) => format!("[{}] (menu: {}) >> ", place, menu),
                None => format!("[{}] >> ", place),
            }
        }

        async fn open(&mut self, id: String) {
            let store = self.sidebar.store();
            let window =
                ChatWindow::open(Arc::clone(store.backend()), store.user_id(), id.clone()).await;
            self.sidebar.store_mut().set_current(Some(id));
            self.window = Some(window);
        }

        fn go_root(&mut self) {
            self.window = None;
            self.sidebar.store_mut().set_current(None);
        }

        /// Sends plain text: into the open session, or as the first message
        /// of a new session at the root view.
        pub async fn handle_message(&mut self, text: &str) {
            self.sidebar.interaction(MenuRegion::Elsewhere);

            if let Some(window) = self.window.as_mut() {
                if !matches!(window.send(text).await, SendOutcome::Ignored) {
                    if let Some(last) = window.messages().last() {
                        println!("\n{}\n", format_message(last));
                    }
                }
                return;
            }

            match self.sidebar.store_mut().create(text).await {
                Ok(created) => {
                    println!("\n{} {}\n", "sao>".green().bold(), created.answer.answer);
                    self.open(created.session_id).await;
                    refresh_for_display(self.sidebar.store_mut()).await;
                }
                Err(e) => {
                    eprintln!("{}", format!("Failed to start chat: {}", e).red());
                }
            }
        }

        /// Runs a special command.
        ///
        /// `read_draft` edits a rename draft interactively; it receives the
        /// current title and returns the new text, or `None` to cancel.
        pub async fn handle_command(
            &mut self,
            command: SpecialCommand,
            confirmation: &dyn Confirmation,
            read_draft: &mut dyn FnMut(&str) -> Option<String>,
        ) -> Result<Flow> {
            match command {
                SpecialCommand::ToggleMenu(id) => {
                    self.toggle_menu(&id);
                    return Ok(Flow::Continue);
                }
                SpecialCommand::Rename { id, title } => {
                    if let Some(id) = self.target(id, "/rename") {
                        self.rename(&id, title, read_draft).await;
                    }
                    return Ok(Flow::Continue);
                }
                SpecialCommand::TogglePin(id) => {
                    if let Some(id) = self.target(id, "/pin") {
                        self.pin(&id).await;
                    }
                    return Ok(Flow::Continue);
                }
                SpecialCommand::Delete(id) => {
                    if let Some(id) = self.target(id, "/delete") {
                        self.delete(&id, confirmation).await;
                    }
                    return Ok(Flow::Continue);
                }
                _ => {}
            }

            self.sidebar.interaction(MenuRegion::Elsewhere);

            match command {
                SpecialCommand::ListSessions => {
                    refresh_for_display(self.sidebar.store_mut()).await;
                    if self.sidebar.is_open() {
                        print_sessions(self.sidebar.store());
                    } else {
                        println!("{}", "Sidebar is collapsed (/sidebar to expand).".yellow());
                    }
                }
                SpecialCommand::NewSession(message) => {
                    self.go_root();
                    match message {
                        Some(text) => self.handle_message(&text).await,
                        None => println!("Started a new chat. Type your first message.\n"),
                    }
                }
                SpecialCommand::OpenSession(id) => {
                    self.open(id).await;
                    if let Some(window) = &self.window {
                        print_messages(window.messages());
                    }
                }
                SpecialCommand::ToggleSidebar => {
                    let state = if self.sidebar.toggle_sidebar() {
                        "expanded"
                    } else {
                        "collapsed"
                    };
                    println!("Sidebar {}\n", state);
                }
                SpecialCommand::Reconcile => match self.sidebar.store_mut().reconcile().await {
                    Ok(()) => println!("{}", "Session list reloaded from server.".green()),
                    Err(e) => eprintln!("{}", format!("Reconcile failed: {}", e).red()),
                },
                SpecialCommand::ShowStatus => self.print_status(),
                SpecialCommand::Help => print_help(),
                SpecialCommand::Exit => return Ok(Flow::Exit),
                _ => {}
            }

            Ok(Flow::Continue)
        }

        /// Explicit id, or the session whose menu is open.
        fn target(&mut self, id: Option<String>, command: &str) -> Option<String> {
            if let Some(id) = id {
                self.sidebar.interaction(MenuRegion::Panel(&id));
                return Some(id);
            }
            let open = self.sidebar.menu().open_id().map(str::to_string);
            if open.is_none() {
                println!(
                    "{}",
                    format!("No session selected. Use {} <id> or /menu <id> first.", command)
                        .yellow()
                );
            }
            open
        }

        fn toggle_menu(&mut self, id: &str) {
            let Some(session) = self.sidebar.store().get(id) else {
                eprintln!("{}", format!("Unknown session: {}", id).red());
                return;
            };
            let pin_label = if session.is_pinned { "unpin" } else { "pin" };
            let title = session.title.clone();

            self.sidebar.toggle_menu(id);
            if self.sidebar.menu().is_open_for(id) {
                println!(
                    "Menu for \"{}\": /rename [title], /pin ({}), /delete\n",
                    title, pin_label
                );
            }
        }

        async fn rename(
            &mut self,
            id: &str,
            title: Option<String>,
            read_draft: &mut dyn FnMut(&str) -> Option<String>,
        ) {
            let outcome = self
                .sidebar
                .select_action(id, MenuAction::Rename, &AssumeYes)
                .await;
            if outcome == ActionOutcome::UnknownSession {
                eprintln!("{}", format!("Unknown session: {}", id).red());
                return;
            }

            let draft = match title {
                Some(title) => Some(title),
                None => read_draft(self.sidebar.editor().draft().unwrap_or_default()),
            };
            let Some(draft) = draft else {
                self.sidebar.cancel_rename();
                println!("Rename cancelled.\n");
                return;
            };

            self.sidebar.edit_draft(draft);
            report_mutation("Renamed", self.sidebar.commit_rename().await);
        }

        async fn pin(&mut self, id: &str) {
            if !self.is_known(id) {
                return;
            }
            if let ActionOutcome::Pin(outcome) = self
                .sidebar
                .select_action(id, MenuAction::Pin, &AssumeYes)
                .await
            {
                let pinned = self
                    .sidebar
                    .store()
                    .get(id)
                    .map(|s| s.is_pinned)
                    .unwrap_or(false);
                report_mutation(if pinned { "Pinned" } else { "Unpinned" }, outcome);
            }
        }

        async fn delete(&mut self, id: &str, confirmation: &dyn Confirmation) {
            if !self.is_known(id) {
                return;
            }
            let confirmation: &dyn Confirmation = if self.confirm_deletes {
                confirmation
            } else {
                &AssumeYes
            };
            let outcome = self
                .sidebar
                .select_action(id, MenuAction::Delete, confirmation)
                .await;

            match outcome {
                ActionOutcome::Delete(DeleteOutcome::Deleted { navigate_to_root }) => {
                    println!("{}", format!("Deleted session {}", id).green());
                    if navigate_to_root {
                        self.go_root();
                        println!("Back at a new chat.\n");
                    }
                }
                ActionOutcome::Delete(DeleteOutcome::Failed { reason }) => {
                    eprintln!("{}", reason.red());
                }
                ActionOutcome::Delete(DeleteOutcome::Declined) => {
                    println!("Delete cancelled.\n");
                }
                _ => {}
            }
        }

        fn is_known(&self, id: &str) -> bool {
            let known = self.sidebar.store().get(id).is_some();
            if !known {
                eprintln!("{}", format!("Unknown session: {}", id).red());
            }
            known
        }

        fn print_status(&self) {
            let store = self.sidebar.store();

            println!("\n╔══════════════════════════════════════════════════════════════╗");
            println!("║                     SAO Chat Session Status                  ║");
            println!("╚══════════════════════════════════════════════════════════════╝\n");
            println!("User:              {}", store.user_id());
            println!(
                "Current Session:   {}",
                store.current().unwrap_or("(new chat)")
            );
            if let Some(window) = &self.window {
                println!("Conversation Size: {} messages", window.messages().len());
            }
            println!("Sessions:          {}", store.sessions().len());
            println!(
                "Sidebar:           {}",
                if self.sidebar.is_open() {
                    "expanded"
                } else {
                    "collapsed"
                }
            );

            let unsynced = store.unsynced();
            if unsynced.is_empty() {
                println!("Sync:              {}", "all changes saved".green());
            } else {
                println!(
                    "Sync:              {}",
                    format!("{} unsynced (/reconcile to discard)", unsynced.len()).yellow()
                );
                for (id, reason) in unsynced {
                    println!("  {} {}", id.cyan(), reason);
                }
            }
            println!();
        }
    }

    fn report_mutation(verb: &str, outcome: MutationOutcome) {
        match outcome {
            MutationOutcome::Ignored => println!("Title unchanged.\n"),
            MutationOutcome::Synced => println!("{}", verb.green()),
            MutationOutcome::Unsynced(e) => println!(
                "{}",
                format!(
                    "{} locally, but the server was not updated: {} (/reconcile to discard)",
                    verb,
                    e.user_message()
                )
                .yellow()
            ),
        }
    }

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `session` - Optional session to open instead of the root view
    pub async fn run_chat(config: Config, session: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let backend = Arc::new(HttpBackend::new(&config.backend)?);
        let mut chat = ChatSession::start(
            backend,
            &config.user.user_id,
            config.sessions.normalize_on_load,
            config.sessions.confirm_deletes,
            session,
        )
        .await;

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&config);
        if let Some(window) = chat.window() {
            print_messages(window.messages());
        } else {
            print_sessions(chat.sidebar().store());
        }

        loop {
            match rl.readline(&chat.prompt()) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e);
                            continue;
                        }
                    };

                    if command == SpecialCommand::None {
                        chat.handle_message(trimmed).await;
                        continue;
                    }

                    let mut read_draft = |initial: &str| {
                        rl.readline_with_initial("New title: ", (initial, "")).ok()
                    };
                    let flow = chat
                        .handle_command(command, &TerminalConfirmation, &mut read_draft)
                        .await?;
                    if flow == Flow::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Display welcome banner at the start of interactive chat mode
    fn print_welcome_banner(config: &Config) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║           SAO Chat Interactive Mode - Welcome!               ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Server: {}", config.backend.base_url.cyan());
        println!("User:   {}\n", config.user.user_id);
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

}

// One-shot send command handler
pub mod send {
    //! Sends a single message and prints the answer.

    use crate::backend::{HttpBackend, SessionBackend};
    use crate::config::Config;
    use crate::error::Result;
    use crate::store::SessionStore;
    use colored::Colorize;
    use std::sync::Arc;

    /// Send `message` to `session`, or start a new session with it.
    ///
    /// # Errors
    ///
    /// Returns an error if the message is blank or the backend call fails
    pub async fn run_send(config: &Config, message: &str, session: Option<String>) -> Result<()> {
        let backend = Arc::new(HttpBackend::new(&config.backend)?);
        let user_id = config.user.user_id.as_str();

        match session {
            Some(session_id) => {
                if message.trim().is_empty() {
                    return Err(crate::error::SaoChatError::EmptyMessage.into());
                }
                let answer = backend.send_message(user_id, &session_id, message).await?;
                println!("{}", answer.answer);
            }
            None => {
                let mut store = SessionStore::new(backend, user_id);
                let created = store.create(message).await?;
                eprintln!("{} {}", "session:".cyan(), created.session_id);
                println!("{}", created.answer.answer);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }
}
