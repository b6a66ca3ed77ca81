//! Session management commands
//!
//! Handlers for `sao-chat sessions ...` plus the table rendering shared with
//! the interactive `/sessions` command.

use std::sync::Arc;

use colored::Colorize;
use prettytable::{format, Table};

use super::TerminalConfirmation;
use crate::backend::{HttpBackend, Session, SessionBackend};
use crate::cli::SessionCommand;
use crate::config::Config;
use crate::error::{Result, SaoChatError};
use crate::store::{AssumeYes, Confirmation, DeleteOutcome, MutationOutcome, SessionStore, SyncState};

const TITLE_WIDTH: usize = 40;

/// Shortens a title to the table width, on a character boundary.
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() > TITLE_WIDTH {
        let head: String = title.chars().take(TITLE_WIDTH - 3).collect();
        format!("{}...", head)
    } else {
        title.to_string()
    }
}

/// Display form of a session's creation time.
pub fn format_created(session: &Session) -> String {
    session
        .created_timestamp()
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| session.created_at.clone())
}

/// Builds the session table: pin marker, id, title, creation time, sync state.
/// The session on screen is highlighted.
pub fn sessions_table<B: SessionBackend + ?Sized>(store: &SessionStore<B>) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "",
        "ID".bold(),
        "Title".bold(),
        "Created".bold(),
        "Status".bold()
    ]);

    for session in store.sessions() {
        let pin = if session.is_pinned {
            "*".yellow().to_string()
        } else {
            String::new()
        };
        let id = if store.current() == Some(session.session_id.as_str()) {
            session.session_id.green().bold()
        } else {
            session.session_id.cyan()
        };
        let status = match store.sync_state(&session.session_id) {
            SyncState::Synced => String::new(),
            unsynced @ SyncState::Unsynced { .. } => unsynced.to_string().red().to_string(),
        };

        table.add_row(prettytable::row![
            pin,
            id,
            truncate_title(&session.title),
            format_created(session),
            status
        ]);
    }

    table
}

/// Prints the session list of a loaded store.
pub fn print_sessions<B: SessionBackend + ?Sized>(store: &SessionStore<B>) {
    if store.sessions().is_empty() {
        println!("{}", "No chat sessions yet.".yellow());
        return;
    }

    println!("\nChat Sessions:");
    sessions_table(store).printstd();
    println!();
}

/// Session list as pretty-printed JSON.
pub fn sessions_json<B: SessionBackend + ?Sized>(
    store: &SessionStore<B>,
) -> std::result::Result<String, SaoChatError> {
    Ok(serde_json::to_string_pretty(store.sessions())?)
}

/// Refreshes the list for display.
///
/// A failed load is logged by the store and not reported to the user: the
/// previous list (empty on first load) is shown instead.
pub async fn refresh_for_display<B: SessionBackend + ?Sized>(store: &mut SessionStore<B>) {
    if store.load().await.is_err() {
        tracing::debug!("Showing session list without refresh");
    }
}

/// Handle `sessions` subcommands
pub async fn handle_sessions(config: &Config, command: SessionCommand) -> Result<()> {
    let backend = Arc::new(HttpBackend::new(&config.backend)?);
    let mut store = SessionStore::new(backend, config.user.user_id.clone())
        .with_normalize_on_load(config.sessions.normalize_on_load);

    // Mutations need the list to check the id.
    if matches!(command, SessionCommand::List { .. }) {
        refresh_for_display(&mut store).await;
    } else {
        store.load().await?;
    }

    match command {
        SessionCommand::List { json } => {
            if json {
                println!("{}", sessions_json(&store)?);
            } else {
                print_sessions(&store);
                println!(
                    "Use {} to continue a session.",
                    "sao-chat chat --session <ID>".cyan()
                );
                println!();
            }
        }
        SessionCommand::Rename { id, title } => {
            require_known(&store, &id)?;
            match store.rename(&id, &title).await {
                MutationOutcome::Ignored => {
                    println!("{}", "Title is empty; nothing changed.".yellow());
                }
                MutationOutcome::Synced => {
                    println!("{}", format!("Renamed {} to \"{}\"", id, title.trim()).green());
                }
                MutationOutcome::Unsynced(e) => return Err(e.into()),
            }
        }
        SessionCommand::Pin { id } => set_pinned(&mut store, &id, true).await?,
        SessionCommand::Unpin { id } => set_pinned(&mut store, &id, false).await?,
        SessionCommand::Delete { id, yes } => {
            require_known(&store, &id)?;
            let confirmation: Box<dyn Confirmation> = if yes || !config.sessions.confirm_deletes {
                Box::new(AssumeYes)
            } else {
                Box::new(TerminalConfirmation)
            };

            match store.delete(&id, confirmation.as_ref()).await {
                DeleteOutcome::Declined => println!("{}", "Delete cancelled.".yellow()),
                DeleteOutcome::Deleted { .. } => {
                    println!("{}", format!("Deleted session {}", id).green());
                }
                DeleteOutcome::Failed { reason } => {
                    return Err(anyhow::anyhow!("Failed to delete session {}: {}", id, reason));
                }
            }
        }
    }

    Ok(())
}

fn require_known<B: SessionBackend + ?Sized>(store: &SessionStore<B>, id: &str) -> Result<()> {
    if store.get(id).is_none() {
        return Err(SaoChatError::UnknownSession(id.to_string()).into());
    }
    Ok(())
}

async fn set_pinned<B: SessionBackend + ?Sized>(
    store: &mut SessionStore<B>,
    id: &str,
    pinned: bool,
) -> Result<()> {
    require_known(store, id)?;
    match store.set_pinned(id, pinned).await {
        MutationOutcome::Unsynced(e) => Err(e.into()),
        _ => {
            let verb = if pinned { "Pinned" } else { "Unpinned" };
            println!("{}", format!("{} session {}", verb, id).green());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{BackendOp, FakeBackend};
    use crate::backend::BackendError;

    async fn loaded_store() -> SessionStore<FakeBackend> {
        let mut pinned = Session::new("p", "Pinned one", "2024-06-01T10:00:00Z");
        pinned.is_pinned = true;
        let backend = Arc::new(FakeBackend::with_sessions(vec![
            pinned,
            Session::new("n", "Newest", "2025-01-02"),
        ]));
        let mut store = SessionStore::new(backend, "1");
        store.load().await.unwrap();
        store
    }

    #[test]
    fn test_truncate_title_short() {
        assert_eq!(truncate_title("Budget"), "Budget");
    }

    #[test]
    fn test_truncate_title_multibyte() {
        let title = "งบประมาณ".repeat(10);
        let short = truncate_title(&title);
        assert_eq!(short.chars().count(), TITLE_WIDTH);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn test_format_created() {
        let session = Session::new("a", "A", "2025-01-02T03:04:05Z");
        assert_eq!(format_created(&session), "2025-01-02 03:04");

        let broken = Session::new("b", "B", "yesterday");
        assert_eq!(format_created(&broken), "yesterday");
    }

    #[tokio::test]
    async fn test_sessions_table_has_row_per_session() {
        let store = loaded_store().await;
        let table = sessions_table(&store);
        assert_eq!(table.len(), 3);
    }

    #[tokio::test]
    async fn test_sessions_table_shows_unsynced() {
        let mut store = loaded_store().await;
        store.backend().fail(
            BackendOp::Update,
            BackendError::Network("down".to_string()),
        );
        store.rename("n", "Offline rename").await;

        let rendered = sessions_table(&store).to_string();
        assert!(rendered.contains("Offline rename"));
        assert!(rendered.contains("unsynced"));
    }

    #[tokio::test]
    async fn test_require_known() {
        let store = loaded_store().await;
        assert!(require_known(&store, "p").is_ok());
        let err = require_known(&store, "zzz").unwrap_err();
        assert!(err.to_string().contains("Unknown session: zzz"));
    }

    #[tokio::test]
    async fn test_set_pinned_propagates_backend_failure() {
        let mut store = loaded_store().await;
        store.backend().fail(
            BackendOp::Update,
            BackendError::Status {
                status: 500,
                message: None,
            },
        );
        assert!(set_pinned(&mut store, "n", true).await.is_err());
        assert!(store.get("n").unwrap().is_pinned);
    }

    #[tokio::test]
    async fn test_failed_refresh_shows_empty_list() {
        let backend = Arc::new(FakeBackend::new());
        backend.fail(BackendOp::List, BackendError::Network("refused".to_string()));
        let mut store = SessionStore::new(backend, "1");

        refresh_for_display(&mut store).await;
        assert!(store.sessions().is_empty());
        assert_eq!(sessions_json(&store).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_list() {
        let mut store = loaded_store().await;
        store.backend().fail(BackendOp::List, BackendError::Network("refused".to_string()));

        refresh_for_display(&mut store).await;
        assert_eq!(store.sessions().len(), 2);
    }
}
