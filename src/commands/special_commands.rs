//! Special commands parser for interactive chat mode
//!
//! This module parses the slash commands that can be entered during an
//! interactive chat session. Special commands let users:
//! - List, open and start sessions
//! - Open a session's action menu and rename, pin or delete sessions
//! - Collapse the sidebar and reconcile the list with the backend
//! - Display status and help, and exit
//!
//! Command words are case-insensitive; their arguments (session ids and
//! titles) are kept as typed.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands act on the session list or the chat window instead of
/// being sent to the chatbot. Commands that target a session take an
/// optional id; without one they act on the session whose menu is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Reload and print the session list
    ListSessions,

    /// Go back to the root view; the next message starts a new session.
    /// With text, start the session right away.
    NewSession(Option<String>),

    /// Open a session and print its history
    OpenSession(String),

    /// Open or close a session's action menu
    ToggleMenu(String),

    /// Rename a session. Without a title the current title is offered for
    /// editing.
    Rename {
        id: Option<String>,
        title: Option<String>,
    },

    /// Toggle a session's pinned flag
    TogglePin(Option<String>),

    /// Delete a session (asks for confirmation)
    Delete(Option<String>),

    /// Collapse or expand the sidebar
    ToggleSidebar,

    /// Reload the list from the backend, dropping local divergences
    Reconcile,

    /// Display current session and sync status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent as a chat message.
    None,
}

fn required_arg(command: &str, usage: &str, rest: &str) -> Result<String, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        })
    } else {
        Ok(rest.to_string())
    }
}

fn optional_arg(rest: &str) -> Option<String> {
    (!rest.is_empty()).then(|| rest.to_string())
}

fn no_arg(command: &str, value: SpecialCommand, rest: &str) -> Result<SpecialCommand, CommandError> {
    if rest.is_empty() {
        Ok(value)
    } else {
        Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: rest.to_string(),
        })
    }
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument if a command receives an unexpected argument.
/// Returns CommandError::MissingArgument if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use sao_chat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/pin 3f2a").unwrap();
/// assert_eq!(cmd, SpecialCommand::TogglePin(Some("3f2a".to_string())));
///
/// let cmd = parse_special_command("/rename 3f2a Tax questions").unwrap();
/// assert_eq!(
///     cmd,
///     SpecialCommand::Rename {
///         id: Some("3f2a".to_string()),
///         title: Some("Tax questions".to_string()),
///     }
/// );
///
/// let cmd = parse_special_command("hello there").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(SpecialCommand::Exit);
    }
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (trimmed, ""),
    };

    match word.to_lowercase().as_str() {
        "/sessions" | "/ls" => no_arg("/sessions", SpecialCommand::ListSessions, rest),
        "/new" => Ok(SpecialCommand::NewSession(optional_arg(rest))),
        "/open" => required_arg("/open", "/open <session_id>", rest).map(SpecialCommand::OpenSession),
        "/menu" => required_arg("/menu", "/menu <session_id>", rest).map(SpecialCommand::ToggleMenu),
        "/rename" => {
            let (id, title) = match rest.split_once(char::is_whitespace) {
                Some((id, title)) => (optional_arg(id), optional_arg(title.trim())),
                None => (optional_arg(rest), None),
            };
            Ok(SpecialCommand::Rename { id, title })
        }
        "/pin" => Ok(SpecialCommand::TogglePin(optional_arg(rest))),
        "/delete" | "/rm" => Ok(SpecialCommand::Delete(optional_arg(rest))),
        "/sidebar" => no_arg("/sidebar", SpecialCommand::ToggleSidebar, rest),
        "/reconcile" | "/refresh" => no_arg("/reconcile", SpecialCommand::Reconcile, rest),
        "/status" => no_arg("/status", SpecialCommand::ShowStatus, rest),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

SESSIONS:
  /sessions            - Reload and show the session list
  /ls                  - Same as /sessions
  /new [message]       - Start a new chat (optionally with its first message)
  /open <id>           - Open a session and show its history
  /refresh             - Same as /reconcile
  /reconcile           - Reload from the server, discarding unsynced local changes

SESSION MENU:
  /menu <id>           - Open or close the action menu of a session
  /rename [id] [title] - Rename a session (edit the current title if none given)
  /pin [id]            - Pin or unpin a session
  /delete [id]         - Delete a session (asks for confirmation)
  /rm [id]             - Same as /delete

  Without an id, /rename, /pin and /delete act on the session whose menu is
  open. Any other input closes the menu.

VIEW:
  /sidebar             - Collapse or expand the session list
  /status              - Show current session and sync status
  /help                - Show this help message
  /?                   - Same as /help

SESSION CONTROL:
  exit                 - Exit interactive mode
  quit                 - Same as exit

NOTES:
  - Command words are case-insensitive; ids and titles are not
  - Regular text (not starting with /) is sent to the chatbot
  - Pinned sessions are listed first, then newest first
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_text_is_not_a_command() {
        assert_eq!(
            parse_special_command("what is VAT?").unwrap(),
            SpecialCommand::None
        );
        assert_eq!(parse_special_command("").unwrap(), SpecialCommand::None);
    }

    #[test]
    fn test_exit_aliases() {
        for input in ["exit", "QUIT", "/exit", "/quit", "  exit  "] {
            assert_eq!(parse_special_command(input).unwrap(), SpecialCommand::Exit);
        }
    }

    #[test]
    fn test_list_sessions_aliases() {
        assert_eq!(
            parse_special_command("/sessions").unwrap(),
            SpecialCommand::ListSessions
        );
        assert_eq!(
            parse_special_command("/LS").unwrap(),
            SpecialCommand::ListSessions
        );
    }

    #[test]
    fn test_new_with_and_without_message() {
        assert_eq!(
            parse_special_command("/new").unwrap(),
            SpecialCommand::NewSession(None)
        );
        assert_eq!(
            parse_special_command("/new How do refunds work?").unwrap(),
            SpecialCommand::NewSession(Some("How do refunds work?".to_string()))
        );
    }

    #[test]
    fn test_open_keeps_id_case() {
        assert_eq!(
            parse_special_command("/Open AbC-123").unwrap(),
            SpecialCommand::OpenSession("AbC-123".to_string())
        );
    }

    #[test]
    fn test_open_requires_id() {
        let err = parse_special_command("/open").unwrap_err();
        assert!(matches!(err, CommandError::MissingArgument { .. }));
    }

    #[test]
    fn test_menu_requires_id() {
        assert_eq!(
            parse_special_command("/menu s1").unwrap(),
            SpecialCommand::ToggleMenu("s1".to_string())
        );
        assert!(parse_special_command("/menu").is_err());
    }

    #[test]
    fn test_rename_forms() {
        assert_eq!(
            parse_special_command("/rename").unwrap(),
            SpecialCommand::Rename {
                id: None,
                title: None
            }
        );
        assert_eq!(
            parse_special_command("/rename s1").unwrap(),
            SpecialCommand::Rename {
                id: Some("s1".to_string()),
                title: None
            }
        );
        assert_eq!(
            parse_special_command("/rename s1   Budget  2025 ").unwrap(),
            SpecialCommand::Rename {
                id: Some("s1".to_string()),
                title: Some("Budget  2025".to_string())
            }
        );
    }

    #[test]
    fn test_pin_and_delete_optional_id() {
        assert_eq!(
            parse_special_command("/pin").unwrap(),
            SpecialCommand::TogglePin(None)
        );
        assert_eq!(
            parse_special_command("/delete s9").unwrap(),
            SpecialCommand::Delete(Some("s9".to_string()))
        );
        assert_eq!(
            parse_special_command("/rm").unwrap(),
            SpecialCommand::Delete(None)
        );
    }

    #[test]
    fn test_no_arg_commands_reject_arguments() {
        let err = parse_special_command("/sidebar now").unwrap_err();
        assert_eq!(
            err,
            CommandError::UnsupportedArgument {
                command: "/sidebar".to_string(),
                arg: "now".to_string()
            }
        );
        assert!(parse_special_command("/status x").is_err());
    }

    #[test]
    fn test_view_commands() {
        assert_eq!(
            parse_special_command("/sidebar").unwrap(),
            SpecialCommand::ToggleSidebar
        );
        assert_eq!(
            parse_special_command("/refresh").unwrap(),
            SpecialCommand::Reconcile
        );
        assert_eq!(
            parse_special_command("/status").unwrap(),
            SpecialCommand::ShowStatus
        );
        assert_eq!(parse_special_command("/?").unwrap(), SpecialCommand::Help);
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_special_command("/mode write").unwrap_err();
        assert_eq!(err, CommandError::UnknownCommand("/mode".to_string()));
        assert!(err.to_string().contains("/help"));
    }
}
