use std::sync::Arc;

use colored::Colorize;

use crate::backend::{HttpBackend, Message, Role};
use crate::config::Config;
use crate::conversation::ChatWindow;
use crate::error::{Result, SaoChatError};

/// Formats one message for the terminal.
pub fn format_message(message: &Message) -> String {
    match message.role {
        Role::User => format!("{} {}", "you>".cyan().bold(), message.content),
        Role::Assistant => format!("{} {}", "sao>".green().bold(), message.content),
    }
}

/// Prints a conversation, oldest message first.
pub fn print_messages(messages: &[Message]) {
    if messages.is_empty() {
        println!("{}", "No messages in this session.".yellow());
        return;
    }

    for message in messages {
        println!("{}\n", format_message(message));
    }
}

/// Messages as pretty-printed JSON.
pub fn messages_json(messages: &[Message]) -> std::result::Result<String, SaoChatError> {
    Ok(serde_json::to_string_pretty(messages)?)
}

/// Handle the `history` command
pub async fn handle_history(config: &Config, id: &str, json: bool) -> Result<()> {
    let backend = Arc::new(HttpBackend::new(&config.backend)?);
    let window = ChatWindow::open(backend, config.user.user_id.clone(), id).await;

    if json {
        println!("{}", messages_json(window.messages())?);
    } else {
        println!("\nSession {}:\n", id.cyan());
        print_messages(window.messages());
    }

    Ok(())
}
