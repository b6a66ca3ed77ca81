//! Command-line interface definition for SAO Chat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, session management and
//! one-shot queries.

use clap::{Parser, Subcommand};

/// SAO Chat - terminal client for the SAO chatbot
///
/// Chat with the backend and manage your chat sessions: list, rename,
/// pin and delete them.
#[derive(Parser, Debug, Clone)]
#[command(name = "sao-chat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Backend base URL (overrides config and SAO_CHAT_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// User id (overrides config and SAO_CHAT_USER_ID)
    #[arg(short, long)]
    pub user_id: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for SAO Chat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start interactive chat mode
    Chat {
        /// Open an existing session instead of starting at the root view
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Manage chat sessions
    Sessions {
        /// Session management subcommand
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Show the messages of a session
    History {
        /// Session id
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send one message and print the answer
    Send {
        /// Message text
        message: String,

        /// Session to send to; a new session is started when omitted
        #[arg(short, long)]
        session: Option<String>,
    },
}

/// Session management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// List sessions, pinned first then newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename a session
    Rename {
        /// Session id
        id: String,

        /// New title
        title: String,
    },

    /// Pin a session to the top of the list
    Pin {
        /// Session id
        id: String,
    },

    /// Unpin a session
    Unpin {
        /// Session id
        id: String,
    },

    /// Delete a session
    Delete {
        /// Session id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
