//! SAO Chat - terminal client and session-sync library
//!
//! This library provides the client side of the SAO chatbot: the HTTP
//! backend client, the session store with its synchronization protocol,
//! and the view state of the session sidebar and chat window.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `backend`: Backend trait, HTTP client, wire types and an in-memory fake
//! - `store`: Session store, list ordering, action menu, rename editor, sidebar
//! - `conversation`: Message list and send flow of the displayed session
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Handlers behind the CLI subcommands
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sao_chat::{Config, HttpBackend, SessionStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let backend = Arc::new(HttpBackend::new(&config.backend)?);
//!     let mut store = SessionStore::new(backend, config.user.user_id.clone());
//!     store.load().await?;
//!     store.set_pinned("3f2a", true).await;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod store;

// Re-export commonly used types
pub use backend::{BackendError, HttpBackend, Message, Session, SessionBackend};
pub use config::Config;
pub use conversation::ChatWindow;
pub use error::{Result, SaoChatError};
pub use store::{SessionSidebar, SessionStore, SyncState};

#[cfg(test)]
pub mod test_utils;
