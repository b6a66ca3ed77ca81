//! Per-session action menu lifecycle.
//!
//! At most one menu is open at a time. The host reports where an interaction
//! landed as a [`MenuRegion`]; interactions outside the open menu's trigger
//! and panel close it.

use std::fmt;

/// Actions offered by a session's menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Delete the session (asks for confirmation)
    Delete,
    /// Start editing the title
    Rename,
    /// Toggle the pinned flag
    Pin,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete => write!(f, "delete"),
            Self::Rename => write!(f, "rename"),
            Self::Pin => write!(f, "pin"),
        }
    }
}

/// Where an interaction happened, as reported by the host view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuRegion<'a> {
    /// The menu trigger button of a session
    Trigger(&'a str),
    /// The open panel of a session's menu
    Panel(&'a str),
    /// Anywhere else
    Elsewhere,
}

/// Menu state: closed, or open for exactly one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MenuState {
    /// No menu is open
    #[default]
    Closed,
    /// The menu of the given session is open
    OpenFor(String),
}

impl MenuState {
    /// Creates a closed menu.
    pub fn new() -> Self {
        Self::Closed
    }

    /// Trigger pressed for `id`: opens it, or closes it if it was already open.
    ///
    /// # Examples
    ///
    /// ```
    /// use sao_chat::store::menu::MenuState;
    ///
    /// let mut menu = MenuState::new();
    /// menu.toggle("a");
    /// menu.toggle("b");
    /// assert_eq!(menu.open_id(), Some("b"));
    /// menu.toggle("b");
    /// assert_eq!(menu.open_id(), None);
    /// ```
    pub fn toggle(&mut self, id: &str) {
        *self = match self {
            Self::OpenFor(open) if open.as_str() == id => Self::Closed,
            _ => Self::OpenFor(id.to_string()),
        };
    }

    /// An interaction landed somewhere. Closes the menu unless it landed on
    /// the open menu's own trigger or panel. Returns true if the menu closed.
    pub fn outside_interaction(&mut self, target: MenuRegion<'_>) -> bool {
        let Self::OpenFor(open) = self else {
            return false;
        };
        let inside = match target {
            MenuRegion::Trigger(id) | MenuRegion::Panel(id) => id == open.as_str(),
            MenuRegion::Elsewhere => false,
        };
        if inside {
            return false;
        }
        *self = Self::Closed;
        true
    }

    /// An action was picked from the menu.
    pub fn action_selected(&mut self) {
        *self = Self::Closed;
    }

    /// Id of the session whose menu is open.
    pub fn open_id(&self) -> Option<&str> {
        match self {
            Self::OpenFor(id) => Some(id),
            Self::Closed => None,
        }
    }

    /// Whether the menu of `id` is open.
    pub fn is_open_for(&self, id: &str) -> bool {
        self.open_id() == Some(id)
    }
}
