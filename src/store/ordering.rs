//! Session list ordering.
//!
//! Pinned sessions come first; within each group sessions are ordered by
//! `created_at`, newest first. Sessions whose timestamp cannot be parsed sort
//! after every dated session of their group.

use std::cmp::{Ordering, Reverse};

use crate::backend::Session;

/// Compares two sessions under the list ordering.
pub fn compare_sessions(a: &Session, b: &Session) -> Ordering {
    b.is_pinned
        .cmp(&a.is_pinned)
        .then_with(|| Reverse(a.created_timestamp()).cmp(&Reverse(b.created_timestamp())))
}

/// Sorts sessions in place. The sort is stable, so equal keys keep their
/// relative order.
///
/// # Examples
///
/// ```
/// use sao_chat::backend::Session;
/// use sao_chat::store::ordering::sort_sessions;
///
/// let mut list = vec![
///     Session::new("1", "Budget", "2025-01-01"),
///     Session::new("2", "Finance", "2025-01-02"),
/// ];
/// list[0].is_pinned = true;
/// sort_sessions(&mut list);
/// assert_eq!(list[0].session_id, "1");
/// ```
pub fn sort_sessions(sessions: &mut [Session]) {
    sessions.sort_by(compare_sessions);
}

/// Returns true when the list already satisfies the ordering.
pub fn is_ordered(sessions: &[Session]) -> bool {
    sessions
        .windows(2)
        .all(|pair| compare_sessions(&pair[0], &pair[1]) != Ordering::Greater)
}
