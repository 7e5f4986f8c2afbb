//! Selection Resolver: which session is "current".
//!
//! [`resolve`] relies on the server returning `GET /sessions` most-recent-first;
//! it never re-sorts.

use crate::sessions::types::Session;

/// Compute the active session id.
///
/// An explicit selection wins while it is still in the list. Otherwise the
/// first session (in server order) that has extracted products is chosen.
/// Returns `None` when nothing qualifies.
pub fn resolve(explicit_id: Option<&str>, sessions: &[Session]) -> Option<String> {
    if let Some(id) = explicit_id
        && sessions.iter().any(|s| s.id == id)
    {
        return Some(id.to_string());
    }

    sessions
        .iter()
        .find(|s| s.product_count > 0)
        .map(|s| s.id.clone())
}

/// Encapsulates the user's explicit session selection.
#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    /// ID of the explicitly selected session, or None if nothing selected.
    selected_id: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, id: impl Into<String>) {
        self.selected_id = Some(id.into());
    }

    pub fn clear(&mut self) {
        self.selected_id = None;
    }

    /// The explicit selection, whether or not it still exists.
    pub fn id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn has_selection(&self) -> bool {
        self.selected_id.is_some()
    }

    /// The session to display given the current list.
    pub fn active(&self, sessions: &[Session]) -> Option<String> {
        resolve(self.id(), sessions)
    }
}
