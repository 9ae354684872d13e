//! Navigable location: the single source of session identity.
//!
//! A conversation id lives only in the current path (`/<id>`). Views read it
//! once when mounted and write it back after creating a conversation.

use std::sync::{Arc, Mutex, MutexGuard};

/// Injected capability for reading and replacing the current location.
pub trait Navigator: Send + Sync {
    /// Returns the current path, e.g. `/` or `/abc123`.
    fn current_path(&self) -> String;

    /// Replaces the current location with the path for `conversation_id`.
    fn relocate(&self, conversation_id: &str);
}

impl<T: Navigator + ?Sized> Navigator for Arc<T> {
    fn current_path(&self) -> String {
        (**self).current_path()
    }

    fn relocate(&self, conversation_id: &str) {
        (**self).relocate(conversation_id);
    }
}

/// Extracts the conversation id from a path.
///
/// The leading `/` and any trailing `/` are dropped and the rest is trimmed;
/// a blank remainder means no conversation was requested.
#[must_use]
pub fn conversation_id_from_path(path: &str) -> Option<String> {
    let trimmed = path.trim().trim_start_matches('/').trim_end_matches('/').trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[must_use]
pub fn path_for_conversation(conversation_id: &str) -> String {
    format!("/{}", conversation_id.trim())
}

#[derive(Debug, Default)]
struct NavigatorState {
    path: String,
    history: Vec<String>,
}

/// In-process navigator with a replace history, used by the terminal client
/// and by tests.
#[derive(Debug)]
pub struct MemoryNavigator {
    state: Mutex<NavigatorState>,
}

impl MemoryNavigator {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(NavigatorState {
                path: path.into(),
                history: Vec::new(),
            }),
        }
    }

    #[must_use]
    pub fn root() -> Self {
        Self::new("/")
    }

    #[must_use]
    pub fn for_conversation(conversation_id: &str) -> Self {
        Self::new(path_for_conversation(conversation_id))
    }

    /// Moves to `path` as if the user navigated there.
    pub fn navigate(&self, path: impl Into<String>) {
        self.lock_state().path = path.into();
    }

    /// Paths written by [`Navigator::relocate`], oldest first.
    #[must_use]
    pub fn relocations(&self) -> Vec<String> {
        self.lock_state().history.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, NavigatorState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::root()
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.lock_state().path.clone()
    }

    fn relocate(&self, conversation_id: &str) {
        let path = path_for_conversation(conversation_id);
        let mut state = self.lock_state();
        state.history.push(path.clone());
        state.path = path;
    }
}
