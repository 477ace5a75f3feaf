//! Navigation targets and the collaborator that performs them.

use roster_types::ConversationId;
use std::sync::{Arc, Mutex};

/// A place the roster can send the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The login screen.
    Login,
    /// The roster itself.
    Home,
    /// A single conversation.
    Conversation(ConversationId),
}

impl Route {
    /// The path for this route.
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Home => "/home".to_string(),
            Route::Conversation(id) => format!("/chat/{}", id),
        }
    }
}

/// Performs navigation on behalf of the roster.
pub trait Navigator: Send + Sync {
    /// Go to `route`.
    fn go_to(&self, route: &Route);
}

/// Navigator that only records where it was sent.
#[derive(Debug, Default, Clone)]
pub struct RecordingNavigator {
    visited: Arc<Mutex<Vec<Route>>>,
}

impl RecordingNavigator {
    /// Create a navigator with an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every route visited, in order.
    pub fn visited(&self) -> Vec<Route> {
        self.visited
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The most recent route.
    pub fn last(&self) -> Option<Route> {
        self.visited().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn go_to(&self, route: &Route) {
        self.visited
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(route.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_paths() {
        assert_eq!(Route::Login.path(), "/login");
        assert_eq!(Route::Home.path(), "/home");
        assert_eq!(
            Route::Conversation(ConversationId::new("c42")).path(),
            "/chat/c42"
        );
    }

    #[test]
    fn recording_navigator_keeps_history() {
        let nav = RecordingNavigator::new();
        let shared = nav.clone();
        nav.go_to(&Route::Home);
        nav.go_to(&Route::Login);

        assert_eq!(shared.visited(), vec![Route::Home, Route::Login]);
        assert_eq!(shared.last(), Some(Route::Login));
    }
}
