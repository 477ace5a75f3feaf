//! Session resolution.
//!
//! The persisted session is whatever the login flow left behind: a bearer
//! token and a user record, either of which may be missing. [`resolve`]
//! turns it into a [`SessionContext`] once per activation.

use roster_types::{SessionContext, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::RwLock;

/// The user record stored next to the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    /// The user's id.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name, if the login response carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Persisted session, as written by the login flow.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    /// Bearer credential.
    #[serde(default)]
    pub token: Option<String>,
    /// The signed-in user.
    #[serde(default)]
    pub user: Option<StoredUser>,
}

impl fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredSession")
            .field(
                "token",
                &self.token.as_ref().map(|t| format!("[{} chars REDACTED]", t.len())),
            )
            .field("user", &self.user)
            .finish()
    }
}

/// Source of the persisted session.
pub trait SessionStore: Send + Sync {
    /// Read the current session. Missing or unreadable storage is an empty session.
    fn load(&self) -> StoredSession;
}

/// Resolve the persisted session into a usable identity.
///
/// Returns `None` if the token is missing or blank, or if there is no user
/// record with a non-empty id. Both halves are required.
pub fn resolve(store: &dyn SessionStore) -> Option<SessionContext> {
    let stored = store.load();
    let token = stored.token.filter(|t| !t.trim().is_empty())?;
    let user = stored.user.filter(|u| !u.id.is_empty())?;
    Some(SessionContext::new(user.id, &token))
}

/// In-memory session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RwLock<StoredSession>,
}

impl MemorySessionStore {
    /// Create an empty (signed-out) store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding a session.
    pub fn signed_in(token: &str, user_id: &str) -> Self {
        let store = Self::new();
        store.login(token, user_id);
        store
    }

    /// Record a successful login.
    pub fn login(&self, token: &str, user_id: &str) {
        self.replace(StoredSession {
            token: Some(token.to_string()),
            user: Some(StoredUser {
                id: UserId::new(user_id),
                name: None,
            }),
        });
    }

    /// Clear the session.
    pub fn logout(&self) {
        self.replace(StoredSession::default());
    }

    /// Replace the stored session wholesale.
    pub fn replace(&self, session: StoredSession) {
        let mut guard = self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = session;
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> StoredSession {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
