//! The resolved session identity.

use std::fmt;

use crate::UserId;

/// Identity and bearer credential of the signed-in user.
///
/// Resolved once per activation and then passed by reference to everything
/// that needs "the current user". Nothing downstream re-derives it.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    user_id: UserId,
    token: String,
}

impl SessionContext {
    /// Create a session context.
    pub fn new(user_id: UserId, token: &str) -> Self {
        Self {
            user_id,
            token: token.to_string(),
        }
    }

    /// The signed-in user's id.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The bearer credential.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("user_id", &self.user_id)
            .field("token", &format!("[{} chars REDACTED]", self.token.len()))
            .finish()
    }
}
