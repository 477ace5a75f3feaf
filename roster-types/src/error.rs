//! Error types for roster entities.

use thiserror::Error;

/// A wire record that does not satisfy the entity schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A record arrived without an id.
    #[error("{entity} record has an empty id")]
    MissingId {
        /// Which kind of record.
        entity: &'static str,
    },

    /// A conversation did not have exactly two participants.
    #[error("conversation {conversation} has {count} participants, expected 2")]
    ParticipantCount {
        /// The offending conversation id.
        conversation: String,
        /// How many participants it carried.
        count: usize,
    },

    /// Both participant slots hold the same user.
    #[error("conversation {conversation} lists user {user} twice")]
    DuplicateParticipant {
        /// The offending conversation id.
        conversation: String,
        /// The repeated user id.
        user: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ModelError::ParticipantCount {
            conversation: "c1".into(),
            count: 3,
        };
        assert_eq!(
            err.to_string(),
            "conversation c1 has 3 participants, expected 2"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ModelError>();
    }
}
