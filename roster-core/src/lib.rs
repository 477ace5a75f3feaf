//! # roster-core
//!
//! Pure logic for the Parley roster (no I/O, instant tests).
//!
//! This crate implements the roster state machine, view derivation and the
//! concurrency guards without any network or disk I/O.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output, `now` is a parameter)
//! - Easy reasoning about state transitions
//!
//! The actual I/O (HTTP, logging, navigation) is performed by `roster-client`,
//! which interprets the actions produced by the state machine.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod flight;
pub mod liveness;
pub mod state;
pub mod view;

pub use flight::{FlightPermit, SingleFlight};
pub use liveness::{Liveness, LivenessToken, RequestSeq};
pub use state::{exclude_user, Action, Phase, RosterEvent, RosterInput, RosterState};
pub use view::{
    contact_row, conversation_row, counterpart, last_message_instant, last_message_preview,
    relative_time, relative_time_with, truncate_preview, ContactRow, ConversationRow,
    Placeholder, Presence, RosterView, ViewError, ViewOptions, DEFAULT_AVATAR_URL,
    DEFAULT_DATE_FORMAT, NO_CONTACTS, NO_CONVERSATIONS, NO_LOCATION_LABEL,
    NO_MESSAGES_PLACEHOLDER, PREVIEW_CHARS, UNKNOWN_USER_LABEL,
};
