//! # roster-types
//!
//! Entity schemas and wire records for the Parley chat roster.
//!
//! This crate provides the foundational types used across all roster crates:
//! - [`UserId`], [`ConversationId`] - Identity types
//! - [`Contact`], [`Message`], [`Conversation`] - Validated entities
//! - [`SessionContext`] - The resolved signed-in identity
//! - [`api`] - Endpoint paths and request/response bodies
//! - [`ModelError`] - Schema violations found at the fetch boundary

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
mod entities;
mod error;
mod ids;
mod session;

pub use entities::{Contact, Conversation, Message};
pub use error::ModelError;
pub use ids::{ConversationId, UserId};
pub use session::SessionContext;
