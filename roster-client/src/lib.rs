//! # roster-client
//!
//! Async roster client for the Parley chat backend.
//!
//! This is the library that front-ends use to show a signed-in user's
//! recent conversations and the people they can start one with.
//!
//! ## Features
//!
//! - **Pluggable Backend**: [`RosterApi`] trait with HTTP and mock implementations
//! - **Pure State Machine**: Uses roster-core for side-effect-free logic
//! - **Stale-Result Safety**: Results arriving after deactivation are dropped
//! - **Single-Flight Start**: One conversation start at a time
//!
//! ## Example
//!
//! ```ignore
//! use roster_client::{HttpApi, RosterClient, RosterConfig};
//!
//! let config = RosterConfig::from_file(Path::new("roster.toml"))?;
//! let client = RosterClient::new(HttpApi::from_config(&config.api), sessions, navigator)
//!     .with_view_options(config.view.to_options());
//!
//! client.activate().await;
//! let view = client.view_now().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod client;
pub mod config;
pub mod navigation;
pub mod session;

pub use api::{ApiError, Endpoint, HttpApi, MockApi, Operation, RosterApi};
pub use client::{Activation, ClientError, FetchError, RosterClient, StartError};
pub use config::{ApiConfig, ConfigError, RosterConfig, ViewConfig};
pub use navigation::{Navigator, RecordingNavigator, Route};
pub use session::{resolve, MemorySessionStore, SessionStore, StoredSession, StoredUser};
