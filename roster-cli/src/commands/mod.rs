//! CLI command implementations.

pub mod list;
pub mod session;
pub mod start;
pub mod status;

use roster_client::{HttpApi, Navigator, RosterClient, RosterConfig, Route};
use std::path::Path;
use std::sync::Arc;

use crate::store::FileSessionStore;

/// Navigator that reports navigation on stdout.
#[derive(Debug, Default)]
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn go_to(&self, route: &Route) {
        println!("-> {}", route.path());
    }
}

/// Build a roster client against the configured backend.
pub fn build_client(data_dir: &Path, config: &RosterConfig) -> RosterClient<HttpApi> {
    RosterClient::new(
        HttpApi::from_config(&config.api),
        Arc::new(FileSessionStore::new(data_dir)),
        Arc::new(ConsoleNavigator),
    )
    .with_view_options(config.view.to_options())
}
